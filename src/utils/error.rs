use crate::domain::model::{CargoStatus, Id};
use crate::domain::result::ResultCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CustomsError {
    #[error("cargo {cargo_id} already declared")]
    DuplicateDeclaration { cargo_id: Id },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },

    #[error("illegal status transition for cargo {cargo_id}: {from} -> {to}")]
    InvalidTransition {
        cargo_id: Id,
        from: CargoStatus,
        to: CargoStatus,
    },

    #[error("unique constraint violated on {table}: {key}")]
    Conflict { table: &'static str, key: String },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, CustomsError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Domain,
    Storage,
    Configuration,
    Validation,
}

impl CustomsError {
    /// Envelope code an operation reports for this error.
    pub fn result_code(&self) -> ResultCode {
        match self {
            CustomsError::DuplicateDeclaration { .. } => ResultCode::DuplicateDeclaration,
            CustomsError::NotFound { .. } => ResultCode::NotFound,
            CustomsError::InvalidTransition { .. } => ResultCode::InvalidTransition,
            _ => ResultCode::Error,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            CustomsError::DuplicateDeclaration { .. }
            | CustomsError::NotFound { .. }
            | CustomsError::InvalidTransition { .. } => ErrorCategory::Domain,
            CustomsError::Conflict { .. }
            | CustomsError::StoreError { .. }
            | CustomsError::IoError(_)
            | CustomsError::SerializationError(_) => ErrorCategory::Storage,
            CustomsError::ConfigError { .. }
            | CustomsError::ConfigValidationError { .. }
            | CustomsError::InvalidConfigValueError { .. }
            | CustomsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CustomsError::ValidationError { .. } => ErrorCategory::Validation,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Domain => "Check the cargo id and its current status",
            ErrorCategory::Storage => "Check that the data directory exists and is writable",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Validation => "Check the values passed to the command",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            CustomsError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            CustomsError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}
