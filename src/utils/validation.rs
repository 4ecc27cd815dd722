use crate::utils::error::{CustomsError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(CustomsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CustomsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// Request-level check; reported as a validation error rather than a config error.
pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(CustomsError::ValidationError {
            message: format!(
                "{} must be at least {}, got {}",
                field_name, min_value, value
            ),
        });
    }
    Ok(())
}

/// Rejects NaN and infinities, which JSON cannot represent.
pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(CustomsError::ValidationError {
            message: format!("{} must be a finite number, got {}", field_name, value),
        });
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CustomsError::MissingConfigError {
        field: field_name.to_string(),
    })
}
