use crate::utils::error::CustomsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Success,
    Error,
    DuplicateDeclaration,
    NotFound,
    InvalidTransition,
}

impl ResultCode {
    pub fn default_message(&self) -> &'static str {
        match self {
            ResultCode::Success => "success",
            ResultCode::Error => "error",
            ResultCode::DuplicateDeclaration => "cargo already declared",
            ResultCode::NotFound => "record not found",
            ResultCode::InvalidTransition => "illegal cargo status transition",
        }
    }
}

/// Uniform envelope returned by every workflow operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: ResultCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResult<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: ResultCode::Success,
            message: ResultCode::Success.default_message().to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn from_code(code: ResultCode) -> Self {
        Self::error(code, code.default_message())
    }

    pub fn is_success(&self) -> bool {
        self.code == ResultCode::Success
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T> From<CustomsError> for ApiResult<T> {
    fn from(err: CustomsError) -> Self {
        match err.result_code() {
            ResultCode::DuplicateDeclaration => Self::from_code(ResultCode::DuplicateDeclaration),
            code => Self::error(code, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let result = ApiResult::success(vec![1, 2]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"code": "SUCCESS", "message": "success", "data": [1, 2]})
        );
    }

    #[test]
    fn test_duplicate_envelope_has_no_data() {
        let result: ApiResult<()> = CustomsError::DuplicateDeclaration { cargo_id: 9 }.into();
        assert_eq!(result.code, ResultCode::DuplicateDeclaration);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], "DUPLICATE_DECLARATION");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_generic_error_carries_message() {
        let result: ApiResult<()> = CustomsError::StoreError {
            message: "disk on fire".to_string(),
        }
        .into();
        assert_eq!(result.code, ResultCode::Error);
        assert!(result.message.contains("disk on fire"));
    }

    #[test]
    fn test_not_found_code() {
        let result: ApiResult<()> = CustomsError::NotFound {
            entity: "cargo",
            id: 5,
        }
        .into();
        assert_eq!(result.code, ResultCode::NotFound);
        assert_eq!(result.message, "cargo 5 not found");
    }
}
