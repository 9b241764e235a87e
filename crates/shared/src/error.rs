use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    RateLimited,
    Validation,
    Unavailable,
    Internal,
}

/// Error body the generation service may return alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ServiceException {
    pub code: ErrorCode,
    pub message: String,
}

impl From<ServiceError> for ServiceException {
    fn from(value: ServiceError) -> Self {
        Self {
            code: value.code,
            message: value.message,
        }
    }
}
