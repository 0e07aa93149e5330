// src/handlers/error.rs
use std::fmt;
use warp::reject::Reject;

use crate::services::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    InvalidInput,
    NoData,
    Computation,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError {
            kind: ApiErrorKind::InvalidInput,
            message: message.into(),
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        ApiError {
            kind: ApiErrorKind::NoData,
            message: message.into(),
        }
    }

    pub fn computation(message: impl Into<String>) -> Self {
        ApiError {
            kind: ApiErrorKind::Computation,
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            // The one failure users see verbatim
            EngineError::DataUnavailable(_) => ApiError::no_data(err.to_string()),
            // Everything else collapses into a generic message; the detail
            // stays in the logs
            EngineError::Computation(_) => {
                ApiError::computation("could not compute a result for this ticker")
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}
