// src/services/error.rs
use thiserror::Error;

/// Failure taxonomy shared by the valuation and simulation engines.
///
/// `DataUnavailable` is the only variant surfaced verbatim to users; every
/// arithmetic fault, missing statement row or implausible result collapses
/// into `Computation` and is reported generically at the HTTP boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no price data found for {0}; the stock might be delisted or the ticker symbol could be incorrect")]
    DataUnavailable(String),

    #[error("could not compute a result: {0}")]
    Computation(String),
}

impl EngineError {
    pub fn computation(detail: impl Into<String>) -> Self {
        EngineError::Computation(detail.into())
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Computation(format!("provider request failed: {}", err))
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Computation(format!("provider payload malformed: {}", err))
    }
}
