// src/handlers/mod.rs

pub mod dcf;
pub mod error;
pub mod fcf;
pub mod monte_carlo;

use log::error;
use regex::Regex;
use warp::Rejection;

use self::error::ApiError;

const TICKER_PATTERN: &str = r"^[A-Z0-9.^-]{1,10}$";

/// Normalize and validate a ticker path segment before any provider call.
pub(crate) fn validate_ticker(raw: &str) -> Result<String, Rejection> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return Err(warp::reject::custom(ApiError::invalid_input(
            "please enter a stock ticker",
        )));
    }

    let pattern = Regex::new(TICKER_PATTERN).map_err(|e| {
        error!("Ticker pattern failed to compile: {}", e);
        warp::reject::custom(ApiError::computation(e.to_string()))
    })?;
    if !pattern.is_match(&ticker) {
        return Err(warp::reject::custom(ApiError::invalid_input(
            "please enter a valid stock ticker symbol",
        )));
    }

    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_ticker_shapes() {
        assert_eq!(validate_ticker("aapl").unwrap(), "AAPL");
        assert_eq!(validate_ticker(" brk.b ").unwrap(), "BRK.B");
        assert_eq!(validate_ticker("^gspc").unwrap(), "^GSPC");
    }

    #[test]
    fn rejects_blank_and_malformed_tickers() {
        assert!(validate_ticker("").is_err());
        assert!(validate_ticker("   ").is_err());
        assert!(validate_ticker("AAPL; DROP").is_err());
        assert!(validate_ticker("WAYTOOLONGTICKER").is_err());
    }
}
