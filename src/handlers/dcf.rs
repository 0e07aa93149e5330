// src/handlers/dcf.rs
use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::validate_ticker;
use crate::services::dcf::{run_valuation, DcfConfig};
use crate::services::yahoo;

pub async fn get_dcf_valuation(ticker: String) -> Result<Json, Rejection> {
    let ticker = validate_ticker(&ticker)?;
    info!("Handling DCF valuation request for {}", ticker);

    let snapshot = yahoo::fetch_fundamentals(&ticker).await.map_err(|e| {
        error!("Fundamentals fetch failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let history = yahoo::fetch_price_history(&ticker, "1y").await.map_err(|e| {
        error!("1y price history fetch failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let result = run_valuation(&snapshot, &history, &DcfConfig::default()).map_err(|e| {
        error!("DCF valuation failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    info!(
        "DCF valuation for {}: intrinsic {} vs price {}",
        ticker, result.intrinsic_value_per_share, result.current_price
    );
    Ok(warp::reply::json(&result))
}
