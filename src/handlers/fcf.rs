// src/handlers/fcf.rs
use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::validate_ticker;
use crate::services::fcf::project_five_year_fcf;
use crate::services::yahoo;

pub async fn get_fcf_projection(ticker: String) -> Result<Json, Rejection> {
    let ticker = validate_ticker(&ticker)?;
    info!("Handling FCF projection request for {}", ticker);

    let snapshot = yahoo::fetch_fundamentals(&ticker).await.map_err(|e| {
        error!("Fundamentals fetch failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let projection = project_five_year_fcf(&snapshot).map_err(|e| {
        error!("FCF projection failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    Ok(warp::reply::json(&projection))
}
