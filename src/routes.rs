// src/routes.rs
use crate::handlers::error::{ApiError, ApiErrorKind};
use crate::handlers::{
    dcf::get_dcf_valuation, fcf::get_fcf_projection, monte_carlo::get_monte_carlo,
};
use log::info;

use std::convert::Infallible;
use warp::reject::Rejection;
use warp::{Filter, Reply};

// Recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found";
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = match api_error.kind {
            ApiErrorKind::InvalidInput => warp::http::StatusCode::BAD_REQUEST,
            ApiErrorKind::NoData => warp::http::StatusCode::NOT_FOUND,
            ApiErrorKind::Computation => warp::http::StatusCode::INTERNAL_SERVER_ERROR,
        };
        message = &api_error.message;
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error";
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

// A ticker-less engine path mirrors the empty form submission of the old UI
async fn missing_ticker() -> Result<warp::reply::Json, Rejection> {
    Err(warp::reject::custom(ApiError::invalid_input(
        "please enter a stock ticker",
    )))
}

pub fn routes() -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let home_route = warp::path::end().and(warp::get()).map(|| {
        warp::reply::json(&serde_json::json!({
            "service": "valuation_dashboard",
            "endpoints": [
                "/api/v1/dcf/{ticker}",
                "/api/v1/fcf/{ticker}",
                "/api/v1/montecarlo/{ticker}",
            ],
        }))
    });

    let dcf_route = warp::path!("api" / "v1" / "dcf" / String)
        .and(warp::get())
        .and_then(get_dcf_valuation);

    let dcf_missing_route = warp::path!("api" / "v1" / "dcf")
        .and(warp::get())
        .and_then(missing_ticker);

    let fcf_route = warp::path!("api" / "v1" / "fcf" / String)
        .and(warp::get())
        .and_then(get_fcf_projection);

    let fcf_missing_route = warp::path!("api" / "v1" / "fcf")
        .and(warp::get())
        .and_then(missing_ticker);

    let monte_carlo_route = warp::path!("api" / "v1" / "montecarlo" / String)
        .and(warp::get())
        .and_then(get_monte_carlo);

    let monte_carlo_missing_route = warp::path!("api" / "v1" / "montecarlo")
        .and(warp::get())
        .and_then(missing_ticker);

    info!("All routes configured successfully.");

    home_route
        .or(dcf_route)
        .or(dcf_missing_route)
        .or(fcf_route)
        .or(fcf_missing_route)
        .or(monte_carlo_route)
        .or(monte_carlo_missing_route)
        .recover(handle_rejection)
}
