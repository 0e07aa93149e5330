// src/handlers/monte_carlo.rs
use log::{error, info};
use serde::Serialize;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use super::validate_ticker;
use crate::services::chart::render_simulation_chart;
use crate::services::monte_carlo::{run_simulation, SimulationConfig};
use crate::services::round2;
use crate::services::yahoo;

#[derive(Serialize)]
struct SimulationResponse {
    ticker: String,
    num_simulations: usize,
    num_days: usize,
    mean_terminal_price: f64,
    best_terminal_price: f64,
    worst_terminal_price: f64,
    chart_png_base64: String,
}

pub async fn get_monte_carlo(ticker: String) -> Result<Json, Rejection> {
    let ticker = validate_ticker(&ticker)?;
    info!("Handling Monte Carlo simulation request for {}", ticker);

    let config = SimulationConfig::default();

    // 2y of daily bars covers the 500-trading-day lookback
    let history = yahoo::fetch_price_history(&ticker, "2y").await.map_err(|e| {
        error!("Price history fetch failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let batch = run_simulation(&history, &ticker, &config).map_err(|e| {
        error!("Simulation failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let chart_png_base64 = render_simulation_chart(&batch, &ticker).map_err(|e| {
        error!("Chart rendering failed for {}: {}", ticker, e);
        warp::reject::custom(ApiError::from(e))
    })?;

    let terminal = |path: Vec<f64>| path.last().copied().unwrap_or(batch.seed_price);
    let response = SimulationResponse {
        ticker: ticker.clone(),
        num_simulations: batch.paths.len(),
        num_days: batch.num_days(),
        mean_terminal_price: round2(terminal(batch.mean_path())),
        best_terminal_price: round2(terminal(batch.best_path())),
        worst_terminal_price: round2(terminal(batch.worst_path())),
        chart_png_base64,
    };

    info!(
        "Simulation for {} finished: mean terminal {}",
        ticker, response.mean_terminal_price
    );
    Ok(warp::reply::json(&response))
}
