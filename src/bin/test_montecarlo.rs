use dotenv::dotenv;
use log::{error, info};
use valuation_dashboard::services::chart::render_simulation_chart;
use valuation_dashboard::services::monte_carlo::{run_simulation, SimulationConfig};
use valuation_dashboard::services::yahoo::fetch_price_history;
use valuation_dashboard::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    env_logger::init();

    let ticker = std::env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    info!("Running Monte Carlo simulation for {}...", ticker);

    // Smaller than the serving defaults so the smoke run stays quick
    let config = SimulationConfig {
        num_simulations: 50,
        num_days: 100,
        lookback_days: 500,
    };

    let history = fetch_price_history(&ticker, "2y").await?;
    let batch = match run_simulation(&history, &ticker, &config) {
        Ok(batch) => batch,
        Err(e) => {
            error!("ERROR: Simulation failed: {}", e);
            return Err(e.into());
        }
    };

    let mean_terminal = batch.mean_path().last().copied().unwrap_or(batch.seed_price);
    info!(
        "SUCCESS: {} paths from seed {}, mean terminal {:.2}",
        batch.paths.len(),
        batch.seed_price,
        mean_terminal
    );

    let chart = render_simulation_chart(&batch, &ticker)?;
    info!("Rendered chart: {} base64 bytes", chart.len());

    Ok(())
}
