use dotenv::dotenv;
use log::{error, info};
use valuation_dashboard::services::dcf::{run_valuation, DcfConfig};
use valuation_dashboard::services::yahoo::{fetch_fundamentals, fetch_price_history};
use valuation_dashboard::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    env_logger::init();

    let ticker = std::env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    info!("Running full DCF valuation for {}...", ticker);

    let snapshot = fetch_fundamentals(&ticker).await?;
    let history = fetch_price_history(&ticker, "1y").await?;

    match run_valuation(&snapshot, &history, &DcfConfig::default()) {
        Ok(result) => {
            info!(
                "SUCCESS: intrinsic value {} vs current price {}",
                result.intrinsic_value_per_share, result.current_price
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Err(e) => {
            error!("ERROR: Valuation failed: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
