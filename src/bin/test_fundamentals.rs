use dotenv::dotenv;
use log::{error, info};
use valuation_dashboard::services::yahoo::{fetch_fundamentals, fetch_price_history};
use valuation_dashboard::BoxError;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv().ok();
    env_logger::init();

    let ticker = std::env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    info!("Testing fundamentals fetch for {}...", ticker);

    match fetch_fundamentals(&ticker).await {
        Ok(snapshot) => {
            info!(
                "SUCCESS: {} revenue periods, latest revenue {:?}",
                snapshot.total_revenue.len(),
                snapshot.total_revenue.first()
            );
            info!(
                "Metadata: beta {}, price {}, shares {}, market cap {}",
                snapshot.beta,
                snapshot.current_price,
                snapshot.shares_outstanding,
                snapshot.market_cap
            );
        }
        Err(e) => {
            error!("ERROR: Failed to fetch fundamentals: {}", e);
            return Err(e.into());
        }
    }

    match fetch_price_history(&ticker, "1y").await {
        Ok(history) => {
            info!("SUCCESS: {} daily bars", history.closes.len());
        }
        Err(e) => {
            error!("ERROR: Failed to fetch price history: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
