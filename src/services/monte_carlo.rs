// src/services/monte_carlo.rs
//
// Geometric-Brownian-motion price simulation. Drift and volatility come from
// the trailing daily log returns; every path compounds the latest close with
// normally distributed shocks drawn from the process-wide RNG (no seeding,
// reproducibility is not a requirement).

use log::debug;
use rand::thread_rng;
use rand_distr::{Distribution, Normal};

use crate::models::{PriceHistory, SimulationBatch};
use crate::services::error::EngineError;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub num_simulations: usize,
    pub num_days: usize,
    /// Trailing trading days used to estimate drift and volatility.
    pub lookback_days: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_simulations: 500,
            num_days: 500,
            lookback_days: 500,
        }
    }
}

/// Run the full simulation for one ticker's price history. An empty history
/// is the one failure users see verbatim, naming the ticker.
pub fn run_simulation(
    history: &PriceHistory,
    ticker: &str,
    config: &SimulationConfig,
) -> Result<SimulationBatch, EngineError> {
    let last_price = history
        .latest_close()
        .ok_or_else(|| EngineError::DataUnavailable(ticker.to_string()))?;

    let start = history.closes.len().saturating_sub(config.lookback_days);
    let window = &history.closes[start..];

    let returns = log_returns(window)?;
    let (drift, volatility) = drift_and_volatility(&returns)?;
    debug!(
        "{}: drift {:.6}, daily volatility {:.6} over {} returns",
        ticker,
        drift,
        volatility,
        returns.len()
    );

    simulate_paths(last_price, drift, volatility, config)
}

/// Daily log returns `ln(P[t] / P[t-1])` over an oldest-first close series.
pub fn log_returns(closes: &[f64]) -> Result<Vec<f64>, EngineError> {
    if closes.len() < 2 {
        return Err(EngineError::computation(
            "need at least 2 closing prices for log returns",
        ));
    }
    let mut returns = Vec::with_capacity(closes.len() - 1);
    for pair in closes.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev <= 0.0 || next <= 0.0 {
            return Err(EngineError::computation("non-positive close in price history"));
        }
        returns.push((next / prev).ln());
    }
    Ok(returns)
}

/// GBM parameters: drift is the mean log return less half the variance;
/// volatility is the sample standard deviation.
pub fn drift_and_volatility(returns: &[f64]) -> Result<(f64, f64), EngineError> {
    if returns.len() < 2 {
        return Err(EngineError::computation(
            "need at least 2 log returns for drift and volatility",
        ));
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    Ok((mean - variance / 2.0, std_dev))
}

/// Compound every path forward from the seed price. Day 0 of each path is
/// the seed exactly; day t applies `exp(drift + shock[t-1])`.
pub fn simulate_paths(
    seed_price: f64,
    drift: f64,
    volatility: f64,
    config: &SimulationConfig,
) -> Result<SimulationBatch, EngineError> {
    if config.num_simulations == 0 || config.num_days == 0 {
        return Err(EngineError::computation("simulation dimensions must be non-zero"));
    }
    let shocks = Normal::new(0.0, volatility).map_err(|err| {
        EngineError::computation(format!("invalid volatility {}: {}", volatility, err))
    })?;

    let mut rng = thread_rng();
    let mut paths = Vec::with_capacity(config.num_simulations);
    for _ in 0..config.num_simulations {
        let mut path = Vec::with_capacity(config.num_days);
        path.push(seed_price);
        for _ in 1..config.num_days {
            let prev = path[path.len() - 1];
            path.push(prev * (drift + shocks.sample(&mut rng)).exp());
        }
        paths.push(path);
    }

    Ok(SimulationBatch { seed_price, paths })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close_to(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            num_simulations: 20,
            num_days: 30,
            lookback_days: 500,
        }
    }

    #[test]
    fn log_returns_of_ten_percent_step() {
        let returns = log_returns(&[100.0, 110.0]).unwrap();
        assert_eq!(returns.len(), 1);
        assert!(close_to(returns[0], 1.1f64.ln(), 1e-12));
    }

    #[test]
    fn log_returns_reject_non_positive_prices() {
        assert!(matches!(
            log_returns(&[100.0, 0.0, 90.0]),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn constant_returns_have_zero_volatility() {
        let (drift, volatility) = drift_and_volatility(&[0.1, 0.1, 0.1]).unwrap();
        assert!(close_to(volatility, 0.0, 1e-12));
        assert!(close_to(drift, 0.1, 1e-12));
    }

    #[test]
    fn every_path_starts_at_the_seed_price() {
        let batch = simulate_paths(42.5, 0.001, 0.02, &small_config()).unwrap();
        assert_eq!(batch.paths.len(), 20);
        for path in &batch.paths {
            assert_eq!(path.len(), 30);
            assert_eq!(path[0], 42.5);
        }
    }

    #[test]
    fn zero_drift_and_volatility_hold_paths_constant() {
        let batch = simulate_paths(100.0, 0.0, 0.0, &small_config()).unwrap();
        for path in &batch.paths {
            assert!(path.iter().all(|p| close_to(*p, 100.0, 1e-9)));
        }
    }

    #[test]
    fn summary_paths_bound_each_other() {
        let batch = simulate_paths(100.0, 0.0005, 0.03, &small_config()).unwrap();
        let mean = batch.mean_path();
        let best = batch.best_path();
        let worst = batch.worst_path();
        for day in 0..batch.num_days() {
            assert!(best[day] >= mean[day]);
            assert!(mean[day] >= worst[day]);
        }
    }

    #[test]
    fn empty_history_is_data_unavailable() {
        let err = run_simulation(&PriceHistory::default(), "GONE", &small_config()).unwrap_err();
        assert!(matches!(err, EngineError::DataUnavailable(ref t) if t == "GONE"));
    }

    #[test]
    fn single_close_is_a_computation_failure() {
        let history = PriceHistory {
            closes: vec![100.0],
            highs: vec![100.0],
            lows: vec![100.0],
        };
        let err = run_simulation(&history, "TEST", &small_config()).unwrap_err();
        assert!(matches!(err, EngineError::Computation(_)));
    }
}
