// src/models.rs
use serde::{Deserialize, Serialize};

/// Point-in-time fundamentals for one ticker. Every trailing series is
/// ordered most-recent-first, matching the statement APIs.
#[derive(Debug, Clone, Default)]
pub struct FinancialSnapshot {
    pub ticker: String,
    pub total_revenue: Vec<f64>,
    pub ebit: Vec<f64>,
    pub ebitda: Vec<f64>,
    pub net_income: Vec<f64>,
    pub tax_provision: Vec<f64>,
    pub pretax_income: Vec<f64>,
    pub free_cash_flow: Vec<f64>,
    pub dep_amort: Vec<f64>,
    pub capex: Vec<f64>,
    pub current_assets: Vec<f64>,
    pub current_liabilities: Vec<f64>,
    pub total_debt: f64,
    pub cash_and_equivalents: f64,
    pub beta: f64,
    pub current_price: f64,
    pub shares_outstanding: f64,
    pub trailing_eps: f64,
    pub market_cap: f64,
}

/// Daily price bars, oldest-first as delivered by the chart endpoint.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    pub closes: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

impl PriceHistory {
    pub fn latest_close(&self) -> Option<f64> {
        self.closes.last().copied()
    }
}

/// Display-ready DCF output. Monetary aggregates are scaled to millions and
/// every field is rounded to 2 decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    pub ticker: String,
    pub current_price: f64,
    pub intrinsic_value_per_share: f64,
    pub week_52_low: f64,
    pub week_52_high: f64,
    pub beta: f64,
    pub trailing_eps: f64,
    pub pe_ratio: f64,
    pub ev_ebitda_multiple: f64,
    pub latest_fcf_millions: f64,
    pub terminal_value_millions: f64,
    pub wacc_pct: f64,
    pub terminal_value_pct_of_ev: f64,
}

/// Five projected unlevered free-cash-flow figures, rounded for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcfProjection {
    pub ticker: String,
    pub year_one_fcf: f64,
    pub year_two_fcf: f64,
    pub year_three_fcf: f64,
    pub year_four_fcf: f64,
    pub year_five_fcf: f64,
}

/// One batch of simulated price paths (simulation index x day index).
/// Built once per request and dropped with the response.
#[derive(Debug, Clone)]
pub struct SimulationBatch {
    pub seed_price: f64,
    pub paths: Vec<Vec<f64>>,
}

impl SimulationBatch {
    pub fn num_days(&self) -> usize {
        self.paths.first().map(Vec::len).unwrap_or(0)
    }

    /// Per-day arithmetic mean across all simulations.
    pub fn mean_path(&self) -> Vec<f64> {
        let days = self.num_days();
        let n = self.paths.len() as f64;
        (0..days)
            .map(|d| self.paths.iter().map(|p| p[d]).sum::<f64>() / n)
            .collect()
    }

    /// Per-day maximum across all simulations.
    pub fn best_path(&self) -> Vec<f64> {
        self.fold_days(f64::NEG_INFINITY, f64::max)
    }

    /// Per-day minimum across all simulations.
    pub fn worst_path(&self) -> Vec<f64> {
        self.fold_days(f64::INFINITY, f64::min)
    }

    fn fold_days(&self, init: f64, pick: fn(f64, f64) -> f64) -> Vec<f64> {
        (0..self.num_days())
            .map(|d| self.paths.iter().map(|p| p[d]).fold(init, pick))
            .collect()
    }
}
