// src/services/dcf.rs
//
// Discounted-cash-flow engine: one blended revenue growth rate drives both
// the FCF and EBITDA projections, the terminal value comes from the current
// EV/EBITDA multiple, and everything is discounted at WACC back to a present
// equity value per share.

use log::debug;

use crate::models::{FinancialSnapshot, PriceHistory, ValuationResult};
use crate::services::error::EngineError;
use crate::services::growth::{average_tax_rate, mean_growth_rate, project_forward, FORECAST_YEARS};
use crate::services::round2;

const MILLION: f64 = 1_000_000.0;
const MIN_DENOMINATOR: f64 = 1e-9;

/// Externally fixed market assumptions for the discount rate.
#[derive(Debug, Clone)]
pub struct DcfConfig {
    pub risk_free_rate: f64,
    pub market_return: f64,
}

impl Default for DcfConfig {
    fn default() -> Self {
        DcfConfig {
            risk_free_rate: 0.04083,
            market_return: 0.08,
        }
    }
}

/// Run the full DCF valuation for one snapshot. The 1y price history is only
/// used for the 52-week range display fields.
pub fn run_valuation(
    snapshot: &FinancialSnapshot,
    history: &PriceHistory,
    config: &DcfConfig,
) -> Result<ValuationResult, EngineError> {
    // Single blended growth rate shared by both projections
    let growth = mean_growth_rate(&snapshot.total_revenue)?;
    debug!("{}: blended revenue growth {:.4}", snapshot.ticker, growth);

    let latest_fcf = latest(&snapshot.free_cash_flow, "free cash flow")?;
    let latest_ebitda = latest(&snapshot.ebitda, "EBITDA")?;
    let fcf_projection = project_forward(latest_fcf, growth);
    let ebitda_projection = project_forward(latest_ebitda, growth);

    let tax_rate = average_tax_rate(&snapshot.tax_provision, &snapshot.pretax_income)?;
    let wacc = weighted_cost_of_capital(snapshot, tax_rate, config)?;

    // Exit multiple from the current market enterprise value
    let enterprise_now =
        snapshot.market_cap + snapshot.total_debt - snapshot.cash_and_equivalents;
    if latest_ebitda.abs() < MIN_DENOMINATOR {
        return Err(EngineError::computation("zero EBITDA, cannot derive exit multiple"));
    }
    let ev_ebitda_multiple = enterprise_now / latest_ebitda;
    let terminal_value = ebitda_projection[FORECAST_YEARS - 1] * ev_ebitda_multiple;

    let discount_base = 1.0 + wacc;
    if discount_base <= 0.0 {
        return Err(EngineError::computation(format!(
            "discount rate {:.4} leaves no positive discount base",
            wacc
        )));
    }

    // Present value of the explicit years plus the terminal value at year 5.
    // Each forecast year is counted exactly once.
    let mut enterprise_value = 0.0;
    for (year, fcf) in fcf_projection.iter().enumerate() {
        enterprise_value += fcf / discount_base.powi(year as i32 + 1);
    }
    let discounted_terminal = terminal_value / discount_base.powi(FORECAST_YEARS as i32);
    enterprise_value += discounted_terminal;

    if enterprise_value.abs() < MIN_DENOMINATOR {
        return Err(EngineError::computation("enterprise value collapsed to zero"));
    }

    // Bridge to equity
    let equity_value =
        enterprise_value + snapshot.cash_and_equivalents - snapshot.total_debt;
    if snapshot.shares_outstanding < MIN_DENOMINATOR {
        return Err(EngineError::computation("no shares outstanding reported"));
    }
    let intrinsic_value = equity_value / snapshot.shares_outstanding;
    if intrinsic_value < 0.0 {
        return Err(EngineError::computation(format!(
            "negative intrinsic value {:.2} per share",
            intrinsic_value
        )));
    }

    let terminal_pct = discounted_terminal / enterprise_value * 100.0;

    let (week_52_low, week_52_high) = week_52_range(history)?;

    if snapshot.trailing_eps.abs() < MIN_DENOMINATOR {
        return Err(EngineError::computation("zero trailing EPS, cannot derive P/E"));
    }
    let pe_ratio = snapshot.current_price / snapshot.trailing_eps;

    Ok(ValuationResult {
        ticker: snapshot.ticker.clone(),
        current_price: round2(snapshot.current_price),
        intrinsic_value_per_share: round2(intrinsic_value),
        week_52_low: round2(week_52_low),
        week_52_high: round2(week_52_high),
        beta: round2(snapshot.beta),
        trailing_eps: round2(snapshot.trailing_eps),
        pe_ratio: round2(pe_ratio),
        ev_ebitda_multiple: round2(ev_ebitda_multiple),
        latest_fcf_millions: round2(latest_fcf / MILLION),
        terminal_value_millions: round2(terminal_value / MILLION),
        wacc_pct: round2(wacc * 100.0),
        terminal_value_pct_of_ev: round2(terminal_pct),
    })
}

/// CAPM cost of equity blended with the after-tax cost of debt, weighted by
/// the current market-cap / total-debt split. The effective tax rate stands
/// in for the pretax cost of debt; interest expense is not part of the
/// provider contract (see DESIGN.md).
fn weighted_cost_of_capital(
    snapshot: &FinancialSnapshot,
    tax_rate: f64,
    config: &DcfConfig,
) -> Result<f64, EngineError> {
    let cost_of_equity =
        config.risk_free_rate + snapshot.beta * (config.market_return - config.risk_free_rate);
    let cost_of_debt = tax_rate;

    let equity = snapshot.market_cap;
    let debt = snapshot.total_debt;
    let total = equity + debt;
    if total < MIN_DENOMINATOR {
        return Err(EngineError::computation("no enterprise financing reported"));
    }

    Ok(equity / total * cost_of_equity + debt / total * cost_of_debt * (1.0 - tax_rate))
}

fn latest(series: &[f64], label: &str) -> Result<f64, EngineError> {
    series
        .first()
        .copied()
        .ok_or_else(|| EngineError::computation(format!("missing {} history", label)))
}

fn week_52_range(history: &PriceHistory) -> Result<(f64, f64), EngineError> {
    if history.lows.is_empty() || history.highs.is_empty() {
        return Err(EngineError::computation("empty price history for 52-week range"));
    }
    let low = history.lows.iter().copied().fold(f64::INFINITY, f64::min);
    let high = history.highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // 10% revenue growth, beta 1 and no debt so WACC lands exactly on the
    // market return; all monetary values in raw dollars at 1e6 scale.
    fn snapshot() -> FinancialSnapshot {
        FinancialSnapshot {
            ticker: "TEST".to_string(),
            total_revenue: vec![133.1e6, 121.0e6, 110.0e6, 100.0e6],
            ebit: vec![40.0e6, 36.0e6, 33.0e6, 30.0e6],
            ebitda: vec![100.0e6, 90.0e6, 82.0e6, 75.0e6],
            net_income: vec![30.0e6, 27.0e6, 25.0e6, 22.0e6],
            tax_provision: vec![20.0e6, 22.0e6, 24.0e6],
            pretax_income: vec![100.0e6, 100.0e6, 100.0e6],
            free_cash_flow: vec![50.0e6, 45.0e6, 41.0e6, 37.0e6],
            dep_amort: vec![10.0e6, 9.0e6, 8.0e6, 7.0e6],
            capex: vec![12.0e6, 11.0e6, 10.0e6, 9.0e6],
            current_assets: vec![80.0e6, 75.0e6, 70.0e6, 65.0e6],
            current_liabilities: vec![50.0e6, 48.0e6, 46.0e6, 44.0e6],
            total_debt: 0.0,
            cash_and_equivalents: 100.0e6,
            beta: 1.0,
            current_price: 10.0,
            shares_outstanding: 100.0e6,
            trailing_eps: 2.0,
            market_cap: 1000.0e6,
        }
    }

    fn history() -> PriceHistory {
        PriceHistory {
            closes: vec![9.0, 10.0, 11.0],
            highs: vec![9.5, 12.0, 11.5],
            lows: vec![8.0, 9.5, 10.5],
        }
    }

    #[test]
    fn values_growing_all_equity_company() {
        let result = run_valuation(&snapshot(), &history(), &DcfConfig::default()).unwrap();

        // beta 1, zero debt: WACC is exactly the 8% market return
        assert!(close(result.wacc_pct, 8.0));
        // (1000 + 0 - 100) / 100 current EV over current EBITDA
        assert!(close(result.ev_ebitda_multiple, 9.0));
        assert!(close(result.pe_ratio, 5.0));
        assert!(close(result.latest_fcf_millions, 50.0));
        // year-5 EBITDA 161.051 x 9
        assert!(close(result.terminal_value_millions, 1449.46));
        // hand-computed: PV(FCF) 264.2366 + PV(TV) 986.4774, plus 100 cash,
        // over 100 shares
        assert!(close(result.intrinsic_value_per_share, 13.51));
        assert!(close(result.terminal_value_pct_of_ev, 78.87));
        assert!(close(result.week_52_low, 8.0));
        assert!(close(result.week_52_high, 12.0));
    }

    #[test]
    fn rejects_non_positive_discount_base() {
        let mut snapshot = snapshot();
        // CAPM cost of equity goes below -100% for a deeply negative beta
        snapshot.beta = -40.0;
        let err = run_valuation(&snapshot, &history(), &DcfConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Computation(_)));
    }

    #[test]
    fn rejects_negative_intrinsic_value() {
        let mut snapshot = snapshot();
        snapshot.free_cash_flow = vec![-50.0e6, -45.0e6, -41.0e6, -37.0e6];
        snapshot.market_cap = 10.0e6;
        snapshot.cash_and_equivalents = 9.0e6;
        let err = run_valuation(&snapshot, &history(), &DcfConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Computation(_)));
    }

    #[test]
    fn rejects_zero_ebitda() {
        let mut snapshot = snapshot();
        snapshot.ebitda = vec![0.0, 0.0, 0.0, 0.0];
        let err = run_valuation(&snapshot, &history(), &DcfConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Computation(_)));
    }

    #[test]
    fn rejects_empty_price_history() {
        let err = run_valuation(&snapshot(), &PriceHistory::default(), &DcfConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::Computation(_)));
    }
}
