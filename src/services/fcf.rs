// src/services/fcf.rs
//
// Direct free-cash-flow projection: EBIT, D&A, capex and net working capital
// each get their own trailing growth rate and 5-year projection, combined
// through the standard unlevered FCF formula. No discounting here; this
// engine reports projected cash flows, not a valuation.

use log::debug;

use crate::models::{FcfProjection, FinancialSnapshot};
use crate::services::error::EngineError;
use crate::services::growth::{
    average_tax_rate, project_forward, reverse_average_growth_rate, FORECAST_YEARS, GROWTH_WINDOW,
};
use crate::services::round2;

/// Project five years of unlevered free cash flow from the snapshot's
/// operating fundamentals.
pub fn project_five_year_fcf(snapshot: &FinancialSnapshot) -> Result<FcfProjection, EngineError> {
    let ebit = project_metric(&snapshot.ebit, "EBIT")?;
    let dep_amort = project_metric(&snapshot.dep_amort, "depreciation and amortization")?;
    let capex = project_metric(&snapshot.capex, "capital expenditure")?;

    let nwc_history = net_working_capital(snapshot)?;
    let nwc = project_metric(&nwc_history, "net working capital")?;

    // Held constant over the horizon rather than projected per year
    let tax_rate = average_tax_rate(&snapshot.tax_provision, &snapshot.pretax_income)?;

    let fcf = combine_fcf(&ebit, tax_rate, &dep_amort, &capex, &nwc);
    debug!("{}: projected FCF {:?}", snapshot.ticker, fcf);

    Ok(FcfProjection {
        ticker: snapshot.ticker.clone(),
        year_one_fcf: round2(fcf[0]),
        year_two_fcf: round2(fcf[1]),
        year_three_fcf: round2(fcf[2]),
        year_four_fcf: round2(fcf[3]),
        year_five_fcf: round2(fcf[4]),
    })
}

/// `EBIT x (1 - tax) + D&A - capex + NWC` for each forecast year. The NWC
/// level is added as-is, not the year-over-year increase (see DESIGN.md).
pub fn combine_fcf(
    ebit: &[f64],
    tax_rate: f64,
    dep_amort: &[f64],
    capex: &[f64],
    nwc: &[f64],
) -> Vec<f64> {
    (0..FORECAST_YEARS)
        .map(|y| ebit[y] * (1.0 - tax_rate) + dep_amort[y] - capex[y] + nwc[y])
        .collect()
}

fn project_metric(series: &[f64], label: &str) -> Result<Vec<f64>, EngineError> {
    let growth = reverse_average_growth_rate(series).map_err(|err| match err {
        EngineError::Computation(detail) => {
            EngineError::Computation(format!("{}: {}", label, detail))
        }
        other => other,
    })?;
    Ok(project_forward(series[0], growth))
}

fn net_working_capital(snapshot: &FinancialSnapshot) -> Result<Vec<f64>, EngineError> {
    if snapshot.current_assets.len() < GROWTH_WINDOW
        || snapshot.current_liabilities.len() < GROWTH_WINDOW
    {
        return Err(EngineError::computation(format!(
            "need {} trailing periods of current assets and liabilities",
            GROWTH_WINDOW
        )));
    }
    Ok(snapshot
        .current_assets
        .iter()
        .zip(snapshot.current_liabilities.iter())
        .take(GROWTH_WINDOW)
        .map(|(assets, liabilities)| assets - liabilities)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn combine_applies_tax_shield_to_ebit() {
        let ebit = vec![100.0, 100.0, 100.0, 100.0, 100.0];
        let zeros = vec![0.0; 5];
        let fcf = combine_fcf(&ebit, 0.25, &zeros, &zeros, &zeros);
        assert_eq!(fcf.len(), 5);
        assert!(fcf.iter().all(|v| close(*v, 75.0, 1e-12)));
    }

    #[test]
    fn combine_adds_nwc_level() {
        let ebit = vec![100.0; 5];
        let dep_amort = vec![10.0; 5];
        let capex = vec![15.0; 5];
        let nwc = vec![20.0; 5];
        let fcf = combine_fcf(&ebit, 0.20, &dep_amort, &capex, &nwc);
        // 100*0.8 + 10 - 15 + 20
        assert!(fcf.iter().all(|v| close(*v, 95.0, 1e-12)));
    }

    fn snapshot() -> FinancialSnapshot {
        FinancialSnapshot {
            ticker: "TEST".to_string(),
            // 10% growth per year, latest first
            ebit: vec![133.1, 121.0, 110.0, 100.0],
            // flat series project to their current level
            dep_amort: vec![10.0, 10.0, 10.0, 10.0],
            capex: vec![15.0, 15.0, 15.0, 15.0],
            current_assets: vec![70.0, 70.0, 70.0, 70.0],
            current_liabilities: vec![50.0, 50.0, 50.0, 50.0],
            tax_provision: vec![20.0, 22.0, 24.0],
            pretax_income: vec![100.0, 100.0, 100.0],
            ..FinancialSnapshot::default()
        }
    }

    #[test]
    fn projects_each_metric_independently() {
        let projection = project_five_year_fcf(&snapshot()).unwrap();
        // EBIT grows 10%/year from 133.1; tax 0.22; D&A 10 - capex 15 + NWC 20
        let expected_year_one = 133.1 * 1.1 * 0.78 + 10.0 - 15.0 + 20.0;
        assert!(close(projection.year_one_fcf, round2(expected_year_one), 1e-9));
        let expected_year_five = 133.1 * 1.1f64.powi(5) * 0.78 + 15.0;
        assert!(close(projection.year_five_fcf, round2(expected_year_five), 1e-9));
    }

    #[test]
    fn fails_on_short_ebit_history() {
        let mut snapshot = snapshot();
        snapshot.ebit = vec![133.1, 121.0];
        assert!(matches!(
            project_five_year_fcf(&snapshot),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn fails_on_zero_denominator_in_nwc() {
        let mut snapshot = snapshot();
        // assets equal liabilities in a prior period -> zero NWC denominator
        snapshot.current_assets = vec![70.0, 50.0, 70.0, 70.0];
        assert!(matches!(
            project_five_year_fcf(&snapshot),
            Err(EngineError::Computation(_))
        ));
    }
}
