// src/services/growth.rs
//
// Growth-rate estimators feeding the projection engines. The two engines
// deliberately keep their own period-over-period conventions; unifying them
// would change every computed valuation.

use crate::services::error::EngineError;

/// Projection horizon shared by both engines.
pub const FORECAST_YEARS: usize = 5;

/// Trailing periods consumed by the growth estimators.
pub const GROWTH_WINDOW: usize = 4;

/// Trailing periods averaged for the effective tax rate.
pub const TAX_WINDOW: usize = 3;

// Denominators below this magnitude would turn a statement quirk into
// inf/NaN output, so they fail the whole pipeline instead.
const MIN_DENOMINATOR: f64 = 1e-9;

/// Blended growth rate used by the DCF engine: the series (most-recent-first)
/// is reversed into chronological order and the arithmetic mean of the
/// consecutive percentage changes `(v[i] - v[i-1]) / v[i-1]` is returned.
pub fn mean_growth_rate(series: &[f64]) -> Result<f64, EngineError> {
    if series.len() < 2 {
        return Err(EngineError::computation(format!(
            "need at least 2 trailing periods for a growth rate, got {}",
            series.len()
        )));
    }

    let chronological: Vec<f64> = series.iter().rev().copied().collect();
    let mut changes = Vec::with_capacity(chronological.len() - 1);
    for pair in chronological.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.abs() < MIN_DENOMINATOR {
            return Err(EngineError::computation(
                "zero prior-period value in growth-rate series",
            ));
        }
        changes.push((next - prev) / prev);
    }

    Ok(changes.iter().sum::<f64>() / changes.len() as f64)
}

/// Growth rate used by the FCF engine over the 4 most recent periods
/// (index 0 = latest). The three changes are taken newest-to-oldest as
/// `(v[i] - v[i-1]) / v[i]` and the sum is divided by -3; the sign flip
/// converts the backward framing into a forward rate.
pub fn reverse_average_growth_rate(series: &[f64]) -> Result<f64, EngineError> {
    if series.len() < GROWTH_WINDOW {
        return Err(EngineError::computation(format!(
            "need {} trailing periods for a growth rate, got {}",
            GROWTH_WINDOW,
            series.len()
        )));
    }

    let mut sum = 0.0;
    for i in 1..GROWTH_WINDOW {
        if series[i].abs() < MIN_DENOMINATOR {
            return Err(EngineError::computation(
                "zero prior-period value in growth-rate series",
            ));
        }
        sum += (series[i] - series[i - 1]) / series[i];
    }

    Ok(sum / -(GROWTH_WINDOW as f64 - 1.0))
}

/// Effective tax rate: mean of `tax provision / pretax income` over the 3
/// most recent periods. A direct ratio average, not a period-over-period
/// change.
pub fn average_tax_rate(tax_provision: &[f64], pretax_income: &[f64]) -> Result<f64, EngineError> {
    if tax_provision.len() < TAX_WINDOW || pretax_income.len() < TAX_WINDOW {
        return Err(EngineError::computation(format!(
            "need {} trailing periods of tax provision and pretax income",
            TAX_WINDOW
        )));
    }

    let mut sum = 0.0;
    for i in 0..TAX_WINDOW {
        if pretax_income[i].abs() < MIN_DENOMINATOR {
            return Err(EngineError::computation("zero pretax income in tax-rate window"));
        }
        sum += tax_provision[i] / pretax_income[i];
    }

    Ok(sum / TAX_WINDOW as f64)
}

/// Compound a seed value forward over the forecast horizon. Returns exactly
/// `FORECAST_YEARS` values; the seed itself is not included.
pub fn project_forward(seed: f64, rate: f64) -> Vec<f64> {
    let mut projected = Vec::with_capacity(FORECAST_YEARS);
    let mut current = seed;
    for _ in 0..FORECAST_YEARS {
        current *= 1.0 + rate;
        projected.push(current);
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn mean_growth_rate_positive_for_increasing_series() {
        // Most-recent-first: revenue grew every year
        let rate = mean_growth_rate(&[133.1, 121.0, 110.0, 100.0]).unwrap();
        assert!(rate > 0.0);
        assert!(close(rate, 0.10, 1e-9), "rate was {}", rate);
    }

    #[test]
    fn mean_growth_rate_negative_for_decreasing_series() {
        let rate = mean_growth_rate(&[70.0, 80.0, 90.0, 100.0]).unwrap();
        assert!(rate < 0.0);
    }

    #[test]
    fn mean_growth_rate_rejects_short_series() {
        assert!(matches!(
            mean_growth_rate(&[100.0]),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn mean_growth_rate_rejects_zero_denominator() {
        assert!(matches!(
            mean_growth_rate(&[100.0, 50.0, 0.0]),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn reverse_average_growth_rate_matches_policy_a_on_steady_growth() {
        // Same 10%-per-year history, latest first; the backward framing and
        // the sign flip must land on a positive forward rate.
        let rate = reverse_average_growth_rate(&[133.1, 121.0, 110.0, 100.0]).unwrap();
        assert!(close(rate, 0.10, 1e-9), "rate was {}", rate);
    }

    #[test]
    fn reverse_average_growth_rate_negative_for_shrinking_company() {
        let rate = reverse_average_growth_rate(&[100.0, 110.0, 121.0, 133.1]).unwrap();
        assert!(rate < 0.0);
    }

    #[test]
    fn reverse_average_growth_rate_needs_four_periods() {
        assert!(matches!(
            reverse_average_growth_rate(&[100.0, 90.0, 80.0]),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn average_tax_rate_is_direct_ratio_mean() {
        let rate = average_tax_rate(&[20.0, 22.0, 24.0], &[100.0, 100.0, 100.0]).unwrap();
        assert!(close(rate, 0.22, 1e-12), "rate was {}", rate);
    }

    #[test]
    fn average_tax_rate_rejects_zero_pretax_income() {
        assert!(matches!(
            average_tax_rate(&[20.0, 22.0, 24.0], &[100.0, 0.0, 100.0]),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn project_forward_is_identity_under_zero_growth() {
        let projected = project_forward(50.0, 0.0);
        assert_eq!(projected.len(), FORECAST_YEARS);
        assert!(projected.iter().all(|v| close(*v, 50.0, 1e-12)));
    }

    #[test]
    fn project_forward_always_produces_five_values() {
        assert_eq!(project_forward(0.0, 0.3).len(), FORECAST_YEARS);
        assert_eq!(project_forward(-10.0, 1.5).len(), FORECAST_YEARS);
    }

    #[test]
    fn ten_percent_growth_compounds_latest_fcf() {
        let rate = mean_growth_rate(&[133.1, 121.0, 110.0, 100.0]).unwrap();
        let projected = project_forward(50.0, rate);
        let expected = [55.0, 60.5, 66.55, 73.205, 80.5255];
        for (got, want) in projected.iter().zip(expected.iter()) {
            assert!(close(*got, *want, 1e-6), "got {} want {}", got, want);
        }
    }
}
