// src/services/chart.rs
//
// Renders one simulation batch to a PNG and hands back the base64 encoding.
// The bitmap backend wants a real file, so the artifact lives in the OS temp
// directory for the duration of the render and is removed on every exit path
// by the guard below.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use log::debug;
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use crate::models::SimulationBatch;
use crate::services::error::EngineError;

const CHART_WIDTH: u32 = 1000;
const CHART_HEIGHT: u32 = 600;

struct TempChartFile {
    path: PathBuf,
}

impl TempChartFile {
    fn new(ticker: &str) -> Self {
        let filename = format!("montecarlo_{}_{}.png", ticker, Utc::now().timestamp_millis());
        TempChartFile {
            path: std::env::temp_dir().join(filename),
        }
    }
}

impl Drop for TempChartFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn chart_err(err: impl Display) -> EngineError {
    EngineError::computation(format!("chart rendering failed: {}", err))
}

/// Render every simulated path plus the mean/best/worst trajectories and
/// return the PNG as a base64 string.
pub fn render_simulation_chart(
    batch: &SimulationBatch,
    ticker: &str,
) -> Result<String, EngineError> {
    if batch.paths.is_empty() || batch.num_days() == 0 {
        return Err(EngineError::computation("nothing to chart: empty simulation batch"));
    }

    let temp_file = TempChartFile::new(ticker);

    let days = batch.num_days() as i32;
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for path in &batch.paths {
        for price in path {
            y_min = y_min.min(*price);
            y_max = y_max.max(*price);
        }
    }
    if !(y_min.is_finite() && y_max.is_finite()) {
        return Err(EngineError::computation("non-finite prices in simulation batch"));
    }
    if y_max - y_min < f64::EPSILON {
        // constant paths still need a drawable range
        y_min -= 1.0;
        y_max += 1.0;
    }

    let mean = batch.mean_path();
    let best = batch.best_path();
    let worst = batch.worst_path();

    {
        let root =
            BitMapBackend::new(&temp_file.path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Monte Carlo Simulations for {}", ticker),
                ("sans-serif", 28),
            )
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0..days, y_min..y_max)
            .map_err(chart_err)?;

        chart
            .configure_mesh()
            .x_desc("Days")
            .y_desc("Price")
            .draw()
            .map_err(chart_err)?;

        for (i, path) in batch.paths.iter().enumerate() {
            let style = Palette99::pick(i).mix(0.4);
            chart
                .draw_series(LineSeries::new(series_points(path), &style))
                .map_err(chart_err)?;
        }

        let terminal = |path: &[f64]| path.last().copied().unwrap_or(0.0);
        chart
            .draw_series(LineSeries::new(series_points(&mean), &BLACK))
            .map_err(chart_err)?
            .label(format!("Most Probable (Mean): {:.2}", terminal(&mean)))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));
        chart
            .draw_series(LineSeries::new(series_points(&best), &GREEN))
            .map_err(chart_err)?
            .label(format!("Most Optimistic: {:.2}", terminal(&best)))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));
        chart
            .draw_series(LineSeries::new(series_points(&worst), &RED))
            .map_err(chart_err)?
            .label(format!("Least Optimistic: {:.2}", terminal(&worst)))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }

    let bytes = fs::read(&temp_file.path).map_err(chart_err)?;
    debug!("Rendered {} byte chart for {}", bytes.len(), ticker);
    Ok(STANDARD.encode(bytes))
}

fn series_points(path: &[f64]) -> impl Iterator<Item = (i32, f64)> + '_ {
    path.iter().enumerate().map(|(day, price)| (day as i32, *price))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_file_is_removed_on_drop() {
        let path = {
            let temp_file = TempChartFile::new("TEST");
            fs::write(&temp_file.path, b"png bytes").unwrap();
            assert!(temp_file.path.exists());
            temp_file.path.clone()
        };
        assert!(!path.exists());
    }

    #[test]
    fn empty_batch_is_rejected() {
        let batch = SimulationBatch {
            seed_price: 100.0,
            paths: Vec::new(),
        };
        assert!(matches!(
            render_simulation_chart(&batch, "TEST"),
            Err(EngineError::Computation(_))
        ));
    }
}
