use chrono::{Datelike, Months};

use crate::models::ForecastResult;
use crate::slice::DataSlice;
use crate::stats::normal_quantile;

/// Fewest observations that give the regression a defined residual error.
const MIN_OBSERVATIONS: usize = 3;

/// Published cutoffs never leave this band, so the interval is clamped to it
/// after rounding.
const SCORE_FLOOR: f64 = 24.0;
const SCORE_CEILING: f64 = 798.0;

/// Predict next month's cutoff with a prediction interval at the requested
/// confidence level (a percentage, e.g. 95).
///
/// Fits ordinary least squares of cutoff against the day number of each
/// report month, then projects one calendar month past the latest month in
/// the slice. The interval uses the standard single-observation prediction
/// error, so it widens with distance from the training mean, and the
/// critical value comes from the normal approximation rather than
/// Student's t.
///
/// Returns `None` when fewer than three observations remain, when the date
/// axis has no variance (duplicate months collapsing it), or when the
/// confidence level is outside (0, 100). All of these are valid "no
/// prediction possible" outcomes, not errors.
pub fn forecast_cutoff(slice: &DataSlice, confidence_level: u32) -> Option<ForecastResult> {
    if confidence_level == 0 || confidence_level >= 100 {
        return None;
    }

    let observations = slice.observations();
    let n = observations.len();
    if n < MIN_OBSERVATIONS {
        return None;
    }

    let xs: Vec<f64> = observations
        .iter()
        .map(|obs| obs.month.num_days_from_ce() as f64)
        .collect();
    let ys: Vec<f64> = observations.iter().map(|obs| obs.cutoff as f64).collect();

    let n_f = n as f64;
    let x_mean = xs.iter().sum::<f64>() / n_f;
    let y_mean = ys.iter().sum::<f64>() / n_f;

    let sxx: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }

    let sxy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let target_month = slice.latest_month()?.checked_add_months(Months::new(1))?;
    let target_x = target_month.num_days_from_ce() as f64;
    let y_pred = intercept + slope * target_x;

    let ssr: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (y - (intercept + slope * x)).powi(2))
        .sum();
    let stderr = (ssr / (n_f - 2.0)).sqrt();
    let se_pred = stderr * (1.0 + 1.0 / n_f + (target_x - x_mean).powi(2) / sxx).sqrt();

    let p = 0.5 + confidence_level as f64 / 200.0;
    let z = normal_quantile(p);

    // Clamps apply after rounding.
    Some(ForecastResult {
        predicted_cutoff: y_pred.round().max(0.0) as i32,
        interval_lower: (y_pred - z * se_pred).round().max(SCORE_FLOOR) as i32,
        interval_upper: (y_pred + z * se_pred).round().min(SCORE_CEILING) as i32,
        confidence_level,
    })
}
