/// Quantile of the standard normal distribution, via the rational
/// approximation of Abramowitz & Stegun 26.2.23. Absolute error is below
/// 4.5e-4, which is plenty for turning a confidence percentage into a
/// critical value on a dataset this noisy.
pub fn normal_quantile(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return f64::NAN;
    }

    let t = if p < 0.5 {
        (-2.0 * p.ln()).sqrt()
    } else {
        (-2.0 * (1.0 - p).ln()).sqrt()
    };

    let c0 = 2.515517;
    let c1 = 0.802853;
    let c2 = 0.010328;
    let d1 = 1.432788;
    let d2 = 0.189269;
    let d3 = 0.001308;

    let q = t - (c0 + c1 * t + c2 * t * t) / (1.0 + d1 * t + d2 * t * t + d3 * t * t * t);

    if p < 0.5 {
        -q
    } else {
        q
    }
}

/// Percentile with linear interpolation between order statistics, matching
/// the interpolation the upstream dataset tooling uses. `q` is in [0, 1].
/// Returns `None` on an empty input.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let h = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;

    if lo == hi {
        return Some(sorted[lo]);
    }

    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_quantile_matches_common_critical_values() {
        assert!((normal_quantile(0.95) - 1.6449).abs() < 1e-3);
        assert!((normal_quantile(0.975) - 1.96).abs() < 1e-3);
        assert!((normal_quantile(0.995) - 2.5758).abs() < 1e-3);
    }

    #[test]
    fn normal_quantile_is_symmetric() {
        let upper = normal_quantile(0.975);
        let lower = normal_quantile(0.025);
        assert!((upper + lower).abs() < 1e-3);
    }

    #[test]
    fn normal_quantile_rejects_degenerate_probabilities() {
        assert!(normal_quantile(0.0).is_nan());
        assert!(normal_quantile(1.0).is_nan());
    }

    #[test]
    fn percentile_interpolates_between_order_statistics() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(4.0));
        assert_eq!(percentile(&values, 0.5), Some(2.5));
        assert_eq!(percentile(&values, 0.75), Some(3.25));
    }

    #[test]
    fn percentile_ignores_input_order() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&values, 0.75), Some(3.25));
    }

    #[test]
    fn percentile_of_empty_input_is_none() {
        assert_eq!(percentile(&[], 0.75), None);
    }

    #[test]
    fn percentile_of_single_value_is_that_value() {
        assert_eq!(percentile(&[7.0], 0.75), Some(7.0));
    }
}
