use crate::models::ProbabilityEstimate;
use crate::slice::DataSlice;
use crate::stats::percentile;

/// Fraction of the change distribution treated as ordinary movement; months
/// above the 75th percentile of absolute month-over-month change count as
/// high-volatility.
const VOLATILITY_QUANTILE: f64 = 0.75;

/// Estimate the chance the given point total earns a promotion, from how
/// often it cleared the historical cutoff.
///
/// The raw clear rate is an optimistic baseline, so it is discounted by the
/// fraction of months with an outsized cutoff jump. That is a heuristic
/// hedge against regime change, not a calibrated posterior.
///
/// Missing points or an empty slice produce the all-zero estimate; both are
/// defined defaults, not errors. A single-month slice has no change
/// distribution and takes no volatility penalty.
pub fn promotion_chances(slice: &DataSlice, points: Option<i32>) -> ProbabilityEstimate {
    let points = match points {
        Some(points) if !slice.is_empty() => points,
        _ => return ProbabilityEstimate::default(),
    };

    let cutoffs = slice.cutoffs();
    let total_months = slice.len();
    let months_cleared = cutoffs
        .iter()
        .filter(|cutoff| **cutoff <= points as f64)
        .count();
    let base_rate = months_cleared as f64 / total_months as f64;

    // The first month has no prior report to diff against and is excluded
    // from the change distribution, not treated as a zero change.
    let changes: Vec<f64> = cutoffs
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).abs())
        .collect();

    let high_volatility_months = match percentile(&changes, VOLATILITY_QUANTILE) {
        Some(threshold) => changes.iter().filter(|change| **change > threshold).count(),
        None => 0,
    };
    let volatility_fraction = high_volatility_months as f64 / total_months as f64;

    let adjusted = (1.0 - volatility_fraction).max(0.0) * base_rate;

    ProbabilityEstimate {
        months_cleared,
        total_months,
        historical_pct: base_rate * 100.0,
        volatility_fraction,
        adjusted_pct: adjusted * 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Component, PromotionRecord, Rank};
    use chrono::{Months, NaiveDate};

    fn slice_of(cutoffs: &[i32]) -> DataSlice {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let records: Vec<PromotionRecord> = cutoffs
            .iter()
            .enumerate()
            .map(|(i, cutoff)| PromotionRecord {
                report_month: start.checked_add_months(Months::new(i as u32)).unwrap(),
                component: Component::Active,
                mos: "25B".to_string(),
                cutoff_sgt: Some(*cutoff),
                cutoff_ssg: None,
                eligibles_sgt: Some(100),
                eligibles_ssg: None,
                promotions_sgt: Some(10),
                promotions_ssg: None,
            })
            .collect();
        DataSlice::build(&records, Rank::Sgt, false)
    }

    #[test]
    fn no_points_means_zero_estimate() {
        let estimate = promotion_chances(&slice_of(&[300, 310]), None);
        assert_eq!(estimate.adjusted_pct, 0.0);
        assert_eq!(estimate.total_months, 0);
    }

    #[test]
    fn empty_slice_means_zero_estimate() {
        let estimate = promotion_chances(&slice_of(&[]), Some(500));
        assert_eq!(estimate.adjusted_pct, 0.0);
    }

    #[test]
    fn quiet_series_keeps_the_full_base_rate() {
        let estimate = promotion_chances(&slice_of(&[300, 302, 301, 303]), Some(305));
        assert_eq!(estimate.months_cleared, 4);
        assert_eq!(estimate.total_months, 4);
        assert!((estimate.historical_pct - 100.0).abs() < 1e-9);
        // Changes are [2, 1, 2]; none exceed their own 75th percentile of 2.
        assert_eq!(estimate.volatility_fraction, 0.0);
        assert!((estimate.adjusted_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn a_large_jump_discounts_the_base_rate() {
        // Changes are [2, 98, 1, 2]; 75th percentile is 26, so one of five
        // months counts as high-volatility.
        let estimate = promotion_chances(&slice_of(&[300, 302, 400, 401, 403]), Some(405));
        assert!((estimate.volatility_fraction - 0.2).abs() < 1e-9);
        assert!((estimate.adjusted_pct - 80.0).abs() < 1e-9);
    }

    #[test]
    fn partial_clear_rate_is_discounted_too() {
        let estimate = promotion_chances(&slice_of(&[300, 302, 400, 401, 403]), Some(302));
        assert_eq!(estimate.months_cleared, 2);
        assert!((estimate.historical_pct - 40.0).abs() < 1e-9);
        assert!((estimate.adjusted_pct - 32.0).abs() < 1e-9);
    }

    #[test]
    fn single_month_takes_no_volatility_penalty() {
        let estimate = promotion_chances(&slice_of(&[300]), Some(305));
        assert_eq!(estimate.volatility_fraction, 0.0);
        assert!((estimate.adjusted_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn raising_points_never_lowers_the_clear_rate() {
        let slice = slice_of(&[300, 302, 301, 303]);
        let mut previous = 0usize;
        for points in [299, 300, 301, 302, 303, 304] {
            let estimate = promotion_chances(&slice, Some(points));
            assert!(estimate.months_cleared >= previous);
            previous = estimate.months_cleared;
        }
    }

    #[test]
    fn estimate_stays_within_percentage_bounds() {
        let slices = [
            slice_of(&[300, 500, 200, 700, 100]),
            slice_of(&[798, 24, 798, 24]),
            slice_of(&[450]),
        ];
        for slice in &slices {
            for points in [0, 300, 799] {
                let estimate = promotion_chances(slice, Some(points));
                assert!(estimate.adjusted_pct >= 0.0);
                assert!(estimate.adjusted_pct <= 100.0);
            }
        }
    }
}
