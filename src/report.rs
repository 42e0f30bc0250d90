use std::fmt::Write;

use chrono::{Months, NaiveDate};

use crate::chances;
use crate::forecast;
use crate::models::{Component, PromotionRecord, Rank};
use crate::slice::DataSlice;

/// Overall share of eligible soldiers promoted across the slice, as a
/// percentage. Months missing either count are left out of the totals.
pub fn promotion_percentage(records: &[PromotionRecord], rank: Rank) -> f64 {
    let mut total_promoted = 0i64;
    let mut total_eligible = 0i64;

    for record in records {
        if let (Some(promoted), Some(eligible)) = (record.promotions(rank), record.eligibles(rank))
        {
            total_promoted += promoted as i64;
            total_eligible += eligible as i64;
        }
    }

    if total_eligible > 0 {
        total_promoted as f64 / total_eligible as f64 * 100.0
    } else {
        0.0
    }
}

pub struct ReportScope<'a> {
    pub component: Component,
    pub rank: Rank,
    pub mos: &'a str,
    pub start_month: NaiveDate,
    pub end_month: NaiveDate,
    pub points: Option<i32>,
    pub confidence_level: u32,
    pub dedup_months: bool,
}

pub fn build_report(scope: &ReportScope<'_>, records: &[PromotionRecord]) -> String {
    let slice = DataSlice::build(records, scope.rank, scope.dedup_months);
    let forecast = forecast::forecast_cutoff(&slice, scope.confidence_level);

    let mut output = String::new();

    let _ = writeln!(output, "# Promotion Cutoff Report");
    let _ = writeln!(
        output,
        "MOS {} ({}, {}), {} through {}",
        scope.mos,
        scope.component.as_db_str(),
        scope.rank.label(),
        scope.start_month.format("%Y-%b"),
        scope.end_month.format("%Y-%b")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Next Month's Forecast");

    match forecast {
        Some(result) => {
            let next_month = slice
                .latest_month()
                .and_then(|month| month.checked_add_months(Months::new(1)));
            if let Some(next_month) = next_month {
                let _ = writeln!(
                    output,
                    "Predicted cutoff for {}: {}",
                    next_month.format("%Y-%b"),
                    result.predicted_cutoff
                );
            }
            let _ = writeln!(
                output,
                "{}% chance the cutoff lands between {} and {}.",
                result.confidence_level, result.interval_lower, result.interval_upper
            );
        }
        None => {
            let _ = writeln!(output, "Not enough data for a prediction.");
        }
    }

    if let Some(points) = scope.points {
        let estimate = chances::promotion_chances(&slice, Some(points));
        let _ = writeln!(output);
        let _ = writeln!(output, "## Promotion Chances at {points} Points");
        if estimate.total_months == 0 {
            let _ = writeln!(output, "No cutoff history in this window.");
        } else {
            let _ = writeln!(
                output,
                "Your points cleared the cutoff in {} of {} months ({:.1}%).",
                estimate.months_cleared, estimate.total_months, estimate.historical_pct
            );
            let _ = writeln!(
                output,
                "Volatility-adjusted chance of promotion: {:.1}%",
                estimate.adjusted_pct
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Competitiveness");

    if records.is_empty() {
        let _ = writeln!(output, "No records in this window.");
    } else {
        let _ = writeln!(
            output,
            "{:.1}% of eligible soldiers were promoted across this window.",
            promotion_percentage(records, scope.rank)
        );
    }

    let mut recent: Vec<&PromotionRecord> = records.iter().collect();
    recent.sort_by(|a, b| b.report_month.cmp(&a.report_month));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Months");

    if recent.is_empty() {
        let _ = writeln!(output, "No records in this window.");
    } else {
        for record in recent.iter().take(6) {
            let cutoff = match record.cutoff(scope.rank) {
                Some(cutoff) => format!("cutoff {cutoff}"),
                None => "no promotions".to_string(),
            };
            let counts = match (record.promotions(scope.rank), record.eligibles(scope.rank)) {
                (Some(promoted), Some(eligible)) => {
                    format!(", {promoted} of {eligible} eligible promoted")
                }
                _ => String::new(),
            };
            let _ = writeln!(
                output,
                "- {}: {}{}",
                record.report_month.format("%Y-%b"),
                cutoff,
                counts
            );
        }
    }

    output
}
