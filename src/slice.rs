use chrono::NaiveDate;

use crate::models::{PromotionRecord, Rank};

/// A single usable training point: the cutoff score published for one month.
#[derive(Debug, Clone, Copy)]
pub struct CutoffObservation {
    pub month: NaiveDate,
    pub cutoff: i32,
}

/// The cleaned, chronologically ordered input both estimators run on.
///
/// Built fresh per query from a record set that has already been restricted
/// to one component and MOS. Rows without a cutoff for the requested rank
/// are dropped; the rest are stable-sorted by month, so rows sharing a month
/// keep their source order. Duplicate months are legal and double-weight
/// that month in the regression unless `dedup_months` is set, which keeps
/// only the first row for each month.
#[derive(Debug, Clone)]
pub struct DataSlice {
    observations: Vec<CutoffObservation>,
}

impl DataSlice {
    pub fn build(records: &[PromotionRecord], rank: Rank, dedup_months: bool) -> Self {
        let mut observations: Vec<CutoffObservation> = records
            .iter()
            .filter_map(|record| {
                record.cutoff(rank).map(|cutoff| CutoffObservation {
                    month: record.report_month,
                    cutoff,
                })
            })
            .collect();

        observations.sort_by_key(|obs| obs.month);

        if dedup_months {
            observations.dedup_by_key(|obs| obs.month);
        }

        DataSlice { observations }
    }

    pub fn observations(&self) -> &[CutoffObservation] {
        &self.observations
    }

    pub fn cutoffs(&self) -> Vec<f64> {
        self.observations.iter().map(|obs| obs.cutoff as f64).collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn latest_month(&self) -> Option<NaiveDate> {
        self.observations.last().map(|obs| obs.month)
    }
}
