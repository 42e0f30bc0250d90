use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Component {
    Active,
    Reserve,
}

impl Component {
    /// Value as stored in the database and the published CSV.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Component::Active => "ACTIVE",
            Component::Reserve => "RESERVE",
        }
    }

    pub fn parse_db_str(value: &str) -> Option<Component> {
        match value.to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Component::Active),
            "RESERVE" => Some(Component::Reserve),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Rank {
    Sgt,
    Ssg,
}

impl Rank {
    pub fn label(&self) -> &'static str {
        match self {
            Rank::Sgt => "SGT",
            Rank::Ssg => "SSG",
        }
    }
}

/// One row of the historical dataset: a single MOS/component line from one
/// monthly cutoff report, carrying both ranks' column families.
#[derive(Debug, Clone)]
pub struct PromotionRecord {
    pub report_month: NaiveDate,
    pub component: Component,
    pub mos: String,
    pub cutoff_sgt: Option<i32>,
    pub cutoff_ssg: Option<i32>,
    pub eligibles_sgt: Option<i32>,
    pub eligibles_ssg: Option<i32>,
    pub promotions_sgt: Option<i32>,
    pub promotions_ssg: Option<i32>,
}

impl PromotionRecord {
    /// Cutoff score for one rank. `None` means no promotions that cycle,
    /// not a cutoff of zero.
    pub fn cutoff(&self, rank: Rank) -> Option<i32> {
        match rank {
            Rank::Sgt => self.cutoff_sgt,
            Rank::Ssg => self.cutoff_ssg,
        }
    }

    pub fn eligibles(&self, rank: Rank) -> Option<i32> {
        match rank {
            Rank::Sgt => self.eligibles_sgt,
            Rank::Ssg => self.eligibles_ssg,
        }
    }

    pub fn promotions(&self, rank: Rank) -> Option<i32> {
        match rank {
            Rank::Sgt => self.promotions_sgt,
            Rank::Ssg => self.promotions_ssg,
        }
    }
}

/// Next-month cutoff prediction with its interval, already rounded and
/// clamped to the valid score band.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ForecastResult {
    pub predicted_cutoff: i32,
    pub interval_lower: i32,
    pub interval_upper: i32,
    pub confidence_level: u32,
}

/// Historical promotion chances for a given point total. `adjusted_pct` is
/// the headline number; the remaining fields are shown alongside it.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProbabilityEstimate {
    pub months_cleared: usize,
    pub total_months: usize,
    pub historical_pct: f64,
    pub volatility_fraction: f64,
    pub adjusted_pct: f64,
}
