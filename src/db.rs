use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{Component, PromotionRecord};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    // A realistic half-year of reports for two MOS codes.
    let records: Vec<(&str, &str, i32, Option<i32>, Option<i32>, i32, i32, i32, i32)> = vec![
        ("2024-10", "ACTIVE", 10, Some(447), Some(510), 412, 188, 31, 9),
        ("2024-11", "ACTIVE", 11, Some(452), Some(498), 405, 192, 28, 11),
        ("2024-12", "ACTIVE", 12, Some(449), None, 398, 190, 33, 0),
        ("2025-01", "ACTIVE", 1, Some(461), Some(522), 420, 197, 25, 8),
        ("2025-02", "ACTIVE", 2, Some(458), Some(515), 415, 201, 27, 10),
        ("2025-03", "ACTIVE", 3, Some(466), Some(531), 423, 205, 24, 7),
    ];

    for (label, component, month, cutoff_sgt, cutoff_ssg, elig_sgt, elig_ssg, promo_sgt, promo_ssg) in
        records
    {
        let year: i32 = label[..4].parse().context("invalid seed year")?;
        let report_month =
            NaiveDate::from_ymd_opt(year, month as u32, 1).context("invalid seed month")?;

        sqlx::query(
            r#"
            INSERT INTO promotion_points.monthly_records
            (id, report_month, component, mos, cutoff_sgt, cutoff_ssg,
             eligibles_sgt, eligibles_ssg, promotions_sgt, promotions_ssg, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report_month)
        .bind(component)
        .bind("25B")
        .bind(cutoff_sgt)
        .bind(cutoff_ssg)
        .bind(elig_sgt)
        .bind(elig_ssg)
        .bind(promo_sgt)
        .bind(promo_ssg)
        .bind(format!("seed-{label}-{component}-25B"))
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub async fn fetch_records(
    pool: &PgPool,
    start_month: NaiveDate,
    end_month: NaiveDate,
    component: Component,
    mos: &str,
) -> anyhow::Result<Vec<PromotionRecord>> {
    let rows = sqlx::query(
        "SELECT report_month, component, mos, cutoff_sgt, cutoff_ssg, \
         eligibles_sgt, eligibles_ssg, promotions_sgt, promotions_ssg \
         FROM promotion_points.monthly_records \
         WHERE report_month BETWEEN $1 AND $2 \
         AND component = $3 AND mos = $4 \
         ORDER BY report_month",
    )
    .bind(start_month)
    .bind(end_month)
    .bind(component.as_db_str())
    .bind(mos)
    .fetch_all(pool)
    .await?;

    let mut records = Vec::new();
    for row in rows {
        let component_value: String = row.get("component");
        let component = Component::parse_db_str(&component_value)
            .with_context(|| format!("unknown component '{component_value}' in database"))?;

        records.push(PromotionRecord {
            report_month: row.get("report_month"),
            component,
            mos: row.get("mos"),
            cutoff_sgt: row.get("cutoff_sgt"),
            cutoff_ssg: row.get("cutoff_ssg"),
            eligibles_sgt: row.get("eligibles_sgt"),
            eligibles_ssg: row.get("eligibles_ssg"),
            promotions_sgt: row.get("promotions_sgt"),
            promotions_ssg: row.get("promotions_ssg"),
        });
    }

    Ok(records)
}

/// Import the compiled master dataset CSV. Rows are keyed by
/// (month, component, MOS), so re-importing the same file is a no-op.
pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        #[serde(rename = "Date")]
        date: String,
        #[serde(rename = "Component")]
        component: String,
        #[serde(rename = "MOS")]
        mos: String,
        #[serde(rename = "Cutoff_SGT")]
        cutoff_sgt: String,
        #[serde(rename = "Cutoff_SSG")]
        cutoff_ssg: String,
        #[serde(rename = "Eligibles_SGT")]
        eligibles_sgt: String,
        #[serde(rename = "Eligibles_SSG")]
        eligibles_ssg: String,
        #[serde(rename = "Promotions_SGT")]
        promotions_sgt: String,
        #[serde(rename = "Promotions_SSG")]
        promotions_ssg: String,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let report_month = parse_report_month(&row.date)
            .with_context(|| format!("invalid Date value '{}'", row.date))?;
        let component = Component::parse_db_str(&row.component)
            .with_context(|| format!("invalid Component value '{}'", row.component))?;
        let source_key = format!("{}-{}-{}", row.date, component.as_db_str(), row.mos);

        let result = sqlx::query(
            r#"
            INSERT INTO promotion_points.monthly_records
            (id, report_month, component, mos, cutoff_sgt, cutoff_ssg,
             eligibles_sgt, eligibles_ssg, promotions_sgt, promotions_ssg, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report_month)
        .bind(component.as_db_str())
        .bind(&row.mos)
        .bind(numeric_cell(&row.cutoff_sgt))
        .bind(numeric_cell(&row.cutoff_ssg))
        .bind(numeric_cell(&row.eligibles_sgt))
        .bind(numeric_cell(&row.eligibles_ssg))
        .bind(numeric_cell(&row.promotions_sgt))
        .bind(numeric_cell(&row.promotions_ssg))
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

/// Parse the dataset's `YYYY-MMM` month labels (e.g. `2025-JAN`) to the
/// first day of that month.
pub fn parse_report_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%b-%d").ok()
}

/// Numeric CSV cells may hold `N/A` for months with no promotions; those
/// come through as missing, never zero.
fn numeric_cell(value: &str) -> Option<i32> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }
    trimmed.parse::<i32>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dataset_month_labels() {
        let month = parse_report_month("2025-JAN").unwrap();
        assert_eq!(month, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(
            parse_report_month("2024-Nov").unwrap(),
            NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()
        );
        assert!(parse_report_month("JAN-2025").is_none());
    }

    #[test]
    fn numeric_cells_treat_na_as_missing() {
        assert_eq!(numeric_cell("447"), Some(447));
        assert_eq!(numeric_cell(" 447 "), Some(447));
        assert_eq!(numeric_cell("N/A"), None);
        assert_eq!(numeric_cell(""), None);
        assert_eq!(numeric_cell("junk"), None);
    }
}
