use std::path::PathBuf;

use anyhow::Context;
use chrono::{Months, NaiveDate};
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod chances;
mod db;
mod forecast;
mod models;
mod report;
mod slice;
mod stats;

use models::{Component, Rank};
use slice::DataSlice;

#[derive(Parser)]
#[command(name = "cutoff-tracker")]
#[command(about = "Promotion cutoff tracker and forecaster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Filters selecting one slice of the historical dataset. Months are given
/// in the dataset's own format, e.g. 2025-Jan.
#[derive(Args)]
struct SliceScope {
    #[arg(long, value_name = "YYYY-MMM")]
    from: String,
    #[arg(long, value_name = "YYYY-MMM")]
    to: String,
    #[arg(long, value_enum)]
    component: Component,
    #[arg(long, value_enum)]
    rank: Rank,
    #[arg(long)]
    mos: String,
    /// Keep only the first record when a month was reported more than once.
    /// By default duplicates stay and weight that month twice.
    #[arg(long)]
    dedup_months: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import the compiled master dataset from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Predict next month's cutoff with a confidence interval
    Forecast {
        #[command(flatten)]
        scope: SliceScope,
        #[arg(long, default_value_t = 95, value_parser = clap::value_parser!(u32).range(1..=99))]
        confidence: u32,
        #[arg(long)]
        json: bool,
    },
    /// Estimate historical promotion chances for a point total
    Chances {
        #[command(flatten)]
        scope: SliceScope,
        #[arg(long)]
        points: i32,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        scope: SliceScope,
        #[arg(long)]
        points: Option<i32>,
        #[arg(long, default_value_t = 95, value_parser = clap::value_parser!(u32).range(1..=99))]
        confidence: u32,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn parse_month(value: &str) -> anyhow::Result<NaiveDate> {
    db::parse_report_month(value)
        .with_context(|| format!("invalid month '{value}', expected e.g. 2025-Jan"))
}

async fn fetch_scope(
    pool: &sqlx::PgPool,
    scope: &SliceScope,
) -> anyhow::Result<Vec<models::PromotionRecord>> {
    let start_month = parse_month(&scope.from)?;
    let end_month = parse_month(&scope.to)?;
    db::fetch_records(pool, start_month, end_month, scope.component, &scope.mos).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a production Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} records from {}.", csv.display());
        }
        Commands::Forecast {
            scope,
            confidence,
            json,
        } => {
            let records = fetch_scope(&pool, &scope).await?;
            let data = DataSlice::build(&records, scope.rank, scope.dedup_months);
            let result = forecast::forecast_cutoff(&data, confidence);

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match result {
                    Some(result) => {
                        let next_month = data
                            .latest_month()
                            .and_then(|month| month.checked_add_months(Months::new(1)))
                            .map(|month| month.format("%Y-%b").to_string())
                            .unwrap_or_else(|| "next month".to_string());
                        println!(
                            "Predicted cutoff for {next_month}: {}",
                            result.predicted_cutoff
                        );
                        println!(
                            "{}% chance the cutoff lands between {} and {}.",
                            result.confidence_level, result.interval_lower, result.interval_upper
                        );
                    }
                    None => println!("Not enough data for a prediction."),
                }
            }
        }
        Commands::Chances {
            scope,
            points,
            json,
        } => {
            let records = fetch_scope(&pool, &scope).await?;
            let data = DataSlice::build(&records, scope.rank, scope.dedup_months);
            let estimate = chances::promotion_chances(&data, Some(points));

            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else if estimate.total_months == 0 {
                println!("No cutoff history for this window.");
            } else {
                println!(
                    "Points {points} cleared the cutoff in {} of {} months ({:.1}%).",
                    estimate.months_cleared, estimate.total_months, estimate.historical_pct
                );
                println!(
                    "Volatility-adjusted chance of promotion: {:.1}%.",
                    estimate.adjusted_pct
                );
            }
        }
        Commands::Report {
            scope,
            points,
            confidence,
            out,
        } => {
            let records = fetch_scope(&pool, &scope).await?;
            let report_scope = report::ReportScope {
                component: scope.component,
                rank: scope.rank,
                mos: &scope.mos,
                start_month: parse_month(&scope.from)?,
                end_month: parse_month(&scope.to)?,
                points,
                confidence_level: confidence,
                dedup_months: scope.dedup_months,
            };
            let report = report::build_report(&report_scope, &records);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
