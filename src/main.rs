use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use clap::{ArgGroup, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;

mod db;
mod models;
mod report;
mod rubric;

#[derive(Parser)]
#[command(name = "faculty-appraisal")]
#[command(about = "Faculty self-appraisal scoring and reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import course results from a CSV file
    ImportCourses {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Import precomputed research marks from a JSON file
    ImportResearch {
        #[arg(long)]
        json: PathBuf,
    },
    /// Score faculty against the appraisal rubric
    #[command(group(
        ArgGroup::new("scope")
            .args(["department", "email"])
            .multiple(false)
    ))]
    Score {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = current_academic_year())]
        year: i32,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown appraisal report
    #[command(group(
        ArgGroup::new("scope")
            .args(["department", "email"])
            .multiple(false)
    ))]
    Report {
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value_t = current_academic_year())]
        year: i32,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

/// Academic years run June to May; before June we are still in the
/// previous year's appraisal cycle.
fn current_academic_year() -> i32 {
    let today = chrono::Utc::now().date_naive();
    if today.month() >= 6 {
        today.year()
    } else {
        today.year() - 1
    }
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
        Commands::ImportCourses { csv } => {
            let inserted = db::import_courses(&pool, &csv).await?;
            println!("Inserted {inserted} course records from {}.", csv.display());
        }
        Commands::ImportResearch { json } => {
            let upserted = db::import_research(&pool, &json).await?;
            println!("Upserted {upserted} research marks from {}.", json.display());
        }
        Commands::Score {
            department,
            email,
            year,
            limit,
        } => {
            let appraisals = db::fetch_appraisals(
                &pool,
                year,
                email.as_deref(),
                department.as_deref(),
            )
            .await?;
            let scores = rubric::score_faculty(&appraisals);

            if scores.is_empty() {
                println!("No records found for academic year {}.", report::year_label(year));
                return Ok(());
            }

            println!("Faculty ranked by appraisal total:");
            for score in scores.iter().take(limit) {
                println!(
                    "- {} ({}, {}) total {}/{}",
                    score.faculty.full_name,
                    score.faculty.email,
                    score.faculty.department,
                    score.total.total,
                    rubric::NOMINAL_MAX
                );
                for line in &score.total.breakdown {
                    println!("    {}: {}/{}", line.category.label(), line.mark, line.max);
                }
            }
        }
        Commands::Report {
            department,
            email,
            year,
            out,
        } => {
            let appraisals = db::fetch_appraisals(
                &pool,
                year,
                email.as_deref(),
                department.as_deref(),
            )
            .await?;
            let report = report::build_report(
                department.as_deref().or(email.as_deref()),
                year,
                &appraisals,
            );
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
