//! Operator CLI: run the pipeline, re-run analysis, validate predictions
//! and print daily reports without going through the HTTP API.

use chrono::{Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use trendscope_analyzer::{LlmClient, RandomBaselineScorer};
use trendscope_collect::{default_collectors, Fetcher};
use trendscope_pipeline::PipelineDeps;

#[derive(Debug, Parser)]
#[command(name = "trendscope-cli")]
#[command(about = "Trendscope pipeline command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full daily pipeline: collect, aggregate, analyze, predict.
    Run {
        /// Ingestion date, defaults to today (UTC).
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Analysis model, defaults to the configured backend's default.
        #[arg(long)]
        model: Option<String>,
    },
    /// Re-aggregate and re-analyze an already-collected date.
    Analyze {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Score a past prediction against what was actually collected.
    Validate {
        /// Date the prediction was made for.
        #[arg(long)]
        prediction_date: NaiveDate,
        /// Date whose collected data serves as ground truth, defaults to
        /// the day after the prediction date.
        #[arg(long)]
        actual_date: Option<NaiveDate>,
    },
    /// Print the stored summary and recent analyses for a date.
    Report {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = trendscope_core::load_app_config()?;

    let pool_config = trendscope_db::PoolConfig::from_app_config(&config);
    let pool = trendscope_db::connect_pool(&config.database_url, pool_config).await?;
    trendscope_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Run { date, model } => {
            let deps = build_deps(&config, pool)?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let summary =
                trendscope_pipeline::run(&deps, date, "cli", model.as_deref()).await?;
            println!(
                "run {} for {} collected {} items (total today: {})",
                summary.run_id, summary.date, summary.items_collected, summary.today_stats.total
            );
            print_analysis_outcome(summary.trend.as_ref(), summary.prediction.as_ref());
        }
        Commands::Analyze { date, model } => {
            let deps = build_deps(&config, pool)?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let summary = trendscope_pipeline::analyze(&deps, date, model.as_deref()).await?;
            println!(
                "analyzed {} ({} items on record)",
                summary.date, summary.today_stats.total
            );
            print_analysis_outcome(summary.trend.as_ref(), summary.prediction.as_ref());
        }
        Commands::Validate {
            prediction_date,
            actual_date,
        } => {
            let actual_date = actual_date.unwrap_or(prediction_date + Duration::days(1));
            let outcome = trendscope_pipeline::validate_prediction(
                &pool,
                &RandomBaselineScorer,
                prediction_date,
                actual_date,
            )
            .await?;
            println!(
                "prediction for {prediction_date} scored {:.2} against {actual_date}: {}",
                outcome.accuracy_score, outcome.notes
            );
        }
        Commands::Report { date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            print_report(&pool, date).await?;
        }
    }

    Ok(())
}

fn build_deps(
    config: &trendscope_core::AppConfig,
    pool: sqlx::PgPool,
) -> anyhow::Result<PipelineDeps> {
    let llm = LlmClient::from_app_config(config)?;
    Ok(PipelineDeps {
        pool,
        fetcher: Fetcher::from_app_config(config)?,
        feeds: trendscope_core::load_feeds(&config.feeds_path)?,
        collectors: default_collectors(),
        model: llm.default_model().to_string(),
        llm,
    })
}

fn print_analysis_outcome(
    trend: Option<&trendscope_analyzer::TrendAnalysis>,
    prediction: Option<&trendscope_analyzer::TrendPrediction>,
) {
    match trend {
        Some(t) => {
            println!("trend insights (confidence {:.2}):", t.confidence_score);
            for insight in &t.insights {
                println!("  - {insight}");
            }
        }
        None => println!("no trend analysis produced"),
    }
    match prediction {
        Some(p) => {
            println!("predictions (confidence {:.2}):", p.confidence_score);
            for line in &p.predictions {
                println!("  - {line}");
            }
            for risk in &p.risks {
                println!("  ! {risk}");
            }
        }
        None => println!("no prediction produced"),
    }
}

async fn print_report(pool: &sqlx::PgPool, date: NaiveDate) -> anyhow::Result<()> {
    match trendscope_db::get_daily_summary(pool, date).await? {
        Some(summary) => {
            println!("summary for {date}:");
            println!(
                "  novel {} / drama {} / comic {} / news {} / entertainment {} (total {})",
                summary.novel_count,
                summary.drama_count,
                summary.comic_count,
                summary.news_count,
                summary.entertainment_count,
                summary.total_count
            );
        }
        None => println!("no summary stored for {date}"),
    }

    let analyses = trendscope_db::recent_analyses(pool, 5).await?;
    if analyses.is_empty() {
        println!("no analyses on record");
        return Ok(());
    }

    println!("recent analyses:");
    for row in analyses {
        println!(
            "  [{}] {} {} (confidence {:.2})",
            row.id, row.analysis_date, row.kind, row.confidence_score
        );
    }
    Ok(())
}
