//! Daily pipeline orchestration: collect, persist, aggregate, analyze,
//! predict — under a per-date run lock so overlapping triggers cannot
//! double-collect.

use chrono::{Duration, NaiveDate};
use sqlx::PgPool;
use thiserror::Error;

use trendscope_analyzer::{
    analyze_trends, predict_tomorrow, AccuracyScorer, CategorizedItem, LlmClient, TrendAnalysis,
    TrendPrediction, ValidationOutcome,
};
use trendscope_collect::{collect_all, CollectContext, Collector, Fetcher};
use trendscope_core::{ContentType, DailyStats, FeedSpec, TopItem, CONTENT_TYPES};
use trendscope_db::DbError;

/// Analysis kinds as stored in `ai_analyses.kind`.
pub const KIND_OVERALL: &str = "overall";
pub const KIND_PREDICTION: &str = "prediction";

/// How many top items per vertical feed the summary and the trend prompt.
const TOP_LIMIT: i64 = 10;

/// How many days of history feed the prediction prompt.
const HISTORY_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a pipeline run is already active for {date}")]
    RunInProgress { date: NaiveDate },

    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for PipelineError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::RunInProgress { date } => PipelineError::RunInProgress { date },
            other => PipelineError::Db(other),
        }
    }
}

/// Everything a pipeline run needs, injected by the binary that drives it.
pub struct PipelineDeps {
    pub pool: PgPool,
    pub fetcher: Fetcher,
    pub feeds: Vec<FeedSpec>,
    pub collectors: Vec<Box<dyn Collector>>,
    pub llm: LlmClient,
    /// Default model for analysis calls; empty means the provider default.
    pub model: String,
}

/// What one completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: i64,
    pub date: NaiveDate,
    pub items_collected: usize,
    pub today_stats: DailyStats,
    pub top_items: Vec<(ContentType, Vec<TopItem>)>,
    pub trend: Option<TrendAnalysis>,
    pub prediction: Option<TrendPrediction>,
}

/// What an aggregate-and-analyze pass (no collection) produced.
#[derive(Debug)]
pub struct AnalysisSummary {
    pub date: NaiveDate,
    pub today_stats: DailyStats,
    pub top_items: Vec<(ContentType, Vec<TopItem>)>,
    pub trend: Option<TrendAnalysis>,
    pub prediction: Option<TrendPrediction>,
}

/// Runs the full pipeline for one date.
///
/// Stages: acquire the run lock, collect from every source (each isolated),
/// persist the batch, aggregate the daily summary, then run trend analysis
/// and next-day prediction. Analysis stages are best-effort — a down model
/// yields a summary without analyses. A persistence failure marks the run
/// failed and aborts.
///
/// `model_override` picks the analysis model for this run only.
///
/// # Errors
///
/// Returns [`PipelineError::RunInProgress`] when another run for `date` is
/// still active, or [`PipelineError::Db`] when persistence fails.
pub async fn run(
    deps: &PipelineDeps,
    date: NaiveDate,
    trigger_source: &str,
    model_override: Option<&str>,
) -> Result<RunSummary, PipelineError> {
    let pool = &deps.pool;
    let model = model_override.unwrap_or(&deps.model);
    let run_id = trendscope_db::begin_run(pool, date, trigger_source).await?;

    tracing::info!(run_id, %date, trigger_source, "pipeline run started");
    trendscope_db::log(pool, "INFO", "pipeline", &format!("run {run_id} started for {date}"))
        .await;

    // Collect. Source failures are isolated inside collect_all.
    let ctx = CollectContext::new(deps.fetcher.clone(), deps.feeds.clone(), date);
    let items = collect_all(&ctx, &deps.collectors).await;
    tracing::info!(run_id, count = items.len(), "collection finished");

    // Persist. This is the one stage that must not fail silently.
    if let Err(e) = trendscope_db::insert_items(pool, &items).await {
        abort_run(pool, run_id, &e).await;
        return Err(e.into());
    }

    let analysis = match aggregate_and_analyze(deps, date, model).await {
        Ok(analysis) => analysis,
        Err(e) => {
            abort_run(pool, run_id, &e).await;
            return Err(e.into());
        }
    };

    let items_collected = items.len();
    trendscope_db::complete_run(pool, run_id, clamp_i32(items_collected)).await?;
    trendscope_db::log(
        pool,
        "INFO",
        "pipeline",
        &format!("run {run_id} completed with {items_collected} items"),
    )
    .await;
    tracing::info!(run_id, items_collected, "pipeline run completed");

    Ok(RunSummary {
        run_id,
        date,
        items_collected,
        today_stats: analysis.today_stats,
        top_items: analysis.top_items,
        trend: analysis.trend,
        prediction: analysis.prediction,
    })
}

/// Aggregates and analyzes an already-collected date without collecting
/// again. This is what a manual "re-run the analysis" trigger uses.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] when persistence fails.
pub async fn analyze(
    deps: &PipelineDeps,
    date: NaiveDate,
    model_override: Option<&str>,
) -> Result<AnalysisSummary, PipelineError> {
    let model = model_override.unwrap_or(&deps.model);
    Ok(aggregate_and_analyze(deps, date, model).await?)
}

async fn aggregate_and_analyze(
    deps: &PipelineDeps,
    date: NaiveDate,
    model: &str,
) -> Result<AnalysisSummary, DbError> {
    let pool = &deps.pool;

    // Aggregate today's summary.
    let stats = trendscope_db::daily_stats(pool, date).await?;
    let mut top_items = Vec::with_capacity(CONTENT_TYPES.len());
    for ct in CONTENT_TYPES {
        let items = trendscope_db::top_items_by_type(pool, ct, date, TOP_LIMIT).await?;
        top_items.push((ct, items));
    }
    trendscope_db::upsert_daily_summary(pool, date, stats, &top_items).await?;

    // Trend analysis over today's top items across all verticals.
    let categorized = categorized_from_tops(&top_items);
    let trend = analyze_trends(&deps.llm, model, &categorized).await;
    if let Some(analysis) = &trend {
        trendscope_db::append_analysis(
            pool,
            date,
            KIND_OVERALL,
            &serde_json::json!(analysis.insights),
            &serde_json::json!([]),
            analysis.confidence_score,
            &analysis.raw_response,
        )
        .await?;
    }

    // Next-day prediction from the preceding week plus today.
    let history =
        trendscope_db::stats_series(pool, date - Duration::days(1), HISTORY_DAYS).await?;
    let prediction = predict_tomorrow(&deps.llm, model, &history, &stats).await;
    if let Some(pred) = &prediction {
        trendscope_db::append_analysis(
            pool,
            date,
            KIND_PREDICTION,
            &serde_json::json!([]),
            &serde_json::json!(pred.predictions),
            pred.confidence_score,
            &pred.raw_response,
        )
        .await?;
    }

    Ok(AnalysisSummary {
        date,
        today_stats: stats,
        top_items,
        trend,
        prediction,
    })
}

/// Scores a past prediction against the items actually collected on
/// `actual_date` and records the outcome.
///
/// # Errors
///
/// Returns [`PipelineError::Db`] if reading the stats or inserting the
/// validation row fails.
pub async fn validate_prediction(
    pool: &PgPool,
    scorer: &dyn AccuracyScorer,
    prediction_date: NaiveDate,
    actual_date: NaiveDate,
) -> Result<ValidationOutcome, PipelineError> {
    let stats = trendscope_db::daily_stats(pool, actual_date).await?;
    let actual_count = usize::try_from(stats.total).unwrap_or(0);

    let outcome = scorer.score(prediction_date, actual_count);
    trendscope_db::insert_prediction_validation(
        pool,
        prediction_date,
        actual_date,
        outcome.accuracy_score,
        &outcome.notes,
    )
    .await?;

    tracing::info!(
        %prediction_date,
        %actual_date,
        accuracy = outcome.accuracy_score,
        "prediction validated"
    );
    Ok(outcome)
}

async fn abort_run(pool: &PgPool, run_id: i64, err: &DbError) {
    tracing::error!(run_id, error = %err, "pipeline run failed");
    trendscope_db::log(pool, "ERROR", "pipeline", &format!("run {run_id} failed: {err}")).await;
    if let Err(e) = trendscope_db::fail_run(pool, run_id, &err.to_string()).await {
        tracing::warn!(run_id, error = %e, "could not mark run as failed");
    }
}

fn categorized_from_tops(tops: &[(ContentType, Vec<TopItem>)]) -> Vec<CategorizedItem> {
    tops.iter()
        .flat_map(|(ct, items)| {
            items.iter().map(|item| CategorizedItem {
                content_type: *ct,
                category: item.category.clone(),
            })
        })
        .collect()
}

fn clamp_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top(category: &str) -> TopItem {
        TopItem {
            title: "t".to_string(),
            category: category.to_string(),
            popularity_score: 90.0,
            url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn categorized_items_carry_their_vertical() {
        let tops = vec![
            (ContentType::Novel, vec![top("玄幻小说"), top("言情小说")]),
            (ContentType::Comic, vec![top("爆料")]),
        ];

        let items = categorized_from_tops(&tops);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].content_type, ContentType::Novel);
        assert_eq!(items[2].content_type, ContentType::Comic);
        assert_eq!(items[2].category, "爆料");
    }

    #[test]
    fn run_in_progress_is_surfaced_as_its_own_variant() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
        let err: PipelineError = DbError::RunInProgress { date }.into();
        assert!(matches!(err, PipelineError::RunInProgress { .. }));
    }

    #[test]
    fn other_db_errors_stay_db_errors() {
        let err: PipelineError = DbError::NotFound.into();
        assert!(matches!(err, PipelineError::Db(DbError::NotFound)));
    }
}
