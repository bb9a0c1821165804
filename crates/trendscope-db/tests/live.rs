//! Live integration tests for trendscope-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/trendscope-db/`), so `"../../migrations"` resolves to the
//! workspace migration directory.

use chrono::NaiveDate;
use trendscope_core::{ContentType, NewContentItem, ScoreSource, TopItem};
use trendscope_db::{
    begin_run, complete_run, daily_stats, fail_run, get_daily_summary, get_run, insert_items,
    top_items_by_type, upsert_daily_summary,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date")
}

fn make_item(content_type: ContentType, title: &str, score: f64, date: NaiveDate) -> NewContentItem {
    NewContentItem {
        content_type,
        title: title.to_string(),
        category: "测试".to_string(),
        url: format!("https://example.com/{title}"),
        popularity_score: score,
        score_source: ScoreSource::Synthetic,
        crawl_date: date,
        source_site: "test".to_string(),
        raw_payload: serde_json::json!({"source": "test"}),
    }
}

fn make_top_item(title: &str, score: f64) -> TopItem {
    TopItem {
        title: title.to_string(),
        category: "测试".to_string(),
        popularity_score: score,
        url: format!("https://example.com/{title}"),
    }
}

// ---------------------------------------------------------------------------
// Section 1: Daily Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn daily_stats_counts_items_per_vertical(pool: sqlx::PgPool) {
    let date = test_date();
    let items = vec![
        make_item(ContentType::Novel, "novel-a", 90.0, date),
        make_item(ContentType::Novel, "novel-b", 85.0, date),
        make_item(ContentType::Novel, "novel-c", 80.0, date),
    ];

    let inserted = insert_items(&pool, &items)
        .await
        .expect("insert_items failed");
    assert_eq!(inserted, 3);

    let stats = daily_stats(&pool, date).await.expect("daily_stats failed");

    assert_eq!(stats.novel, 3);
    assert_eq!(stats.drama, 0);
    assert_eq!(stats.comic, 0);
    assert_eq!(stats.news, 0);
    assert_eq!(stats.entertainment, 0);
    assert_eq!(stats.total, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn daily_stats_ignores_items_from_other_dates(pool: sqlx::PgPool) {
    let date = test_date();
    let other = NaiveDate::from_ymd_opt(2025, 7, 31).expect("valid date");
    let items = vec![
        make_item(ContentType::News, "today", 70.0, date),
        make_item(ContentType::News, "yesterday", 70.0, other),
    ];
    insert_items(&pool, &items).await.expect("insert failed");

    let stats = daily_stats(&pool, date).await.expect("daily_stats failed");
    assert_eq!(stats.news, 1, "only the requested date counts");
    assert_eq!(stats.total, 1);
}

#[sqlx::test(migrations = "../../migrations")]
async fn top_items_order_by_score_then_insertion(pool: sqlx::PgPool) {
    let date = test_date();
    let items = vec![
        make_item(ContentType::Drama, "mid", 80.0, date),
        make_item(ContentType::Drama, "high", 95.0, date),
        make_item(ContentType::Drama, "tied-first", 80.0, date),
    ];
    insert_items(&pool, &items).await.expect("insert failed");

    let top = top_items_by_type(&pool, ContentType::Drama, date, 10)
        .await
        .expect("top_items_by_type failed");

    assert_eq!(top.len(), 3);
    assert_eq!(top[0].title, "high");
    assert_eq!(top[1].title, "mid", "score tie breaks on insertion order");
    assert_eq!(top[2].title, "tied-first");
}

// ---------------------------------------------------------------------------
// Section 2: Daily Summary Upsert
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn summary_upsert_leaves_exactly_one_row_per_date(pool: sqlx::PgPool) {
    let date = test_date();
    let items = vec![
        make_item(ContentType::Novel, "novel-a", 90.0, date),
        make_item(ContentType::Drama, "drama-a", 88.0, date),
    ];
    insert_items(&pool, &items).await.expect("insert failed");

    let stats = daily_stats(&pool, date).await.expect("daily_stats failed");
    let tops = vec![(
        ContentType::Novel,
        vec![make_top_item("novel-a", 90.0)],
    )];

    upsert_daily_summary(&pool, date, stats, &tops)
        .await
        .expect("first upsert failed");
    upsert_daily_summary(&pool, date, stats, &tops)
        .await
        .expect("second upsert failed");

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM daily_summaries WHERE summary_date = $1")
            .bind(date)
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(
        count, 1,
        "re-running aggregation must not leave a duplicate summary row"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn summary_upsert_refreshes_contents_on_rerun(pool: sqlx::PgPool) {
    let date = test_date();
    insert_items(&pool, &[make_item(ContentType::Comic, "comic-a", 75.0, date)])
        .await
        .expect("insert failed");

    let stats = daily_stats(&pool, date).await.expect("daily_stats failed");
    upsert_daily_summary(&pool, date, stats, &[])
        .await
        .expect("first upsert failed");

    // More items land, aggregation re-runs for the same date.
    insert_items(&pool, &[make_item(ContentType::Comic, "comic-b", 82.0, date)])
        .await
        .expect("insert failed");
    let stats = daily_stats(&pool, date).await.expect("daily_stats failed");
    let tops = vec![(
        ContentType::Comic,
        vec![make_top_item("comic-b", 82.0), make_top_item("comic-a", 75.0)],
    )];
    upsert_daily_summary(&pool, date, stats, &tops)
        .await
        .expect("second upsert failed");

    let summary = get_daily_summary(&pool, date)
        .await
        .expect("get_daily_summary failed")
        .expect("summary should exist");

    assert_eq!(summary.comic_count, 2, "counts reflect the re-run");
    assert_eq!(summary.total_count, 2);
    let top_comics = summary.top_comics.as_array().expect("top_comics array");
    assert_eq!(top_comics.len(), 2);
    assert_eq!(top_comics[0]["title"].as_str(), Some("comic-b"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn missing_summary_reads_back_as_none(pool: sqlx::PgPool) {
    let summary = get_daily_summary(&pool, test_date())
        .await
        .expect("get_daily_summary failed");
    assert!(summary.is_none());
}

// ---------------------------------------------------------------------------
// Section 3: Run Lock
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn second_run_for_same_date_is_rejected_while_active(pool: sqlx::PgPool) {
    let date = test_date();
    let run_id = begin_run(&pool, date, "cli").await.expect("begin_run failed");
    let first = get_run(&pool, run_id).await.expect("get_run failed");
    assert_eq!(first.status, "running");
    assert_eq!(first.trigger_source, "cli");

    let err = begin_run(&pool, date, "api")
        .await
        .expect_err("a second active run for the same date must be rejected");
    assert!(matches!(
        err,
        trendscope_db::DbError::RunInProgress { date: d } if d == date
    ));

    complete_run(&pool, run_id, 12).await.expect("complete_run failed");

    // The lock releases once the first run finishes.
    let second_id = begin_run(&pool, date, "api").await.expect("begin after complete");
    fail_run(&pool, second_id, "upstream down")
        .await
        .expect("fail_run failed");

    let fetched = get_run(&pool, second_id).await.expect("get_run failed");
    assert_eq!(fetched.status, "failed");
    assert_eq!(fetched.error_message.as_deref(), Some("upstream down"));
}
