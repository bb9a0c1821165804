//! The collector abstraction and the fan-out that runs every collector.

use async_trait::async_trait;
use chrono::NaiveDate;

use trendscope_core::{ContentType, FeedSpec, NewContentItem};

use crate::error::CollectError;
use crate::fetch::Fetcher;

/// Shared state handed to every collector for one run.
#[derive(Debug, Clone)]
pub struct CollectContext {
    pub fetcher: Fetcher,
    /// RSS feeds for the industry-intel collector.
    pub feeds: Vec<FeedSpec>,
    /// Logical date items are attributed to.
    pub date: NaiveDate,
}

impl CollectContext {
    #[must_use]
    pub fn new(fetcher: Fetcher, feeds: Vec<FeedSpec>, date: NaiveDate) -> Self {
        Self {
            fetcher,
            feeds,
            date,
        }
    }
}

/// One source of content items.
///
/// Implementations fetch, parse and score; failure isolation lives in
/// [`collect_all`], which logs a failed collector and moves on.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// The vertical this collector feeds.
    fn vertical(&self) -> ContentType;

    /// Produces this run's items for the context date.
    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError>;
}

/// Runs every collector concurrently and merges their items.
///
/// A collector that fails is logged with a warning and contributes nothing;
/// the run continues with whatever the rest produced. Returns an empty
/// `Vec` when all collectors fail.
pub async fn collect_all(
    ctx: &CollectContext,
    collectors: &[Box<dyn Collector>],
) -> Vec<NewContentItem> {
    let results = futures::future::join_all(collectors.iter().map(|c| c.collect(ctx))).await;

    let mut items = Vec::new();
    for (collector, result) in collectors.iter().zip(results) {
        match result {
            Ok(batch) => {
                tracing::debug!(
                    source = collector.name(),
                    vertical = collector.vertical().as_str(),
                    count = batch.len(),
                    "collected items"
                );
                items.extend(batch);
            }
            Err(e) => {
                tracing::warn!(
                    source = collector.name(),
                    vertical = collector.vertical().as_str(),
                    error = %e,
                    "collector failed"
                );
            }
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use trendscope_core::ScoreSource;

    struct FixedCollector {
        count: usize,
    }

    #[async_trait]
    impl Collector for FixedCollector {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn vertical(&self) -> ContentType {
            ContentType::News
        }

        async fn collect(
            &self,
            ctx: &CollectContext,
        ) -> Result<Vec<NewContentItem>, CollectError> {
            Ok((0..self.count)
                .map(|i| NewContentItem {
                    content_type: ContentType::News,
                    title: format!("item {i}"),
                    category: "test".to_string(),
                    url: format!("https://example.com/{i}"),
                    popularity_score: 50.0,
                    score_source: ScoreSource::Synthetic,
                    crawl_date: ctx.date,
                    source_site: "test".to_string(),
                    raw_payload: serde_json::json!({}),
                })
                .collect())
        }
    }

    struct BrokenCollector;

    #[async_trait]
    impl Collector for BrokenCollector {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn vertical(&self) -> ContentType {
            ContentType::Drama
        }

        async fn collect(
            &self,
            ctx: &CollectContext,
        ) -> Result<Vec<NewContentItem>, CollectError> {
            let err = ctx
                .fetcher
                .get_text("http://0.0.0.0:1/unreachable")
                .await
                .expect_err("fetch against a dead address must fail");
            Err(err)
        }
    }

    fn test_ctx() -> CollectContext {
        let fetcher = Fetcher::new(1, 1, "trendscope-test", 0).expect("client should build");
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
        CollectContext::new(fetcher, Vec::new(), date)
    }

    #[tokio::test]
    async fn failed_collector_does_not_sink_the_run() {
        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(FixedCollector { count: 3 }),
            Box::new(BrokenCollector),
            Box::new(FixedCollector { count: 2 }),
        ];

        let items = collect_all(&test_ctx(), &collectors).await;
        assert_eq!(items.len(), 5, "healthy collectors still contribute");
    }

    #[tokio::test]
    async fn all_failing_collectors_yield_empty_batch() {
        let collectors: Vec<Box<dyn Collector>> = vec![Box::new(BrokenCollector)];
        let items = collect_all(&test_ctx(), &collectors).await;
        assert!(items.is_empty());
    }
}
