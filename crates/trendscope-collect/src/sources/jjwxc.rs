//! Jinjiang Literature City (晋江文学城) ranking scraper.

use async_trait::async_trait;
use rand::Rng;

use trendscope_core::{ContentType, NewContentItem, ScoreSource};

use crate::collector::{CollectContext, Collector};
use crate::error::CollectError;
use crate::html::{extract_anchors, title_len};

const SOURCE_SITE: &str = "晋江文学城";
const PER_PAGE_CAP: usize = 12;

/// Scrapes the Jinjiang overall, monthly and weekly ranking pages.
///
/// The site is romance-dominated, so every item lands in the 言情小说
/// category. Scores are uniform 75–92 draws, tagged synthetic.
pub struct JjwxcCollector {
    pages: Vec<String>,
}

impl Default for JjwxcCollector {
    fn default() -> Self {
        Self {
            pages: vec![
                "https://www.jjwxc.net/toptoplist.php?orderstr=1".to_string(),
                "https://www.jjwxc.net/toptoplist.php?orderstr=2".to_string(),
                "https://www.jjwxc.net/toptoplist.php?orderstr=3".to_string(),
            ],
        }
    }
}

impl JjwxcCollector {
    /// Overrides the ranking page URLs. Used by tests against a mock server.
    #[must_use]
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl Collector for JjwxcCollector {
    fn name(&self) -> &'static str {
        "jjwxc"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Novel
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let mut novels = Vec::new();

        for page in &self.pages {
            let body = match ctx.fetcher.get_text(page).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %page, error = %e, "jjwxc page fetch failed");
                    continue;
                }
            };

            for anchor in extract_anchors(&body)
                .into_iter()
                .filter(|a| a.href.contains("onebook"))
                .take(PER_PAGE_CAP)
            {
                let title = anchor.text.clone();
                let len = title_len(&title);
                if len <= 3 || len >= 40 {
                    continue;
                }

                novels.push(NewContentItem {
                    content_type: ContentType::Novel,
                    title,
                    category: "言情小说".to_string(),
                    url: format!("https://www.jjwxc.net/{}", anchor.href),
                    popularity_score: rand::rng().random_range(75.0..92.0),
                    score_source: ScoreSource::Synthetic,
                    crawl_date: ctx.date,
                    source_site: SOURCE_SITE.to_string(),
                    raw_payload: serde_json::json!({
                        "source": "jjwxc",
                        "rank_type": "popular",
                    }),
                });
            }

            ctx.fetcher.pace().await;
        }

        Ok(novels)
    }
}
