//! Sina News (新浪新闻) hot-headline scraper.

use async_trait::async_trait;
use rand::Rng;

use trendscope_core::{ContentType, NewContentItem, ScoreSource};

use crate::collector::{CollectContext, Collector};
use crate::error::CollectError;
use crate::html::{extract_anchors, title_len};

const SOURCE_SITE: &str = "新浪新闻";
const PER_PAGE_CAP: usize = 20;

/// Scrapes Sina News section fronts for headlines.
///
/// Headlines are classified by keyword into one of five news categories.
/// Scores are uniform 70–95 draws, tagged synthetic.
pub struct SinaCollector {
    pages: Vec<String>,
}

impl Default for SinaCollector {
    fn default() -> Self {
        Self {
            pages: vec![
                "https://news.sina.com.cn/hotnews/".to_string(),
                "https://news.sina.com.cn/china/".to_string(),
                "https://news.sina.com.cn/world/".to_string(),
            ],
        }
    }
}

impl SinaCollector {
    /// Overrides the section page URLs. Used by tests against a mock server.
    #[must_use]
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl Collector for SinaCollector {
    fn name(&self) -> &'static str {
        "sina"
    }

    fn vertical(&self) -> ContentType {
        ContentType::News
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let mut news = Vec::new();

        for page in &self.pages {
            let body = match ctx.fetcher.get_text(page).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %page, error = %e, "sina page fetch failed");
                    continue;
                }
            };

            let section = page
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or("")
                .to_string();

            for anchor in extract_anchors(&body)
                .into_iter()
                .filter(|a| a.href.contains(".shtml") || a.href.contains("news.sina"))
                .take(PER_PAGE_CAP)
            {
                let title = anchor.text.clone();
                let len = title_len(&title);
                if len <= 10 || len >= 80 {
                    continue;
                }

                let url = if anchor.href.starts_with('/') {
                    format!("https://news.sina.com.cn{}", anchor.href)
                } else {
                    anchor.href.clone()
                };

                news.push(NewContentItem {
                    content_type: ContentType::News,
                    title: title.clone(),
                    category: classify_news(&title).to_string(),
                    url,
                    popularity_score: rand::rng().random_range(70.0..95.0),
                    score_source: ScoreSource::Synthetic,
                    crawl_date: ctx.date,
                    source_site: SOURCE_SITE.to_string(),
                    raw_payload: serde_json::json!({
                        "source": "sina",
                        "section": section,
                    }),
                });
            }

            ctx.fetcher.pace().await;
        }

        Ok(news)
    }
}

/// Buckets a headline by keyword. First match wins.
fn classify_news(title: &str) -> &'static str {
    if title.contains("疫情") || title.contains("新冠") {
        "时政新闻"
    } else if title.contains("经济") || title.contains("股市") || title.contains("金融") {
        "财经新闻"
    } else if title.contains("科技") || title.contains("AI") || title.contains("互联网") {
        "科技新闻"
    } else if title.contains("娱乐") || title.contains("明星") {
        "娱乐新闻"
    } else if title.contains("体育") || title.contains("足球") || title.contains("篮球") {
        "体育新闻"
    } else {
        "综合新闻"
    }
}
