//! Qidian (起点中文网) hot-novel ranking scraper.

use async_trait::async_trait;
use rand::Rng;

use trendscope_core::{ContentType, NewContentItem, ScoreSource};

use crate::collector::{CollectContext, Collector};
use crate::error::CollectError;
use crate::html::{extract_anchors, title_len};

const SOURCE_SITE: &str = "起点中文网";
const PER_PAGE_CAP: usize = 10;
const ANCHOR_SCAN_LIMIT: usize = 15;

/// Scrapes the Qidian ranking pages for hot novel titles.
///
/// Titles are real; the popularity score is a uniform draw in 85–98 because
/// the site does not expose a comparable numeric metric, so items are tagged
/// [`ScoreSource::Synthetic`].
pub struct QidianCollector {
    pages: Vec<String>,
}

impl Default for QidianCollector {
    fn default() -> Self {
        Self {
            pages: vec![
                "https://www.qidian.com/rank/hotsales/".to_string(),
                "https://www.qidian.com/rank/finvisit/".to_string(),
                "https://www.qidian.com/rank/newhot/".to_string(),
            ],
        }
    }
}

impl QidianCollector {
    /// Overrides the ranking page URLs. Used by tests against a mock server.
    #[must_use]
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl Collector for QidianCollector {
    fn name(&self) -> &'static str {
        "qidian"
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
                    tracing::warn!(url = %page, error = %e, "qidian page fetch failed");
                    continue;
                }
            };

            let mut found = 0usize;
            for anchor in extract_anchors(&body)
                .into_iter()
                .filter(|a| a.href.contains("/book/"))
                .take(ANCHOR_SCAN_LIMIT)
            {
                if found >= PER_PAGE_CAP {
                    break;
                }

                let title = anchor.text.clone();
                let len = title_len(&title);
                if len <= 5 || len >= 50 {
                    continue;
                }

                let url = if anchor.href.starts_with('/') {
                    format!("https://www.qidian.com{}", anchor.href)
                } else {
                    anchor.href.clone()
                };

                novels.push(NewContentItem {
                    content_type: ContentType::Novel,
                    title,
                    category: classify_novel(&anchor.context).to_string(),
                    url,
                    popularity_score: rand::rng().random_range(85.0..98.0),
                    score_source: ScoreSource::Synthetic,
                    crawl_date: ctx.date,
                    source_site: SOURCE_SITE.to_string(),
                    raw_payload: serde_json::json!({
                        "source": "qidian",
                        "page_url": page,
                    }),
                });
                found += 1;
            }

            ctx.fetcher.pace().await;
        }

        Ok(novels)
    }
}

/// Infers a novel genre from the text surrounding the title link.
fn classify_novel(context: &str) -> &'static str {
    if context.contains("玄幻") {
        "玄幻小说"
    } else if context.contains("都市") {
        "都市小说"
    } else if context.contains("仙侠") {
        "仙侠小说"
    } else if context.contains("游戏") {
        "游戏小说"
    } else {
        "网络小说"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::fetch::Fetcher;

    fn ctx() -> CollectContext {
        let fetcher = Fetcher::new(5, 1, "trendscope-test", 0).expect("client should build");
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
        CollectContext::new(fetcher, Vec::new(), date)
    }

    #[test]
    fn classify_prefers_first_matching_genre() {
        assert_eq!(classify_novel("玄幻 排行"), "玄幻小说");
        assert_eq!(classify_novel("都市情感"), "都市小说");
        assert_eq!(classify_novel("仙侠修真"), "仙侠小说");
        assert_eq!(classify_novel("游戏竞技"), "游戏小说");
        assert_eq!(classify_novel("历史军事"), "网络小说");
    }

    #[tokio::test]
    async fn scrapes_titles_with_length_filter_and_absolutizes_urls() {
        let server = MockServer::start().await;
        let html = r#"
            <ul>
              <li><span>玄幻</span><a href="/book/1010">一念永恒之无上仙尊传</a></li>
              <li><a href="/book/1011">短</a></li>
              <li><a href="/nobook/1">这不是一本书的链接页面</a></li>
              <li><a href="https://www.qidian.com/book/1012">全职高手之荣耀巅峰再临</a></li>
            </ul>
        "#;
        Mock::given(method("GET"))
            .and(path("/rank"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let collector = QidianCollector::with_pages(vec![format!("{}/rank", server.uri())]);
        let items = collector.collect(&ctx()).await.expect("collect succeeds");

        assert_eq!(items.len(), 2, "short titles and non-book links filtered");
        assert_eq!(items[0].url, "https://www.qidian.com/book/1010");
        assert_eq!(items[0].category, "玄幻小说");
        assert_eq!(items[1].url, "https://www.qidian.com/book/1012");
        for item in &items {
            assert_eq!(item.content_type, ContentType::Novel);
            assert_eq!(item.score_source, ScoreSource::Synthetic);
            assert_eq!(item.source_site, "起点中文网");
            assert!(item.popularity_score >= 85.0 && item.popularity_score < 98.0);
        }
    }

    #[tokio::test]
    async fn unreachable_page_yields_empty_batch() {
        let collector =
            QidianCollector::with_pages(vec!["http://0.0.0.0:1/rank".to_string()]);
        let items = collector.collect(&ctx()).await.expect("errors are per-page");
        assert!(items.is_empty());
    }
}
