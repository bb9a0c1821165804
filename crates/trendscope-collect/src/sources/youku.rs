//! Youku (优酷) hot short-drama scraper.

use async_trait::async_trait;
use rand::Rng;

use trendscope_core::{ContentType, NewContentItem, ScoreSource};

use crate::collector::{CollectContext, Collector};
use crate::error::CollectError;
use crate::html::{extract_anchors, title_len};

const SOURCE_SITE: &str = "优酷";
const PER_PAGE_CAP: usize = 15;

/// Scrapes the Youku category listing pages for hot titles.
///
/// Anchors carry the display title in their `title` attribute; the inner
/// text (usually a thumbnail) is the fallback. Scores are uniform 65–88
/// draws, tagged synthetic.
pub struct YoukuCollector {
    pages: Vec<String>,
}

impl Default for YoukuCollector {
    fn default() -> Self {
        Self {
            pages: vec![
                "https://list.youku.com/category/show/c_97_s_1_d_1.html".to_string(),
                "https://list.youku.com/category/show/c_96_s_1_d_1.html".to_string(),
                "https://list.youku.com/category/show/c_95_s_1_d_1.html".to_string(),
            ],
        }
    }
}

impl YoukuCollector {
    /// Overrides the listing page URLs. Used by tests against a mock server.
    #[must_use]
    pub fn with_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl Collector for YoukuCollector {
    fn name(&self) -> &'static str {
        "youku"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Drama
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let mut dramas = Vec::new();

        for page in &self.pages {
            let body = match ctx.fetcher.get_text(page).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %page, error = %e, "youku page fetch failed");
                    continue;
                }
            };

            let page_category = page.rsplit('/').next().unwrap_or("").to_string();

            for anchor in extract_anchors(&body)
                .into_iter()
                .filter(|a| a.title_attr.is_some())
                .take(PER_PAGE_CAP)
            {
                let title = anchor
                    .title_attr
                    .clone()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| anchor.text.clone());
                let len = title_len(&title);
                if len <= 4 || len >= 50 {
                    continue;
                }

                let url = if anchor.href.starts_with("//") {
                    format!("https:{}", anchor.href)
                } else if anchor.href.starts_with('/') {
                    format!("https://www.youku.com{}", anchor.href)
                } else {
                    anchor.href.clone()
                };

                dramas.push(NewContentItem {
                    content_type: ContentType::Drama,
                    title: title.clone(),
                    category: classify_drama(&title).to_string(),
                    url,
                    popularity_score: rand::rng().random_range(65.0..88.0),
                    score_source: ScoreSource::Synthetic,
                    crawl_date: ctx.date,
                    source_site: SOURCE_SITE.to_string(),
                    raw_payload: serde_json::json!({
                        "source": "youku",
                        "page_category": page_category,
                    }),
                });
            }

            ctx.fetcher.pace().await;
        }

        Ok(dramas)
    }
}

/// Infers a category from the title itself.
fn classify_drama(title: &str) -> &'static str {
    if title.contains("短剧") || title.contains("微剧") {
        "短剧"
    } else if title.contains("电影") {
        "电影"
    } else if title.contains("综艺") {
        "综艺"
    } else {
        "影视娱乐"
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
    fn classify_drama_matches_in_priority_order() {
        assert_eq!(classify_drama("热门短剧合集"), "短剧");
        assert_eq!(classify_drama("某微剧特辑"), "短剧");
        assert_eq!(classify_drama("年度电影盘点"), "电影");
        assert_eq!(classify_drama("爆笑综艺现场"), "综艺");
        assert_eq!(classify_drama("都市情感大戏"), "影视娱乐");
    }

    #[tokio::test]
    async fn prefers_title_attribute_and_fixes_protocol_relative_urls() {
        let server = MockServer::start().await;
        let html = r#"
            <div>
              <a href="//v.youku.com/v_show/id_1.html" title="重生短剧之逆转人生">thumb</a>
              <a href="/v_show/id_2.html" title="四字">thumb</a>
              <a href="/v_show/id_3.html">没有标题属性的链接文本</a>
            </div>
        "#;
        Mock::given(method("GET"))
            .and(path("/c_97_s_1_d_1.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let collector =
            YoukuCollector::with_pages(vec![format!("{}/c_97_s_1_d_1.html", server.uri())]);
        let items = collector.collect(&ctx()).await.expect("collect succeeds");

        assert_eq!(items.len(), 1, "short titles and bare anchors filtered");
        assert_eq!(items[0].title, "重生短剧之逆转人生");
        assert_eq!(items[0].category, "短剧");
        assert_eq!(items[0].url, "https://v.youku.com/v_show/id_1.html");
        assert!(items[0].popularity_score >= 65.0 && items[0].popularity_score < 88.0);
    }
}
