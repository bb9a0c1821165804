//! Cross-platform hot-trend collector over public rankings.
//!
//! Pulls GitHub Trending, the Zhihu hot list, Bilibili's ranking APIs and
//! Douban's popular-movie feed. These are the only sources that expose a
//! real ranking signal, so Zhihu items are scored by rank position and
//! Douban items by their published rating — both tagged
//! [`ScoreSource::Observed`]. GitHub and Bilibili publish no comparable
//! number, so those draws stay [`ScoreSource::Synthetic`]. Everything lands
//! in the entertainment vertical.

use std::sync::OnceLock;

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use serde_json::Value;

use trendscope_core::{ContentType, NewContentItem, ScoreSource};

use crate::collector::{CollectContext, Collector};
use crate::error::CollectError;
use crate::html::extract_anchors;

const GITHUB_PER_PAGE_CAP: usize = 10;
const ZHIHU_CAP: usize = 15;
const BILIBILI_PER_API_CAP: usize = 10;
const DOUBAN_CAP: usize = 12;

pub struct HotTrendsCollector {
    github_base: String,
    zhihu_base: String,
    bilibili_base: String,
    douban_base: String,
}

impl Default for HotTrendsCollector {
    fn default() -> Self {
        Self {
            github_base: "https://github.com".to_string(),
            zhihu_base: "https://www.zhihu.com".to_string(),
            bilibili_base: "https://api.bilibili.com".to_string(),
            douban_base: "https://movie.douban.com".to_string(),
        }
    }
}

impl HotTrendsCollector {
    /// Overrides the platform base URLs. Used by tests against mock servers.
    #[must_use]
    pub fn with_bases(
        github_base: String,
        zhihu_base: String,
        bilibili_base: String,
        douban_base: String,
    ) -> Self {
        Self {
            github_base,
            zhihu_base,
            bilibili_base,
            douban_base,
        }
    }

    async fn collect_github(&self, ctx: &CollectContext, out: &mut Vec<NewContentItem>) {
        let pages = [
            format!("{}/trending", self.github_base),
            format!("{}/trending/developers", self.github_base),
        ];

        for page in &pages {
            let body = match ctx.fetcher.get_text(page).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(url = %page, error = %e, "github trending fetch failed");
                    continue;
                }
            };

            // Rng stays inside this block; it must not live across an await.
            {
                let mut rng = rand::rng();
                for block in heading_re()
                    .captures_iter(&body)
                    .filter_map(|caps| caps.get(1))
                    .take(GITHUB_PER_PAGE_CAP)
                {
                    let Some(anchor) = extract_anchors(block.as_str()).into_iter().next() else {
                        continue;
                    };
                    let title = collapse_whitespace(&anchor.text);
                    if title.is_empty() {
                        continue;
                    }
                    let url = if anchor.href.starts_with('/') {
                        format!("https://github.com{}", anchor.href)
                    } else {
                        anchor.href.clone()
                    };

                    out.push(NewContentItem {
                        content_type: ContentType::Entertainment,
                        title,
                        category: "开源项目".to_string(),
                        url,
                        popularity_score: rng.random_range(90.0..99.0),
                        score_source: ScoreSource::Synthetic,
                        crawl_date: ctx.date,
                        source_site: "GitHub".to_string(),
                        raw_payload: serde_json::json!({
                            "source": "github",
                            "trend_type": "技术爆款",
                            "page_url": page,
                        }),
                    });
                }
            }

            ctx.fetcher.pace().await;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    async fn collect_zhihu(&self, ctx: &CollectContext, out: &mut Vec<NewContentItem>) {
        let url = format!("{}/api/v3/feed/topstory/hot-lists/total", self.zhihu_base);
        let Some(json) = fetch_json(ctx, &url, "zhihu hot list").await else {
            return;
        };

        for (i, item) in json["data"]
            .as_array()
            .into_iter()
            .flatten()
            .take(ZHIHU_CAP)
            .enumerate()
        {
            let target = &item["target"];
            let title = target["title"].as_str().unwrap_or("未知标题").to_string();

            out.push(NewContentItem {
                content_type: ContentType::Entertainment,
                title,
                category: "知识问答".to_string(),
                url: format!("https://www.zhihu.com/question/{}", id_text(&target["id"])),
                // The hot list is already rank-ordered; score by position.
                popularity_score: (100 - i) as f64,
                score_source: ScoreSource::Observed,
                crawl_date: ctx.date,
                source_site: "知乎".to_string(),
                raw_payload: serde_json::json!({
                    "source": "zhihu",
                    "trend_type": "知识爆款",
                    "rank": i + 1,
                }),
            });
        }
    }

    async fn collect_bilibili(&self, ctx: &CollectContext, out: &mut Vec<NewContentItem>) {
        let apis = [
            format!(
                "{}/x/web-interface/ranking/v2?rid=0&type=all",
                self.bilibili_base
            ),
            format!("{}/x/web-interface/popular", self.bilibili_base),
        ];

        for api in &apis {
            let Some(json) = fetch_json(ctx, api, "bilibili ranking").await else {
                continue;
            };

            // The ranking API nests its list under data.list; the popular
            // API has been seen serving a bare data array as well.
            let videos = json["data"]["list"]
                .as_array()
                .or_else(|| json["data"].as_array());

            {
                let mut rng = rand::rng();
                for video in videos.into_iter().flatten().take(BILIBILI_PER_API_CAP) {
                    let title = video["title"]
                        .as_str()
                        .or_else(|| video["name"].as_str())
                        .unwrap_or("未知视频")
                        .to_string();
                    let video_id = match video["bvid"].as_str() {
                        Some(bvid) => bvid.to_string(),
                        None => id_text(&video["aid"]),
                    };

                    out.push(NewContentItem {
                        content_type: ContentType::Entertainment,
                        title,
                        category: video["tname"].as_str().unwrap_or("综合").to_string(),
                        url: format!("https://www.bilibili.com/video/{video_id}"),
                        popularity_score: rng.random_range(85.0..98.0),
                        score_source: ScoreSource::Synthetic,
                        crawl_date: ctx.date,
                        source_site: "哔哩哔哩".to_string(),
                        raw_payload: serde_json::json!({
                            "source": "bilibili",
                            "trend_type": "视频爆款",
                            "api_url": api,
                        }),
                    });
                }
            }

            ctx.fetcher.pace().await;
        }
    }

    async fn collect_douban(&self, ctx: &CollectContext, out: &mut Vec<NewContentItem>) {
        let url = format!(
            "{}/j/search_subjects?type=movie&tag=%E7%83%AD%E9%97%A8&page_limit=20&page_start=0",
            self.douban_base
        );
        let Some(json) = fetch_json(ctx, &url, "douban popular movies").await else {
            return;
        };

        for movie in json["subjects"]
            .as_array()
            .into_iter()
            .flatten()
            .take(DOUBAN_CAP)
        {
            let title = movie["title"].as_str().unwrap_or("未知电影");
            let rate = movie["rate"].as_str().unwrap_or("0");

            out.push(NewContentItem {
                content_type: ContentType::Entertainment,
                title: format!("{title} ({rate}分)"),
                category: "影视".to_string(),
                url: movie["url"].as_str().unwrap_or("").to_string(),
                // A published 0-10 rating, rescaled to the 0-100 range.
                popularity_score: rate.parse::<f64>().unwrap_or(0.0) * 10.0,
                score_source: ScoreSource::Observed,
                crawl_date: ctx.date,
                source_site: "豆瓣".to_string(),
                raw_payload: serde_json::json!({
                    "source": "douban",
                    "trend_type": "影视爆款",
                    "rate": rate,
                }),
            });
        }
    }
}

#[async_trait]
impl Collector for HotTrendsCollector {
    fn name(&self) -> &'static str {
        "hot_trends"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Entertainment
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let mut trends = Vec::new();

        self.collect_github(ctx, &mut trends).await;
        self.collect_zhihu(ctx, &mut trends).await;
        ctx.fetcher.pace().await;
        self.collect_bilibili(ctx, &mut trends).await;
        self.collect_douban(ctx, &mut trends).await;

        Ok(trends)
    }
}

/// GitHub trending wraps each repo/developer link in an `<h2 class="h3 ...">`.
fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<h2[^>]*class="[^"]*\bh3\b[^"]*"[^>]*>(.*?)</h2>"#)
            .unwrap_or_else(|_| unreachable!())
    })
}

async fn fetch_json(ctx: &CollectContext, url: &str, what: &str) -> Option<Value> {
    let body = match ctx.fetcher.get_text(url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(url, error = %e, "{what} fetch failed");
            return None;
        }
    };
    match serde_json::from_str(&body) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!(url, error = %e, "{what} returned unparseable JSON");
            None
        }
    }
}

/// Ids arrive as numbers on some endpoints and strings on others.
fn id_text(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
