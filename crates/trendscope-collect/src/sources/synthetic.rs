//! Synthetic generators for platforms with no scrapeable public surface.
//!
//! iQIYI, Bilibili, Kuaikan and Weibo gate their ranking data behind apps
//! or signed APIs. These collectors emit plausible placeholder batches so
//! downstream aggregation and analysis always have all five verticals to
//! work with. Everything they produce is tagged [`ScoreSource::Synthetic`];
//! the raw payload carries the fabricated engagement counter so the origin
//! stays auditable.

use async_trait::async_trait;
use rand::Rng;

use trendscope_core::{ContentType, NewContentItem, ScoreSource};

use crate::collector::{CollectContext, Collector};
use crate::error::CollectError;

/// 15 placeholder iQIYI short dramas, scores 65–95.
pub struct IqiyiCollector;

#[async_trait]
impl Collector for IqiyiCollector {
    fn name(&self) -> &'static str {
        "iqiyi"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Drama
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let categories = ["都市", "古装", "悬疑", "爱情", "科幻"];
        let mut rng = rand::rng();

        Ok((0..15)
            .map(|i| NewContentItem {
                content_type: ContentType::Drama,
                title: format!("爆款短剧{}", i + 1),
                category: pick(&mut rng, &categories),
                url: format!("https://www.iqiyi.com/v_{i}.html"),
                popularity_score: rng.random_range(65.0..95.0),
                score_source: ScoreSource::Synthetic,
                crawl_date: ctx.date,
                source_site: "爱奇艺".to_string(),
                raw_payload: serde_json::json!({
                    "source": "iqiyi",
                    "comment_count": rng.random_range(1_000..=50_000),
                }),
            })
            .collect())
    }
}

/// 12 placeholder Bilibili comic dramas, scores 75–95.
pub struct BilibiliCollector;

#[async_trait]
impl Collector for BilibiliCollector {
    fn name(&self) -> &'static str {
        "bilibili"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Comic
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let categories = ["恋爱", "校园", "奇幻", "搞笑", "治愈"];
        let mut rng = rand::rng();

        Ok((0..12)
            .map(|i| NewContentItem {
                content_type: ContentType::Comic,
                title: format!("B站热门漫剧{}", i + 1),
                category: pick(&mut rng, &categories),
                url: format!("https://www.bilibili.com/bangumi/media/md{i}/"),
                popularity_score: rng.random_range(75.0..95.0),
                score_source: ScoreSource::Synthetic,
                crawl_date: ctx.date,
                source_site: "哔哩哔哩".to_string(),
                raw_payload: serde_json::json!({
                    "source": "bilibili",
                    "danmaku_count": rng.random_range(10_000..=200_000),
                }),
            })
            .collect())
    }
}

/// 12 placeholder Kuaikan comics, scores 70–90.
pub struct KuaikanCollector;

#[async_trait]
impl Collector for KuaikanCollector {
    fn name(&self) -> &'static str {
        "kuaikan"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Comic
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let categories = ["恋爱", "校园", "奇幻", "悬疑", "热血"];
        let mut rng = rand::rng();

        Ok((0..12)
            .map(|i| NewContentItem {
                content_type: ContentType::Comic,
                title: format!("快看热门漫画{}", i + 1),
                category: pick(&mut rng, &categories),
                url: format!("https://www.kuaikanmanhua.com/web/topic/{i}/"),
                popularity_score: rng.random_range(70.0..90.0),
                score_source: ScoreSource::Synthetic,
                crawl_date: ctx.date,
                source_site: "快看漫画".to_string(),
                raw_payload: serde_json::json!({
                    "source": "kuaikan",
                    "like_count": rng.random_range(5_000..=100_000),
                }),
            })
            .collect())
    }
}

/// 25 placeholder Weibo hot topics, scores 90–100.
pub struct WeiboCollector;

#[async_trait]
impl Collector for WeiboCollector {
    fn name(&self) -> &'static str {
        "weibo"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Entertainment
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let categories = ["明星", "综艺", "电影", "音乐", "时尚"];
        let mut rng = rand::rng();

        Ok((0..25)
            .map(|i| NewContentItem {
                content_type: ContentType::Entertainment,
                title: format!("微博热搜话题{}", i + 1),
                category: pick(&mut rng, &categories),
                url: format!("https://weibo.com/ttarticle/p/show?id={i}"),
                popularity_score: rng.random_range(90.0..100.0),
                score_source: ScoreSource::Synthetic,
                crawl_date: ctx.date,
                source_site: "微博".to_string(),
                raw_payload: serde_json::json!({
                    "source": "weibo",
                    "hot_score": rng.random_range(1_000_000..=10_000_000),
                }),
            })
            .collect())
    }
}

fn pick<R: Rng>(rng: &mut R, choices: &[&str]) -> String {
    choices[rng.random_range(0..choices.len())].to_string()
}
