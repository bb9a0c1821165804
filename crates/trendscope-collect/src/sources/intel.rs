//! Comic-industry intelligence collector fed by Google News RSS.
//!
//! Unlike the portal scrapers this one produces scored, classified items:
//! each feed entry is filtered for relevance to the AI-comic industry,
//! bucketed into an intel category and given a keyword-and-recency score,
//! so items carry [`ScoreSource::Heuristic`].

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use trendscope_core::{ContentType, NewContentItem, ScoreSource};

use crate::collector::{CollectContext, Collector};
use crate::error::CollectError;

const MANGA_KEYWORDS: &[&str] = &["漫剧", "漫画", "动漫", "二次元", "ACG", "番剧", "动画", "IP"];
const AI_KEYWORDS: &[&str] = &["AI", "AIGC", "人工智能", "生成式", "大模型"];
const INDUSTRY_KEYWORDS: &[&str] = &[
    "行业", "融资", "上市", "报告", "爆料", "传闻", "曝光", "内幕", "合作",
];
const BOOST_KEYWORDS: &[&str] = &["爆料", "独家", "重磅", "首发", "发布", "融资", "合作"];

const BASE_SCORE: f64 = 70.0;
const BOOST_PER_KEYWORD: f64 = 4.0;
const MAX_SCORE: f64 = 100.0;

/// One `<item>` lifted out of a feed.
#[derive(Debug, Clone, Default)]
struct RssItem {
    title: String,
    link: String,
    description: String,
    pub_date: String,
}

/// Collects AI-comic industry intel from the configured RSS feeds.
pub struct MangaIntelCollector;

#[async_trait]
impl Collector for MangaIntelCollector {
    fn name(&self) -> &'static str {
        "manga_intel"
    }

    fn vertical(&self) -> ContentType {
        ContentType::Comic
    }

    async fn collect(&self, ctx: &CollectContext) -> Result<Vec<NewContentItem>, CollectError> {
        let mut items = Vec::new();
        // Dedup across feeds: the same story often surfaces in several
        // keyword searches.
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for feed in &ctx.feeds {
            let body = match ctx.fetcher.get_text(&feed.url).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(feed = %feed.name, error = %e, "intel feed fetch failed");
                    continue;
                }
            };

            let entries = match parse_rss_items(&body) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(feed = %feed.name, error = %e, "intel feed parse failed");
                    continue;
                }
            };

            for entry in entries {
                if entry.title.is_empty() || entry.link.is_empty() {
                    continue;
                }
                if !seen.insert((entry.title.clone(), entry.link.clone())) {
                    continue;
                }
                if !is_relevant(&entry.title, &entry.description) {
                    continue;
                }

                let category = classify_intel(&entry.title, &entry.description);
                let score = score_intel(&entry.title, &entry.pub_date, Utc::now());

                items.push(NewContentItem {
                    content_type: ContentType::Comic,
                    title: entry.title,
                    category: category.to_string(),
                    url: entry.link,
                    popularity_score: score,
                    score_source: ScoreSource::Heuristic,
                    crawl_date: ctx.date,
                    source_site: feed.name.clone(),
                    raw_payload: serde_json::json!({
                        "source": feed.url,
                        "summary": entry.description,
                        "pub_date": entry.pub_date,
                    }),
                });
            }

            ctx.fetcher.pace().await;
        }

        Ok(items)
    }
}

/// Parses the `<item>` entries of an RSS feed body.
fn parse_rss_items(xml: &str) -> Result<Vec<RssItem>, CollectError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current = RssItem::default();
    let mut in_item = false;
    let mut current_tag = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    in_item = true;
                    current = RssItem::default();
                } else {
                    current_tag = name;
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    items.push(std::mem::take(&mut current));
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(&mut current, &current_tag, text);
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(&mut current, &current_tag, text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(CollectError::Xml(e)),
            _ => {}
        }
    }

    Ok(items)
}

fn assign_field(item: &mut RssItem, tag: &str, text: String) {
    match tag {
        "title" => item.title = text,
        "link" => item.link = text,
        "description" => item.description = crate::html::strip_tags(&text),
        "pubDate" => item.pub_date = text,
        _ => {}
    }
}

/// An entry is relevant when it mentions the comic space AND either an AI
/// angle or an industry angle. Comic-only chatter is noise here.
fn is_relevant(title: &str, description: &str) -> bool {
    let text = format!("{title} {description}");
    let has_manga = MANGA_KEYWORDS.iter().any(|k| text.contains(k));
    let has_ai_or_industry = AI_KEYWORDS
        .iter()
        .chain(INDUSTRY_KEYWORDS)
        .any(|k| text.contains(k));
    has_manga && has_ai_or_industry
}

/// Buckets an entry into an intel category. Rumor markers outrank data
/// markers, which outrank finance, which outrank product news.
fn classify_intel(title: &str, description: &str) -> &'static str {
    let text = format!("{title} {description}");

    let rumor = ["爆料", "传闻", "曝光", "内幕", "独家"];
    if rumor.iter().any(|k| text.contains(k)) {
        return "爆料";
    }

    let data = ["报告", "数据", "统计", "调研", "榜单", "趋势"];
    if data.iter().any(|k| text.contains(k)) {
        return "行业数据";
    }

    let finance = ["融资", "投资", "并购", "上市", "估值"];
    if finance.iter().any(|k| text.contains(k)) {
        return "资本动态";
    }

    let product = ["新作", "发布", "上线", "立项", "改编"];
    if product.iter().any(|k| text.contains(k)) {
        return "作品动态";
    }

    "行业资讯"
}

/// Scores an entry: a base of 70, +4 per boost keyword found in the title,
/// plus a freshness bonus of up to 15 that decays 2 points per day since
/// publication. Unparseable publication dates forfeit the bonus. Clamped
/// at 100.
fn score_intel(title: &str, pub_date: &str, now: DateTime<Utc>) -> f64 {
    let mut score = BASE_SCORE;

    for keyword in BOOST_KEYWORDS {
        if title.contains(keyword) {
            score += BOOST_PER_KEYWORD;
        }
    }

    if let Ok(published) = DateTime::parse_from_rfc2822(pub_date) {
        let days = (now - published.with_timezone(&Utc)).num_days();
        #[allow(clippy::cast_precision_loss)]
        let bonus = (15 - days * 2).max(0) as f64;
        score += bonus;
    }

    score.min(MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, TimeZone};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::fetch::Fetcher;
    use trendscope_core::FeedSpec;

    #[test]
    fn relevance_requires_manga_plus_ai_or_industry() {
        assert!(is_relevant("AI漫剧制作管线升级", ""));
        assert!(is_relevant("某漫画平台宣布融资", ""));
        assert!(!is_relevant("漫画新番上架清单", ""), "comic-only is noise");
        assert!(!is_relevant("大模型再迎重大更新", ""), "AI-only is noise");
        assert!(is_relevant("新番上架", "这批动画背后是AIGC管线"));
    }

    #[test]
    fn classify_rumor_outranks_finance() {
        // Both 爆料 and 融资 appear; the rumor bucket wins.
        assert_eq!(classify_intel("爆料：某漫画平台即将融资", ""), "爆料");
    }

    #[test]
    fn classify_falls_through_the_buckets() {
        assert_eq!(classify_intel("年度动漫行业报告出炉", ""), "行业数据");
        assert_eq!(classify_intel("二次元赛道并购加速", ""), "资本动态");
        assert_eq!(classify_intel("人气漫画宣布改编动画", ""), "作品动态");
        assert_eq!(classify_intel("漫画行业一周杂谈", ""), "行业资讯");
    }

    #[test]
    fn score_adds_boost_per_title_keyword() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        // No parseable date, no boost keywords.
        assert!((score_intel("普通标题", "", now) - 70.0).abs() < f64::EPSILON);
        // 爆料 + 独家 = +8.
        assert!((score_intel("爆料独家消息", "not a date", now) - 78.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_freshness_bonus_decays_and_expires() {
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 12, 0, 0).unwrap();
        let fresh = (now - Duration::days(0)).to_rfc2822();
        let stale = (now - Duration::days(3)).to_rfc2822();
        let ancient = (now - Duration::days(30)).to_rfc2822();

        assert!((score_intel("t", &fresh, now) - 85.0).abs() < f64::EPSILON);
        assert!((score_intel("t", &stale, now) - 79.0).abs() < f64::EPSILON);
        assert!((score_intel("t", &ancient, now) - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn score_clamps_at_one_hundred() {
        let now = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
        let fresh = now.to_rfc2822();
        let title = "爆料独家重磅首发发布融资合作";
        assert!((score_intel(title, &fresh, now) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_items_with_cdata_titles() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
  <item>
    <title><![CDATA[AI漫剧行业爆料汇总]]></title>
    <link>https://example.com/a</link>
    <description><![CDATA[<b>重磅</b>内容摘要]]></description>
    <pubDate>Fri, 01 Aug 2025 08:00:00 GMT</pubDate>
  </item>
</channel></rss>"#;

        let items = parse_rss_items(xml).expect("valid RSS");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "AI漫剧行业爆料汇总");
        assert_eq!(items[0].description, "重磅内容摘要");
        assert_eq!(items[0].pub_date, "Fri, 01 Aug 2025 08:00:00 GMT");
    }

    #[tokio::test]
    async fn dedups_the_same_story_across_feeds() {
        let server = MockServer::start().await;
        let xml = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <item>
    <title>AI漫画平台获得新一轮融资</title>
    <link>https://example.com/story</link>
    <description>资本持续看好AIGC内容赛道</description>
  </item>
</channel></rss>"#;
        // Same body mounted twice under different paths.
        for p in ["/feed-a", "/feed-b"] {
            Mock::given(method("GET"))
                .and(path(p))
                .respond_with(ResponseTemplate::new(200).set_body_string(xml))
                .mount(&server)
                .await;
        }

        let fetcher = Fetcher::new(5, 1, "trendscope-test", 0).expect("client should build");
        let feeds = vec![
            FeedSpec {
                name: "feed-a".to_string(),
                url: format!("{}/feed-a", server.uri()),
            },
            FeedSpec {
                name: "feed-b".to_string(),
                url: format!("{}/feed-b", server.uri()),
            },
        ];
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
        let ctx = CollectContext::new(fetcher, feeds, date);

        let items = MangaIntelCollector.collect(&ctx).await.expect("collects");
        assert_eq!(items.len(), 1, "duplicate (title, link) dropped");
        assert_eq!(items[0].category, "资本动态");
        assert_eq!(items[0].score_source, ScoreSource::Heuristic);
        assert_eq!(items[0].source_site, "feed-a");
    }
}
