use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tracked content vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Novel,
    Drama,
    Comic,
    News,
    Entertainment,
}

/// All verticals, in the order the dashboard and summaries present them.
pub const CONTENT_TYPES: [ContentType; 5] = [
    ContentType::Novel,
    ContentType::Drama,
    ContentType::Comic,
    ContentType::News,
    ContentType::Entertainment,
];

impl ContentType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Novel => "novel",
            ContentType::Drama => "drama",
            ContentType::Comic => "comic",
            ContentType::News => "news",
            ContentType::Entertainment => "entertainment",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "novel" => Some(ContentType::Novel),
            "drama" => Some(ContentType::Drama),
            "comic" => Some(ContentType::Comic),
            "news" => Some(ContentType::News),
            "entertainment" => Some(ContentType::Entertainment),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of a popularity score.
///
/// `Observed` comes from a real signal on the page, `Heuristic` is derived
/// from item attributes (keywords, recency), `Synthetic` is a placeholder
/// draw with no upstream signal behind it. Downstream consumers must be able
/// to tell these apart, so the tag travels with every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Observed,
    Heuristic,
    Synthetic,
}

impl ScoreSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScoreSource::Observed => "observed",
            ScoreSource::Heuristic => "heuristic",
            ScoreSource::Synthetic => "synthetic",
        }
    }
}

/// A content item as produced by a collector, before it is assigned an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContentItem {
    pub content_type: ContentType,
    pub title: String,
    pub category: String,
    pub url: String,
    pub popularity_score: f64,
    pub score_source: ScoreSource,
    /// Logical ingestion day, not the insertion timestamp.
    pub crawl_date: NaiveDate,
    pub source_site: String,
    pub raw_payload: Value,
}

/// Per-vertical item counts for one calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub novel: i64,
    pub drama: i64,
    pub comic: i64,
    pub news: i64,
    pub entertainment: i64,
    pub total: i64,
}

impl DailyStats {
    #[must_use]
    pub fn count_for(&self, content_type: ContentType) -> i64 {
        match content_type {
            ContentType::Novel => self.novel,
            ContentType::Drama => self.drama,
            ContentType::Comic => self.comic,
            ContentType::News => self.news,
            ContentType::Entertainment => self.entertainment,
        }
    }

    pub fn set_count(&mut self, content_type: ContentType, count: i64) {
        match content_type {
            ContentType::Novel => self.novel = count,
            ContentType::Drama => self.drama = count,
            ContentType::Comic => self.comic = count,
            ContentType::News => self.news = count,
            ContentType::Entertainment => self.entertainment = count,
        }
        self.total = self.novel + self.drama + self.comic + self.news + self.entertainment;
    }
}

/// Snapshot of one top-ranked item, as serialized into a daily summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopItem {
    pub title: String,
    pub category: String,
    pub popularity_score: f64,
    pub url: String,
}
