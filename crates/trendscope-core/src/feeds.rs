//! RSS intelligence feed registry.
//!
//! The comic vertical's industry-intel collector reads its feed list from a
//! YAML file so operators can add or drop feeds without a rebuild. When the
//! file is absent the built-in Google News searches are used.

use std::collections::HashSet;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSpec {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedsFile {
    pub feeds: Vec<FeedSpec>,
}

/// Built-in Google News RSS searches covering the AI-manga industry beat.
#[must_use]
pub fn default_feeds() -> Vec<FeedSpec> {
    let searches = [
        ("GoogleNews-漫剧行业", "漫剧 行业"),
        ("GoogleNews-AI漫画", "AI 漫画 AIGC"),
        ("GoogleNews-动漫融资", "动漫 融资 产业"),
        ("GoogleNews-漫剧爆料", "漫剧 爆料 传闻"),
    ];

    searches
        .iter()
        .map(|(name, query)| {
            let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
            FeedSpec {
                name: (*name).to_string(),
                url: format!(
                    "https://news.google.com/rss/search?q={encoded}&hl=zh-CN&gl=CN&ceid=CN:zh-Hans"
                ),
            }
        })
        .collect()
}

/// Load the feed registry from a YAML file, falling back to the defaults
/// when the file does not exist.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_feeds(path: &Path) -> Result<Vec<FeedSpec>, ConfigError> {
    if !path.exists() {
        return Ok(default_feeds());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FeedsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let feeds_file: FeedsFile = serde_yaml::from_str(&content)?;
    validate_feeds(&feeds_file)?;

    Ok(feeds_file.feeds)
}

fn validate_feeds(feeds_file: &FeedsFile) -> Result<(), ConfigError> {
    if feeds_file.feeds.is_empty() {
        return Err(ConfigError::Validation(
            "feeds file must list at least one feed".to_string(),
        ));
    }

    let mut seen_urls = HashSet::new();
    for feed in &feeds_file.feeds {
        if feed.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "feed name must be non-empty".to_string(),
            ));
        }
        if !feed.url.starts_with("http://") && !feed.url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "feed {} has a non-HTTP url: {}",
                feed.name, feed.url
            )));
        }
        if !seen_urls.insert(feed.url.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate feed url: {}",
                feed.url
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_feeds_are_valid_google_news_urls() {
        let feeds = default_feeds();
        assert_eq!(feeds.len(), 4);
        for feed in &feeds {
            assert!(feed.url.starts_with("https://news.google.com/rss/search?q="));
            assert!(feed.url.contains("ceid=CN%3Azh-Hans") || feed.url.contains("ceid=CN:zh-Hans"));
        }
    }

    #[test]
    fn query_encoding_escapes_spaces_and_cjk() {
        let encoded = utf8_percent_encode("漫剧 行业", NON_ALPHANUMERIC).to_string();
        assert!(!encoded.contains(' '));
        assert!(encoded.contains("%20"));
        // First byte of UTF-8 for 漫 (E6 BC AB).
        assert!(encoded.starts_with("%E6%BC%AB"));
    }

    #[test]
    fn empty_feed_list_is_rejected() {
        let file = FeedsFile { feeds: vec![] };
        assert!(validate_feeds(&file).is_err());
    }

    #[test]
    fn duplicate_urls_are_rejected() {
        let file = FeedsFile {
            feeds: vec![
                FeedSpec {
                    name: "a".to_string(),
                    url: "https://example.com/rss".to_string(),
                },
                FeedSpec {
                    name: "b".to_string(),
                    url: "https://example.com/rss".to_string(),
                },
            ],
        };
        assert!(validate_feeds(&file).is_err());
    }
}
