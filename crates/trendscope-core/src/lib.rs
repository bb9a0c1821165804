//! Shared domain types and configuration for Trendscope.
//!
//! Defines the content-item shape produced by collectors, the daily stats
//! rollup consumed by the analyzer and delivery layer, and the env-driven
//! application configuration.

mod app_config;
mod config;
pub mod feeds;
mod types;

#[cfg(test)]
mod config_test;

pub use app_config::{AiProvider, AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use feeds::{load_feeds, FeedSpec, FeedsFile};
pub use types::{ContentType, DailyStats, NewContentItem, ScoreSource, TopItem, CONTENT_TYPES};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read feeds file {path}: {source}")]
    FeedsFileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse feeds file: {0}")]
    FeedsFileParse(#[from] serde_yaml::Error),
    #[error("configuration validation failed: {0}")]
    Validation(String),
}
