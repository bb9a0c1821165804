//! Trend analysis: model clients, prompt construction, text mining of the
//! replies and prediction-accuracy scoring.

mod analyzer;
mod client;
mod error;
mod extract;
mod prompts;
mod scorer;

pub use analyzer::{analyze_trends, predict_tomorrow, TrendAnalysis, TrendPrediction};
pub use client::LlmClient;
pub use error::AnalyzerError;
pub use extract::{confidence, extract_insights, extract_predictions, extract_risks};
pub use prompts::{prediction_prompt, trend_prompt, CategorizedItem};
pub use scorer::{AccuracyScorer, RandomBaselineScorer, ValidationOutcome};
