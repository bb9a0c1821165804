//! The two analysis operations the pipeline runs each day.

use chrono::NaiveDate;

use trendscope_core::DailyStats;

use crate::client::LlmClient;
use crate::extract::{confidence, extract_insights, extract_predictions, extract_risks};
use crate::prompts::{prediction_prompt, trend_prompt, CategorizedItem};

/// Result of the daily trend analysis.
#[derive(Debug, Clone)]
pub struct TrendAnalysis {
    pub insights: Vec<String>,
    pub confidence_score: f64,
    pub raw_response: String,
}

/// Result of the next-day prediction.
#[derive(Debug, Clone)]
pub struct TrendPrediction {
    pub predictions: Vec<String>,
    pub risks: Vec<String>,
    pub confidence_score: f64,
    pub raw_response: String,
}

/// Analyzes today's collected distribution.
///
/// Returns `None` when there is nothing to analyze or the model call
/// fails; the pipeline records whatever analyses it does get and moves on,
/// so a down model never blocks collection.
pub async fn analyze_trends(
    client: &LlmClient,
    model: &str,
    items: &[CategorizedItem],
) -> Option<TrendAnalysis> {
    if items.is_empty() {
        return None;
    }

    let prompt = trend_prompt(items);
    match client.chat(model, &prompt).await {
        Ok(text) => Some(TrendAnalysis {
            insights: extract_insights(&text),
            confidence_score: confidence(&text),
            raw_response: text,
        }),
        Err(e) => {
            tracing::error!(error = %e, "trend analysis model call failed");
            None
        }
    }
}

/// Predicts tomorrow from the recent history and today's stats.
///
/// Same failure contract as [`analyze_trends`]: a model failure is logged
/// and yields `None`.
pub async fn predict_tomorrow(
    client: &LlmClient,
    model: &str,
    history: &[(NaiveDate, DailyStats)],
    today: &DailyStats,
) -> Option<TrendPrediction> {
    let prompt = prediction_prompt(history, today);
    match client.chat(model, &prompt).await {
        Ok(text) => Some(TrendPrediction {
            predictions: extract_predictions(&text),
            risks: extract_risks(&text),
            confidence_score: confidence(&text),
            raw_response: text,
        }),
        Err(e) => {
            tracing::error!(error = %e, "prediction model call failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use trendscope_core::ContentType;

    fn items() -> Vec<CategorizedItem> {
        vec![CategorizedItem {
            content_type: ContentType::Novel,
            category: "玄幻小说".to_string(),
        }]
    }

    async fn ollama_with_reply(reply: &str) -> (MockServer, LlmClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": reply},
            })))
            .mount(&server)
            .await;
        let client = LlmClient::ollama(&server.uri(), 5).expect("client should build");
        (server, client)
    }

    #[tokio::test]
    async fn empty_items_short_circuit_to_none() {
        // No server involved: the call must not even be attempted.
        let client = LlmClient::ollama("http://0.0.0.0:1", 1).expect("client should build");
        assert!(analyze_trends(&client, "llama2", &[]).await.is_none());
    }

    #[tokio::test]
    async fn analysis_mines_insights_and_confidence() {
        let reply = "小说类内容显著增长\n市场趋势明确向好";
        let (_server, client) = ollama_with_reply(reply).await;

        let analysis = analyze_trends(&client, "llama2", &items())
            .await
            .expect("model reply present");
        assert_eq!(analysis.insights.len(), 2);
        assert!((analysis.confidence_score - 1.0).abs() < f64::EPSILON);
        assert_eq!(analysis.raw_response, reply);
    }

    #[tokio::test]
    async fn model_failure_yields_none() {
        let client = LlmClient::ollama("http://0.0.0.0:1", 1).expect("client should build");
        let result = analyze_trends(&client, "llama2", &items()).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn prediction_mines_predictions_and_risks() {
        let reply = "预计短剧热度将继续上升\n注意内容同质化的风险";
        let (_server, client) = ollama_with_reply(reply).await;

        let prediction = predict_tomorrow(&client, "llama2", &[], &DailyStats::default())
            .await
            .expect("model reply present");
        assert_eq!(prediction.predictions.len(), 1);
        assert_eq!(prediction.risks.len(), 1);
    }
}
