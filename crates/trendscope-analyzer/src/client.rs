//! Chat client for the two supported model backends.
//!
//! Ollama speaks its native `/api/chat` protocol; everything else goes
//! through the OpenAI-compatible `/v1/chat/completions` surface (DeepSeek
//! and similar gateways included). Both are hidden behind one [`LlmClient`]
//! so the analyzer never branches on the provider.

use std::time::Duration;

use serde::Deserialize;

use trendscope_core::{AiProvider, AppConfig};

use crate::error::AnalyzerError;

const DEFAULT_OLLAMA_MODEL: &str = "llama2";

#[derive(Debug, Clone)]
pub struct LlmClient {
    provider: AiProvider,
    base_url: String,
    api_key: Option<String>,
    default_model: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}

#[derive(Deserialize)]
struct OllamaTagsResponse {
    models: Vec<OllamaModelEntry>,
}

#[derive(Deserialize)]
struct OllamaModelEntry {
    name: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ModelListResponse {
    data: Vec<ModelListEntry>,
}

#[derive(Deserialize)]
struct ModelListEntry {
    id: String,
}

impl LlmClient {
    /// Builds a client for the provider named in the application config.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, AnalyzerError> {
        match config.ai_provider {
            AiProvider::Ollama => {
                Self::ollama(&config.ollama_host, config.ai_timeout_secs)
            }
            AiProvider::OpenAiCompatible => Self::openai_compatible(
                &config.openai_api_base,
                config.openai_api_key.clone(),
                &config.openai_model,
                config.ai_timeout_secs,
            ),
        }
    }

    /// Client against an Ollama host.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn ollama(host: &str, timeout_secs: u64) -> Result<Self, AnalyzerError> {
        Ok(Self {
            provider: AiProvider::Ollama,
            base_url: host.trim_end_matches('/').to_string(),
            api_key: None,
            default_model: DEFAULT_OLLAMA_MODEL.to_string(),
            client: build_http_client(timeout_secs)?,
        })
    }

    /// Client against an OpenAI-compatible gateway.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] if the underlying client cannot be
    /// constructed.
    pub fn openai_compatible(
        api_base: &str,
        api_key: Option<String>,
        default_model: &str,
        timeout_secs: u64,
    ) -> Result<Self, AnalyzerError> {
        Ok(Self {
            provider: AiProvider::OpenAiCompatible,
            base_url: api_base.trim_end_matches('/').to_string(),
            api_key,
            default_model: default_model.to_string(),
            client: build_http_client(timeout_secs)?,
        })
    }

    #[must_use]
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Sends one user prompt and returns the assistant text.
    ///
    /// An empty `model` falls back to the provider's default model.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] on transport or non-2xx failures and
    /// [`AnalyzerError::MalformedResponse`] when the reply carries no
    /// message.
    pub async fn chat(&self, model: &str, prompt: &str) -> Result<String, AnalyzerError> {
        let model = if model.is_empty() {
            &self.default_model
        } else {
            model
        };

        match self.provider {
            AiProvider::Ollama => self.chat_ollama(model, prompt).await,
            AiProvider::OpenAiCompatible => self.chat_openai(model, prompt).await,
        }
    }

    /// Lists the models the backend offers.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::Http`] on transport or non-2xx failures.
    pub async fn list_models(&self) -> Result<Vec<String>, AnalyzerError> {
        match self.provider {
            AiProvider::Ollama => {
                let url = format!("{}/api/tags", self.base_url);
                let response: OllamaTagsResponse = self
                    .client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok(response.models.into_iter().map(|m| m.name).collect())
            }
            AiProvider::OpenAiCompatible => {
                let url = format!("{}/v1/models", self.base_url);
                let response: ModelListResponse = self
                    .authorized(self.client.get(&url))
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok(response.data.into_iter().map(|m| m.id).collect())
            }
        }
    }

    /// Like [`list_models`](Self::list_models), but a backend failure is
    /// logged and degrades to just the default model, so callers always get
    /// something to offer.
    pub async fn available_models(&self) -> Vec<String> {
        match self.list_models().await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => vec![self.default_model.clone()],
            Err(e) => {
                tracing::warn!(error = %e, "model listing failed, falling back to default");
                vec![self.default_model.clone()]
            }
        }
    }

    async fn chat_ollama(&self, model: &str, prompt: &str) -> Result<String, AnalyzerError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
        });

        let response: OllamaChatResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.message.content)
    }

    async fn chat_openai(&self, model: &str, prompt: &str) -> Result<String, AnalyzerError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.7,
        });

        let response: ChatCompletionResponse = self
            .authorized(self.client.post(&url))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AnalyzerError::MalformedResponse("empty choices array".to_string()))
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, AnalyzerError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn ollama_chat_extracts_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "qwen2",
                "stream": false,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": {"role": "assistant", "content": "分析结果"},
            })))
            .mount(&server)
            .await;

        let client = LlmClient::ollama(&server.uri(), 5).expect("client should build");
        let reply = client.chat("qwen2", "prompt").await.expect("chat succeeds");
        assert_eq!(reply, "分析结果");
    }

    #[tokio::test]
    async fn ollama_lists_models_from_tags() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "llama2"}, {"name": "qwen2"}],
            })))
            .mount(&server)
            .await;

        let client = LlmClient::ollama(&server.uri(), 5).expect("client should build");
        let models = client.list_models().await.expect("listing succeeds");
        assert_eq!(models, vec!["llama2", "qwen2"]);
    }

    #[tokio::test]
    async fn openai_chat_sends_bearer_and_reads_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "first"}},
                    {"message": {"role": "assistant", "content": "second"}},
                ],
            })))
            .mount(&server)
            .await;

        let client = LlmClient::openai_compatible(
            &server.uri(),
            Some("sk-test".to_string()),
            "deepseek-chat",
            5,
        )
        .expect("client should build");
        let reply = client.chat("", "prompt").await.expect("chat succeeds");
        assert_eq!(reply, "first");
    }

    #[tokio::test]
    async fn openai_empty_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let client =
            LlmClient::openai_compatible(&server.uri(), None, "deepseek-chat", 5)
                .expect("client should build");
        let result = client.chat("m", "prompt").await;
        assert!(matches!(result, Err(AnalyzerError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn available_models_degrades_to_default_on_failure() {
        let client = LlmClient::openai_compatible(
            "http://0.0.0.0:1",
            None,
            "deepseek-chat",
            1,
        )
        .expect("client should build");
        let models = client.available_models().await;
        assert_eq!(models, vec!["deepseek-chat"]);
    }
}
