use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which chat backend the analyzer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Ollama,
    OpenAiCompatible,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub feeds_path: PathBuf,
    pub pipeline_cron: String,

    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,

    pub fetch_timeout_secs: u64,
    pub fetch_max_retries: u32,
    pub fetch_user_agent: String,
    /// Politeness delay between pages of one upstream site.
    pub fetch_request_delay_ms: u64,

    pub ai_provider: AiProvider,
    pub ollama_host: String,
    pub openai_api_base: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub ai_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("feeds_path", &self.feeds_path)
            .field("pipeline_cron", &self.pipeline_cron)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("fetch_request_delay_ms", &self.fetch_request_delay_ms)
            .field("ai_provider", &self.ai_provider)
            .field("ollama_host", &self.ollama_host)
            .field("openai_api_base", &self.openai_api_base)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_model", &self.openai_model)
            .field("ai_timeout_secs", &self.ai_timeout_secs)
            .finish()
    }
}
