use crate::app_config::{AiProvider, AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// The core parsing/validation logic, decoupled from the actual environment so
/// it can be tested with a pure `HashMap` lookup.
pub(crate) fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("TRENDSCOPE_ENV", "development"));
    let bind_addr = parse_addr("TRENDSCOPE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("TRENDSCOPE_LOG_LEVEL", "info");
    let feeds_path = PathBuf::from(or_default("TRENDSCOPE_FEEDS_PATH", "./config/feeds.yaml"));
    // Daily at 02:00 UTC.
    let pipeline_cron = or_default("TRENDSCOPE_PIPELINE_CRON", "0 0 2 * * *");

    let db_max_connections = parse_u32("TRENDSCOPE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("TRENDSCOPE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("TRENDSCOPE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let fetch_timeout_secs = parse_u64("TRENDSCOPE_FETCH_TIMEOUT_SECS", "10")?;
    let fetch_max_retries = parse_u32("TRENDSCOPE_FETCH_MAX_RETRIES", "3")?;
    let fetch_user_agent = or_default(
        "TRENDSCOPE_FETCH_USER_AGENT",
        "trendscope/0.1 (content-trend-pipeline)",
    );
    let fetch_request_delay_ms = parse_u64("TRENDSCOPE_FETCH_REQUEST_DELAY_MS", "1000")?;

    let ai_provider = parse_ai_provider(&or_default("AI_PROVIDER", "ollama"), "AI_PROVIDER")?;
    let ollama_host = or_default("OLLAMA_HOST", "http://localhost:11434");
    let openai_api_base = or_default("OPENAI_API_BASE", "https://api.openai.com");
    let openai_api_key = lookup("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
    let openai_model = or_default("OPENAI_MODEL", "gpt-3.5-turbo");
    let ai_timeout_secs = parse_u64("OPENAI_TIMEOUT", "30")?;

    if ai_provider == AiProvider::OpenAiCompatible && openai_api_key.is_none() {
        return Err(ConfigError::Validation(
            "AI_PROVIDER=openai requires OPENAI_API_KEY to be set".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        feeds_path,
        pipeline_cron,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        fetch_timeout_secs,
        fetch_max_retries,
        fetch_user_agent,
        fetch_request_delay_ms,
        ai_provider,
        ollama_host,
        openai_api_base,
        openai_api_key,
        openai_model,
        ai_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_ai_provider(s: &str, var: &str) -> Result<AiProvider, ConfigError> {
    match s {
        "ollama" => Ok(AiProvider::Ollama),
        "openai" => Ok(AiProvider::OpenAiCompatible),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected \"ollama\" or \"openai\", got \"{other}\""),
        }),
    }
}
