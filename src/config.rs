use std::env;
use std::time::Duration;

use crate::services::openai_service::{DEFAULT_MODEL, DEFAULT_OPENAI_BASE};

/// Selects the in-memory store instead of MongoDB.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub generation_timeout: Duration,
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    pub base_url: String,
    pub pdf_renderer_url: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Reads the process environment (call `dotenv().ok()` first).
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let var = |key: &str, default: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let required = |key: &str| {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| format!("{} must be set", key))
        };

        let port = var("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| format!("PORT: invalid value ({})", e))?;
        let timeout_secs = var("GENERATION_TIMEOUT_SECS", "60")
            .parse::<u64>()
            .map_err(|e| format!("GENERATION_TIMEOUT_SECS: invalid value ({})", e))?;
        if timeout_secs == 0 {
            return Err("GENERATION_TIMEOUT_SECS: must be greater than zero".to_string());
        }

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            database_url: required("DATABASE_URL")?,
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_base_url: var("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE),
            openai_model: var("OPENAI_MODEL", DEFAULT_MODEL),
            generation_timeout: Duration::from_secs(timeout_secs),
            sendgrid_api_key: get("SENDGRID_API_KEY").filter(|v| !v.trim().is_empty()),
            from_email: var("FROM_EMAIL", "noreply@insightengine.com"),
            base_url: var("BASE_URL", "http://localhost:5000"),
            pdf_renderer_url: var("PDF_RENDERER_URL", "http://localhost:3000"),
            cors_origins: var("CORS_ORIGINS", "http://localhost:5000")
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}
