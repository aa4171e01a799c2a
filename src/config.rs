use crate::error::{GenerationError, Result};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
const LEGACY_API_KEY_VAR: &str = "API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Reads the process environment. A missing API key is fatal.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_blank = |var: &str| lookup(var).filter(|k| !k.trim().is_empty());
        let api_key = non_blank(API_KEY_VAR)
            .or_else(|| non_blank(LEGACY_API_KEY_VAR))
            .ok_or_else(|| GenerationError::MissingCredential { env_var: API_KEY_VAR.to_string() })?;

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            api_base: lookup("GEMINI_API_BASE")
                .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            port: lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(8080),
            request_timeout_secs: lookup("GEMINI_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(120),
        })
    }
}
