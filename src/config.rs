use std::env;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_LANGUAGE: &str = "English";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub response_language: String,
    pub timeout: Duration,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl PredictConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));
        let model = non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = non_empty("GEMINI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let response_language =
            non_empty("PREDICT_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let timeout_secs = non_empty("PREDICT_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(5, 300);

        Self {
            api_key,
            model,
            base_url,
            response_language,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = PredictConfig::default();
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.response_language, "English");
        assert_eq!(cfg.timeout, Duration::from_secs(60));
    }

    #[test]
    fn api_key_falls_back_and_ignores_blank() {
        let cfg = PredictConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  "), ("API_KEY", "k2")]));
        assert_eq!(cfg.api_key.as_deref(), Some("k2"));
    }

    #[test]
    fn timeout_is_clamped_and_base_url_trimmed() {
        let cfg = PredictConfig::from_lookup(lookup(&[
            ("PREDICT_TIMEOUT_SECS", "1"),
            ("GEMINI_BASE_URL", "http://127.0.0.1:9999/"),
        ]));
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.base_url, "http://127.0.0.1:9999");
    }
}
