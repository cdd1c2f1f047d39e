use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_INSIGHT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_INSIGHT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
    pub insight: InsightConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = non_empty("PORT")
            .and_then(|value| value.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let data_dir = non_empty("APP_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let defaults = InsightConfig::default();
        let insight = InsightConfig {
            api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            model: non_empty("GEMINI_MODEL").unwrap_or(defaults.model),
            base_url: non_empty("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            timeout: non_empty("INSIGHT_TIMEOUT_SECS")
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Self {
            port,
            data_dir,
            insight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert!(config.insight.api_key.is_none());
        assert_eq!(config.insight.model, DEFAULT_MODEL);
        assert_eq!(config.insight.timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("PORT", "9001"),
            ("APP_DATA_DIR", "/tmp/pulse"),
            ("API_KEY", "legacy"),
            ("INSIGHT_TIMEOUT_SECS", "5"),
        ]);
        assert_eq!(config.port, 9001);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/pulse"));
        assert_eq!(config.insight.api_key.as_deref(), Some("legacy"));
        assert_eq!(config.insight.timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[("PORT", "http"), ("INSIGHT_TIMEOUT_SECS", "0"), ("GEMINI_API_KEY", " ")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.insight.timeout, Duration::from_secs(30));
        assert!(config.insight.api_key.is_none());
    }
}
