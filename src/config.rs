use std::time::Duration;

use serde::Deserialize;

/// Chat relay server configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Completion provider API key
    pub api_key: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Completion provider base URL
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Model used for every relayed prompt
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Upper bound on a single upstream completion call
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,
}

/// Configuration for the browsing side: catalog, trending store and relay address
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Catalog API bearer credential
    pub tmdb_api_key: String,

    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL of the chat relay
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Redis connection URL for the trending store
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Number of entries shown in the trending strip
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5050
}

fn default_provider_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    60
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_relay_url() -> String {
    "http://localhost:5050".to_string()
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_trending_limit() -> usize {
    5
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<RelayConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load relay config: {}", e))
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<ClientConfig>()
            .map_err(|e| anyhow::anyhow!("Failed to load client config: {}", e))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_relay_config_defaults() {
        let config: RelayConfig = envy::from_iter(vars(&[("API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.port, 5050);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_relay_config_requires_api_key() {
        let result: Result<RelayConfig, _> = envy::from_iter(vars(&[("PORT", "8080")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_config_overrides() {
        let config: ClientConfig = envy::from_iter(vars(&[
            ("TMDB_API_KEY", "tmdb"),
            ("SEARCH_DEBOUNCE_MS", "250"),
            ("TRENDING_LIMIT", "10"),
        ]))
        .unwrap();

        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.search_debounce(), Duration::from_millis(250));
        assert_eq!(config.trending_limit, 10);
    }
}
