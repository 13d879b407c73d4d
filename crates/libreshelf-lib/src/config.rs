use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://stem-api.anajak-khmer.site";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u32,
    #[serde(default = "default_admin_search_debounce_ms")]
    pub admin_search_debounce_ms: u32,
    #[serde(default = "default_admin_page_size")]
    pub admin_page_size: u32,
    #[serde(default = "default_new_release_limit")]
    pub new_release_limit: u32,
    #[serde(default = "default_popular_limit")]
    pub popular_limit: u32,
    #[serde(default = "default_placeholder_cover")]
    pub placeholder_cover: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    12
}

fn default_search_debounce_ms() -> u32 {
    600
}

fn default_admin_search_debounce_ms() -> u32 {
    500
}

fn default_admin_page_size() -> u32 {
    100
}

fn default_new_release_limit() -> u32 {
    10
}

fn default_popular_limit() -> u32 {
    8
}

fn default_placeholder_cover() -> String {
    "https://placehold.co/300x400/112d4e/FFF?text=No+Cover".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            admin_search_debounce_ms: default_admin_search_debounce_ms(),
            admin_page_size: default_admin_page_size(),
            new_release_limit: default_new_release_limit(),
            popular_limit: default_popular_limit(),
            placeholder_cover: default_placeholder_cover(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let mut config: Config = serde_json::from_str(json)?;
        config.api_base_url = config.api_base_url.trim_end_matches('/').to_string();
        if config.page_size == 0 {
            return Err(Error::validation("page_size must be greater than zero"));
        }
        Ok(config)
    }

    /// Falls back to defaults when the embedded config is missing or broken.
    pub fn load(json: Option<&str>) -> Self {
        match json {
            Some(json) => Self::from_json(json).unwrap_or_else(|e| {
                warn!("invalid config, using defaults: {}", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_json(r#"{"api_base_url": "http://localhost:8000/", "page_size": 24}"#)
            .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.page_size, 24);
        assert_eq!(config.search_debounce_ms, 600);
        assert_eq!(config.admin_page_size, 100);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(Config::from_json(r#"{"page_size": 0}"#).is_err());
        assert_eq!(Config::load(Some(r#"{"page_size": 0}"#)), Config::default());
        assert_eq!(Config::load(Some("not json")), Config::default());
    }
}
