use std::time::Duration;

use crate::api::ApiSettings;
use crate::stream::StreamSettings;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a whole number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} is not a valid url: {value:?}")]
    InvalidUrl { key: &'static str, value: String },
}

/// Client settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub demo_video_url: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_reconnects: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            demo_video_url: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_reconnects: 3,
        }
    }
}

impl ClientConfig {
    /// Loads `.env` if present, then reads the `SEO_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = match read("SEO_API_URL") {
            Some(value) => normalize_base_url("SEO_API_URL", &value)?,
            None => defaults.api_base_url,
        };
        let connect_timeout = read_secs(&read, "SEO_CONNECT_TIMEOUT_SECS")?
            .unwrap_or(defaults.connect_timeout);
        let request_timeout = read_secs(&read, "SEO_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(defaults.request_timeout);
        let max_reconnects = match read("SEO_MAX_RECONNECTS") {
            Some(value) => parse_u32("SEO_MAX_RECONNECTS", &value)?,
            None => defaults.max_reconnects,
        };

        Ok(Self {
            api_base_url,
            demo_video_url: read("SEO_DEMO_VIDEO_URL"),
            connect_timeout,
            request_timeout,
            max_reconnects,
        })
    }

    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url("--api-url", url)?;
        Ok(self)
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            api_base_url: self.api_base_url.clone(),
            connect_timeout: self.connect_timeout,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            api_base_url: self.api_base_url.clone(),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
        }
    }
}

fn normalize_base_url(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    url::Url::parse(trimmed).map_err(|_| ConfigError::InvalidUrl {
        key,
        value: value.to_string(),
    })?;
    Ok(trimmed.to_string())
}

fn parse_u32(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        key,
        value: value.to_string(),
    })
}

fn read_secs(
    read: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    read(key)
        .map(|value| parse_u32(key, &value).map(|secs| Duration::from_secs(u64::from(secs))))
        .transpose()
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn reads_and_normalizes_values() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SEO_API_URL", "https://api.example.com/ "),
            ("SEO_DEMO_VIDEO_URL", "https://video.example.com/demo"),
            ("SEO_MAX_RECONNECTS", "5"),
            ("SEO_CONNECT_TIMEOUT_SECS", "2"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(
            config.demo_video_url.as_deref(),
            Some("https://video.example.com/demo")
        );
        assert_eq!(config.max_reconnects, 5);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[("SEO_MAX_RECONNECTS", "many")])),
            Err(ConfigError::InvalidNumber {
                key: "SEO_MAX_RECONNECTS",
                value: "many".into()
            })
        );
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("SEO_API_URL", "nope")])),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }
}
