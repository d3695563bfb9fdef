use axum::http::HeaderValue;
use std::path::PathBuf;
use std::time::Duration;

use crate::tts::google::DEFAULT_BASE_URL;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read credentials from {path}: {source}")]
    Credentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `None` allows any origin.
    pub cors_origin: Option<HeaderValue>,
    pub voice_cache_ttl: Duration,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origin: None,
            voice_cache_ttl: Duration::from_secs(3600),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            config.host = host;
        }

        if let Some(port) = get("PORT") {
            config.port = port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    name: "PORT",
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(origin) = get("CORS_ORIGIN").filter(|o| o != "*") {
            config.cors_origin = Some(HeaderValue::from_str(&origin).map_err(|e| {
                ConfigError::InvalidValue {
                    name: "CORS_ORIGIN",
                    value: origin.clone(),
                    reason: e.to_string(),
                }
            })?);
        }

        if let Some(ttl) = get("VOICE_CACHE_TTL_SECONDS") {
            let secs: u64 = ttl.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    name: "VOICE_CACHE_TTL_SECONDS",
                    value: ttl.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.voice_cache_ttl = Duration::from_secs(secs);
        }

        if let Some(url) = get("TTS_API_BASE_URL") {
            config.api_base_url = url;
        }

        // Inline key wins over the key file
        config.api_key = match (get("GOOGLE_API_KEY"), get("GOOGLE_API_KEY_FILE")) {
            (Some(key), _) => Some(key.trim().to_string()),
            (None, Some(path)) => {
                let path = PathBuf::from(path);
                let key = std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Credentials { path, source })?;
                Some(key.trim().to_string()).filter(|k| !k.is_empty())
            }
            (None, None) => None,
        };

        if let Some(dir) = get("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.voice_cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert!(config.cors_origin.is_none());
        assert!(config.api_key.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("CORS_ORIGIN", "http://localhost:5173"),
            ("VOICE_CACHE_TTL_SECONDS", "60"),
            ("GOOGLE_API_KEY", " abc123 "),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.cors_origin,
            Some(HeaderValue::from_static("http://localhost:5173"))
        );
        assert_eq!(config.voice_cache_ttl, Duration::from_secs(60));
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
    }

    #[test]
    fn wildcard_origin_means_any() {
        let config = config_from(&[("CORS_ORIGIN", "*")]).unwrap();
        assert!(config.cors_origin.is_none());
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

        let err = config_from(&[("VOICE_CACHE_TTL_SECONDS", "-5")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                name: "VOICE_CACHE_TTL_SECONDS",
                ..
            }
        ));
    }

    #[test]
    fn reads_key_file() {
        let path = std::env::temp_dir().join(format!("voice-compare-key-{}", std::process::id()));
        std::fs::write(&path, "file-key\n").unwrap();

        let config = config_from(&[("GOOGLE_API_KEY_FILE", path.to_str().unwrap())]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("file-key"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_key_file_is_error() {
        let err = config_from(&[("GOOGLE_API_KEY_FILE", "/nonexistent/voice-compare/key")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Credentials { .. }));
    }
}
