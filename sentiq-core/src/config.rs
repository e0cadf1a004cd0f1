use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct SentiqConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub language: LanguageConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Hosted natural-language API. The API key is never configured here; it is
/// read from `GOOGLE_API_KEY` when the client is constructed.
#[derive(Debug, Deserialize, Clone)]
pub struct LanguageConfig {
    #[serde(default = "default_language_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_language_endpoint(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Hosted document store. An optional bearer token is read from
/// `SENTIQ_STORE_TOKEN` when the client is constructed.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_language_endpoint() -> String {
    "https://language.googleapis.com".to_string()
}

fn default_collection() -> String {
    "Sentences".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl SentiqConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let raw = r#"
            [store]
            endpoint = "https://docstore.example.com"
        "#;

        let config: SentiqConfig = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.language.endpoint, "https://language.googleapis.com");
        assert_eq!(config.store.collection, "Sentences");
        assert_eq!(config.store.timeout_seconds, 30);
    }

    #[test]
    fn test_missing_store_endpoint_is_an_error() {
        let raw = r#"
            [http]
            host = "0.0.0.0"
            port = 9000
        "#;

        let result: Result<SentiqConfig, _> = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize();

        assert!(result.is_err());
    }
}
