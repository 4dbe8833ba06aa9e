//! Runtime configuration read from `IDCARD_*` environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Database value that selects the in-memory document store.
pub const MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Prefix for public form links and object URLs, without trailing slash.
    pub public_base_url: String,
    pub database: String,
    pub object_root: String,
    pub vision_endpoint: String,
    pub vision_api_key: Option<String>,
    pub chrome_bin: String,
    pub ocr_timeout: Duration,
    pub render_timeout: Duration,
    pub json_limit_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            public_base_url: "http://127.0.0.1:8080".to_string(),
            database: "idcard.sqlite".to_string(),
            object_root: "./objects".to_string(),
            vision_endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            vision_api_key: None,
            chrome_bin: "chromium".to_string(),
            ocr_timeout: Duration::from_secs(120),
            render_timeout: Duration::from_secs(300),
            json_limit_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Builds a config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let host = lookup("IDCARD_HOST").unwrap_or(defaults.host);
        let port = parsed(&lookup, "IDCARD_PORT", defaults.port)?;
        let public_base_url = lookup("IDCARD_PUBLIC_BASE_URL")
            .unwrap_or_else(|| format!("http://{}:{}", host, port))
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            host,
            port,
            public_base_url,
            database: lookup("IDCARD_DATABASE").unwrap_or(defaults.database),
            object_root: lookup("IDCARD_OBJECT_ROOT").unwrap_or(defaults.object_root),
            vision_endpoint: lookup("IDCARD_VISION_ENDPOINT").unwrap_or(defaults.vision_endpoint),
            vision_api_key: lookup("IDCARD_VISION_API_KEY"),
            chrome_bin: lookup("IDCARD_CHROME_BIN").unwrap_or(defaults.chrome_bin),
            ocr_timeout: Duration::from_secs(parsed(
                &lookup,
                "IDCARD_OCR_TIMEOUT_SECS",
                defaults.ocr_timeout.as_secs(),
            )?),
            render_timeout: Duration::from_secs(parsed(
                &lookup,
                "IDCARD_RENDER_TIMEOUT_SECS",
                defaults.render_timeout.as_secs(),
            )?),
            json_limit_bytes: parsed(&lookup, "IDCARD_JSON_LIMIT_BYTES", defaults.json_limit_bytes)?,
        })
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database == MEMORY_DATABASE
    }

    /// Public link for a published form.
    pub fn form_url(&self, form_id: &str) -> String {
        format!("{}/form/{}", self.public_base_url, form_id)
    }
}
