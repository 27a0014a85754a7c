//! Configuration loading and validation

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Shortest accepted signing secret, in bytes
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime (30 days)
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Origins allowed to call the API from a browser; `"*"` allows any,
    /// an empty list disables CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Authentication configuration
///
/// There is no built-in secret: one must come from the file, `--jwt-secret`
/// or `QUILL_JWT_SECRET`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

/// LLM service configuration
///
/// Without a URL, chat answers come from the built-in mock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_db_path() -> String {
    "./data/quill.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_token_ttl_secs() -> i64 {
    3600
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Config {
    /// Load configuration from a file
    ///
    /// Returns `None` when the file does not exist so the caller can fall
    /// back to defaults.
    pub fn load(path: &str) -> Result<Option<Self>> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(Some(config))
    }

    /// Check settings that would make the server unsafe or unusable
    pub fn validate(&self) -> Result<()> {
        match self.auth.jwt_secret.as_deref() {
            None => bail!("auth.jwt_secret is not set (use --jwt-secret or QUILL_JWT_SECRET)"),
            Some(secret) if secret.len() < MIN_JWT_SECRET_BYTES => bail!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            ),
            Some(_) => {}
        }

        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.auth.token_ttl_secs) {
            bail!(
                "auth.token_ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            );
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            bail!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            );
        }

        Ok(())
    }

    /// SQLite connection URL for the configured database path
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        assert!(Config::load("/nonexistent/quill.toml").unwrap().is_none());

        let config = Config::default();
        assert_eq!(config.server.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert!(config.auth.jwt_secret.is_none());
        assert!(config.llm.url.is_none());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config(
            r#"
[server]
port = 9000
cors_origins = ["https://app.example"]

[auth]
jwt_secret = "0123456789abcdef0123456789abcdef"

[llm]
url = "http://llm.internal:8000"
"#,
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap().unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.server.cors_origins, vec!["https://app.example".to_string()]);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some(SECRET));
        assert_eq!(config.llm.url.as_deref(), Some("http://llm.internal:8000"));
        assert_eq!(config.llm.timeout_secs, 30);
        assert_eq!(config.logging.format, "pretty");
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let file = write_config("[server\nport = ");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_requires_secret() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some("too-short".to_string());
        assert!(config.validate().is_err());

        config.auth.jwt_secret = Some(SECRET.to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_ttl() {
        let mut config = Config::default();
        config.auth.jwt_secret = Some(SECRET.to_string());

        config.auth.token_ttl_secs = 0;
        assert!(config.validate().is_err());

        config.auth.token_ttl_secs = -5;
        assert!(config.validate().is_err());

        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS + 1;
        assert!(config.validate().is_err());

        config.auth.token_ttl_secs = i64::MAX;
        assert!(config.validate().is_err());

        config.auth.token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.auth.jwt_secret = Some(SECRET.to_string());
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_url() {
        let config = Config::default();
        assert_eq!(config.database_url(), "sqlite:./data/quill.db");
    }
}
