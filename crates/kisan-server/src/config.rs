//! Server configuration loading from file and environment variables.

use kisan_voice::{GoogleCloudConfig, LlmConfig};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Google Cloud speech credentials and endpoints.
    #[serde(default)]
    pub google: GoogleCloudConfig,

    /// Answer-generation backend.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file. A `sqlite://` prefix is accepted.
    #[serde(default = "default_db_path")]
    pub path: String,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "kisan_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
}

fn default_port() -> u16 {
    8000
}

fn default_db_path() -> String {
    "kisan_vani.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `KISAN_HOST` overrides `server.host`
/// - `KISAN_PORT` overrides `server.port`
/// - `KISAN_DB_PATH` overrides `database.path`; `DATABASE_URL` is used when
///   `KISAN_DB_PATH` is unset, and only if it is a plain path or a `sqlite:`
///   URL (other schemes are logged and ignored)
/// - `KISAN_LOG_LEVEL` overrides `logging.level`
/// - `KISAN_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `GOOGLE_STT_API_KEY` / `GOOGLE_TTS_API_KEY` override the speech keys
/// - `KISAN_LLM_ENDPOINT`, `KISAN_LLM_MODEL`, `KISAN_LLM_API_KEY` override
///   the `llm` section
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    Ok(apply_overrides(config, |key| std::env::var(key).ok()))
}

/// Applies environment overrides read through `var`.
fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(host) = var("KISAN_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Some(port) = var("KISAN_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Some(db_path) = var("KISAN_DB_PATH") {
        config.database.path = kisan_db::normalize_db_path(&db_path).to_string();
    } else if let Some(url) = var("DATABASE_URL") {
        match url_scheme(&url) {
            None | Some("sqlite") => {
                config.database.path = kisan_db::normalize_db_path(&url).to_string();
            }
            Some(scheme) => {
                tracing::warn!(
                    scheme,
                    path = %config.database.path,
                    "ignoring DATABASE_URL, only sqlite URLs are supported"
                );
            }
        }
    }
    if let Some(level) = var("KISAN_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("KISAN_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(key) = var("GOOGLE_STT_API_KEY") {
        config.google.stt_api_key = Some(key);
    }
    if let Some(key) = var("GOOGLE_TTS_API_KEY") {
        config.google.tts_api_key = Some(key);
    }
    if let Some(endpoint) = var("KISAN_LLM_ENDPOINT") {
        config.llm.endpoint = endpoint;
    }
    if let Some(model) = var("KISAN_LLM_MODEL") {
        config.llm.model = model;
    }
    if let Some(key) = var("KISAN_LLM_API_KEY") {
        config.llm.api_key = Some(key);
    }

    config
}

/// Returns the URL scheme of `value`, if it has one.
///
/// Single-letter prefixes are Windows drive letters, not schemes.
fn url_scheme(value: &str) -> Option<&str> {
    let (scheme, _) = value.trim().split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (starts_alpha && valid && scheme.len() > 1).then_some(scheme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = load_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.busy_timeout_ms, 5_000);
        assert_eq!(config.google.stt_timeout_secs, 60);
        assert_eq!(config.llm.timeout_secs, 30);
    }

    #[test]
    fn file_sections_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 9100

[database]
path = "history.db"

[logging]
json = true

[google]
tts_api_key = "from-file"

[llm]
model = "llama3.1:8b"
"#,
        )
        .unwrap();

        let config = load_config(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.path, "history.db");
        assert_eq!(config.database.pool_max_size, 8);
        assert!(config.logging.json);
        assert_eq!(config.google.tts_key(), Some("from-file"));
        assert_eq!(config.google.stt_key(), None);
        assert_eq!(config.llm.model, "llama3.1:8b");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = load_config(Some(path.to_str().unwrap())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = apply_overrides(
            Config::default(),
            env(&[
                ("KISAN_PORT", "8123"),
                ("KISAN_HOST", "not-an-ip"),
                ("DATABASE_URL", "sqlite://./data/kisan.db"),
                ("KISAN_LOG_JSON", "1"),
                ("GOOGLE_STT_API_KEY", "stt"),
                ("KISAN_LLM_MODEL", "gemma2"),
            ]),
        );
        assert_eq!(config.server.port, 8123);
        assert_eq!(config.server.host, default_host());
        assert_eq!(config.database.path, "./data/kisan.db");
        assert!(config.logging.json);
        assert_eq!(config.google.stt_key(), Some("stt"));
        assert_eq!(config.llm.model, "gemma2");
    }

    #[test]
    fn db_path_variable_wins_over_database_url() {
        let config = apply_overrides(
            Config::default(),
            env(&[
                ("KISAN_DB_PATH", "primary.db"),
                ("DATABASE_URL", "sqlite:///var/lib/other.db"),
            ]),
        );
        assert_eq!(config.database.path, "primary.db");
    }

    #[test]
    fn non_sqlite_database_url_is_ignored() {
        let config = apply_overrides(
            Config::default(),
            env(&[("DATABASE_URL", "mysql+pymysql://root:@localhost/kisan_vani")]),
        );
        assert_eq!(config.database.path, "kisan_vani.db");

        let config = apply_overrides(
            Config::default(),
            env(&[("DATABASE_URL", "postgres://db.internal/kisan")]),
        );
        assert_eq!(config.database.path, "kisan_vani.db");
    }

    #[test]
    fn database_url_path_or_sqlite_scheme_is_used() {
        let config = apply_overrides(
            Config::default(),
            env(&[("DATABASE_URL", "/var/lib/kisan/history.db")]),
        );
        assert_eq!(config.database.path, "/var/lib/kisan/history.db");

        let config = apply_overrides(
            Config::default(),
            env(&[("DATABASE_URL", r"C:\kisan\history.db")]),
        );
        assert_eq!(config.database.path, r"C:\kisan\history.db");

        let config = apply_overrides(
            Config::default(),
            env(&[("DATABASE_URL", "sqlite:history.db")]),
        );
        assert_eq!(config.database.path, "history.db");
    }
}
