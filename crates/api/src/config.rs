//! Application configuration loaded from environment variables.

use std::path::PathBuf;

const DEFAULT_PORT: u16 = 6010;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Deployment environment. Only development responses carry internal
/// error details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    #[default]
    Production,
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `6010`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `text` or `json`
/// - `APP_ENV`: `development` or `production` (default)
/// - `DATABASE_URL`: PostgreSQL store when set, in-memory otherwise
/// - `UPLOAD_DIR`: profile picture directory (default: `"uploads"`)
/// - `MAX_UPLOAD_BYTES`: request body limit (default: 5 MiB)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub app_env: AppEnv,
    pub database_url: Option<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            host: get("HOST").unwrap_or(defaults.host),
            port: get("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: get("RUST_LOG").unwrap_or(defaults.log_level),
            log_format: match get("LOG_FORMAT").as_deref() {
                Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            app_env: match get("APP_ENV").as_deref() {
                Some(e) if e.eq_ignore_ascii_case("development") => AppEnv::Development,
                _ => AppEnv::Production,
            },
            database_url: get("DATABASE_URL"),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: get("MAX_UPLOAD_BYTES")
                .and_then(|b| b.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.app_env == AppEnv::Development
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            app_env: AppEnv::Production,
            database_url: None,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 6010);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.is_development());
        assert!(config.database_url.is_none());
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_values_read_from_lookup() {
        let config = config_from(&[
            ("PORT", "7000"),
            ("LOG_FORMAT", "JSON"),
            ("APP_ENV", "development"),
            ("DATABASE_URL", "postgres://localhost/customers"),
            ("UPLOAD_DIR", "/tmp/pictures"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]);
        assert_eq!(config.port, 7000);
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.is_development());
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/customers"));
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/pictures"));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_and_blank_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("DATABASE_URL", "  "), ("APP_ENV", "staging")]);
        assert_eq!(config.port, 6010);
        assert!(config.database_url.is_none());
        assert_eq!(config.app_env, AppEnv::Production);
    }
}
