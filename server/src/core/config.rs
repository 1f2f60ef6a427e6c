//! Application configuration
//!
//! Priority (lowest to highest):
//! 1. Defaults
//! 2. Config file (`micropost.json` in the working directory, or `--config`)
//! 3. CLI arguments (which include env var fallbacks via clap)

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::cli::CliConfig;
use super::constants::{
    CONFIG_FILE_NAME, DEFAULT_CORS_ORIGIN, DEFAULT_DATABASE_PATH, DEFAULT_HOST, DEFAULT_PORT,
    ENV_JWT_SECRET, MIN_JWT_SECRET_LENGTH,
};

// =============================================================================
// Enums
// =============================================================================

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_origin: Option<String>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub jwt_secret: Option<String>,
}

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub path: Option<PathBuf>,
}

/// Root of the JSON config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub environment: Option<Environment>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub environment: Environment,
}

impl AppConfig {
    /// Load configuration from all sources
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");

        let path = match cli.config {
            Some(ref path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.clone())
            }
            None => {
                let local = PathBuf::from(CONFIG_FILE_NAME);
                if local.exists() { Some(local) } else { None }
            }
        };

        let file_config = match path {
            Some(path) => {
                let config = FileConfig::load_from_file(&path)?;
                config.warn_unknown_fields();
                tracing::debug!(path = %path.display(), "Config file loaded");
                config
            }
            None => FileConfig::default(),
        };

        Self::from_sources(cli, file_config)
    }

    /// Layer defaults, file config and CLI/env overrides
    pub fn from_sources(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);
        let cors_origin = cli
            .cors_origin
            .clone()
            .or(file_server.cors_origin)
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string());

        // The signing secret has no default: a missing secret is a startup error
        let jwt_secret = cli
            .jwt_secret
            .clone()
            .or(file_auth.jwt_secret)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "JWT secret is not configured. Set {} or pass --jwt-secret",
                    ENV_JWT_SECRET
                )
            })?;
        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            anyhow::bail!(
                "JWT secret is too short ({} chars, minimum {})",
                jwt_secret.len(),
                MIN_JWT_SECRET_LENGTH
            );
        }

        let database_path = cli
            .database
            .clone()
            .or(file_database.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let environment = cli
            .environment
            .or(file_config.environment)
            .unwrap_or_default();

        let config = Self {
            server: ServerConfig {
                host,
                port,
                cors_origin,
            },
            auth: AuthConfig { jwt_secret },
            database: DatabaseConfig {
                path: database_path,
            },
            environment,
        };

        tracing::debug!(config = ?config, "Configuration resolved");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123";

    fn cli_with_secret() -> CliConfig {
        CliConfig {
            jwt_secret: Some(SECRET.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_sources(&cli_with_secret(), FileConfig::default()).unwrap();
        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.cors_origin, DEFAULT_CORS_ORIGIN);
        assert_eq!(config.database.path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_missing_secret_fails() {
        let err = AppConfig::from_sources(&CliConfig::default(), FileConfig::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("JWT secret is not configured"));
    }

    #[test]
    fn test_blank_secret_fails() {
        let cli = CliConfig {
            jwt_secret: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(AppConfig::from_sources(&cli, FileConfig::default()).is_err());
    }

    #[test]
    fn test_short_secret_fails() {
        let cli = CliConfig {
            jwt_secret: Some("short".to_string()),
            ..Default::default()
        };
        let err = AppConfig::from_sources(&cli, FileConfig::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("too short"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "0.0.0.0", "port": 8080 },
                "auth": { "jwt_secret": "file-secret-file-secret" },
                "environment": "production"
            }"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(9090),
            ..Default::default()
        };

        let config = AppConfig::from_sources(&cli, file).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.auth.jwt_secret, "file-secret-file-secret");
        assert!(config.environment.is_production());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let file: FileConfig = serde_json::from_str(r#"{ "sever": { "port": 1 } }"#).unwrap();
        match file.extra {
            serde_json::Value::Object(map) => assert!(map.contains_key("sever")),
            other => panic!("unexpected extra: {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("micropost.json");
        std::fs::write(
            &path,
            r#"{ "database": { "path": "/tmp/posts.db" }, "auth": { "jwt_secret": "from-file-secret-123" } }"#,
        )
        .unwrap();

        let cli = CliConfig {
            config: Some(path),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/posts.db"));
        assert_eq!(config.auth.jwt_secret, "from-file-secret-123");
    }

    #[test]
    fn test_missing_config_file_fails() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/micropost.json")),
            ..cli_with_secret()
        };
        assert!(AppConfig::load(&cli).is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::from_sources(&cli_with_secret(), FileConfig::default()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("<redacted>"));
    }
}
