use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allow cross-origin GET requests from any origin.
    #[serde(default)]
    pub cors_allow_any_origin: bool,
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            cors_allow_any_origin: false,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    Sqlite,
    Postgresql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseType,

    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,

    #[serde(default)]
    pub postgresql_url: Option<String>,

    /// Maximum pooled connections (PostgreSQL only).
    #[serde(default)]
    pub pool_size: Option<u32>,
}

fn default_sqlite_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("atelier")
        .join("atelier.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseType::default(),
            sqlite_path: default_sqlite_path(),
            postgresql_url: None,
            pool_size: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server the browse tool talks to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where persisted filter state lives.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_state_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("atelier")
        .join("state")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            state_dir: default_state_dir(),
        }
    }
}

impl Config {
    /// Load from `ATELIER_CONFIG` if set, otherwise from the default location.
    /// A missing default file is created with defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("ATELIER_CONFIG") {
            return Self::load_from(Path::new(&path));
        }

        let config_path = Self::config_path();
        let config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Config::default();
            config.save()?;
            config.with_env_overrides()
        };
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config.with_env_overrides())
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// `ATELIER_PORT` and `DATABASE_URL` take precedence over the file.
    fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("ATELIER_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(e) => tracing::warn!("Ignoring invalid ATELIER_PORT {port:?}: {e}"),
            }
        }
        if let Ok(url) = std::env::var("DATABASE_URL") {
            self.database.postgresql_url = Some(url);
        }
        self
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("atelier")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.database.backend, DatabaseType::Sqlite);
        assert!(config.database.postgresql_url.is_none());
        assert_eq!(config.client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [server]
            port = 8080

            [database]
            backend = "postgresql"
            postgresql_url = "postgres://gallery@localhost/gallery"
            pool_size = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.server.address(), "0.0.0.0:8080");
        assert_eq!(config.database.backend, DatabaseType::Postgresql);
        assert_eq!(config.database.pool_size, Some(4));
        assert!(!config.server.cors_allow_any_origin);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Config::parse("[database]\nbackend = \"mysql\"\n").is_err());
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = Config::default();
        config.server.port = 4321;
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::parse(&text).unwrap();
        assert_eq!(parsed.server.port, 4321);
    }
}
