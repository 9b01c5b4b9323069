use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:5000";
const DEFAULT_DATABASE_PATH: &str = "Resources/hawaii.sqlite";
const DEFAULT_MAX_CONNECTIONS: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppConfig {
    /// Load configuration from SURFSUP_CONFIG path (TOML) if present, with reasonable defaults.
    /// SURFSUP_DATABASE overrides the dataset path.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("SURFSUP_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = Self::load_from(&path)?;
        if let Ok(db_path) = std::env::var("SURFSUP_DATABASE") {
            cfg.set_database_path(db_path);
        }
        Ok(cfg)
    }

    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let cfg = if path.exists() {
            let s = fs::read_to_string(path)?;
            toml::from_str::<AppConfig>(&s)?
        } else {
            AppConfig::default()
        };
        Ok(cfg)
    }

    pub fn set_database_path(&mut self, path: impl Into<PathBuf>) {
        let db = self.database.get_or_insert(DatabaseConfig {
            path: None,
            max_connections: None,
        });
        db.path = Some(path.into());
    }

    /// Get HTTP bind address (default 127.0.0.1:5000)
    pub fn http_bind(&self) -> String {
        self.server
            .as_ref()
            .and_then(|s| s.bind.clone())
            .unwrap_or_else(|| DEFAULT_HTTP_BIND.to_string())
    }

    /// Get dataset path (default Resources/hawaii.sqlite)
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_ref()
            .and_then(|d| d.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH))
    }

    pub fn max_connections(&self) -> u32 {
        self.database
            .as_ref()
            .and_then(|d| d.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }
}
