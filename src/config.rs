use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Storage backend selection. Exactly one backend is active per process.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Memory,
    Mongodb,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Memory => "memory",
            Backend::Mongodb => "mongodb",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default = "default_mongodb_database")]
    pub mongodb_database: String,
}

fn default_backend() -> Backend {
    Backend::Sqlite
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/contacts.sqlite")
}
fn default_max_connections() -> u32 {
    5
}
fn default_mongodb_database() -> String {
    "contacts".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Config {
    /// An in-memory configuration that needs no file on disk.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                backend: Backend::Memory,
                path: default_db_path(),
                max_connections: default_max_connections(),
                mongodb_uri: None,
                mongodb_database: default_mongodb_database(),
            },
            server: ServerConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.db.max_connections == 0 {
        anyhow::bail!("db.max_connections must be >= 1");
    }

    if config.db.backend == Backend::Mongodb {
        match config.db.mongodb_uri.as_deref() {
            Some(uri) if !uri.trim().is_empty() => {}
            _ => anyhow::bail!("db.mongodb_uri must be set when backend is 'mongodb'"),
        }
        if config.db.mongodb_database.trim().is_empty() {
            anyhow::bail!("db.mongodb_database must not be empty");
        }
    }

    config
        .server
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("server.bind is not a socket address: {}", config.server.bind))?;

    Ok(())
}
