//! SQLite connection pool for the contact store.
//!
//! The database file lives at `[db].path`; its parent directory is created
//! on first use. The pool runs in WAL mode so the HTTP server's concurrent
//! readers do not block the single writer, and its size comes from
//! `[db].max_connections`.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::Config;

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db.max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open contacts database: {}", db_path.display()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connect_creates_missing_directory_in_wal_mode() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.db.backend = Backend::Sqlite;
        config.db.path = tmp.path().join("data").join("contacts.sqlite");

        let pool = connect(&config).await.unwrap();
        assert!(config.db.path.exists());

        let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        pool.close().await;
    }

    #[tokio::test]
    async fn test_connect_reports_unusable_path() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();

        let mut config = Config::minimal();
        config.db.backend = Backend::Sqlite;
        config.db.path = blocker.join("contacts.sqlite");

        let err = connect(&config).await.unwrap_err();
        assert!(err.to_string().contains("database directory"));
    }
}
