//! Storage abstraction for contacts.
//!
//! The [`ContactStore`] trait is the only place the rest of the crate talks
//! to a persistence engine. Backends are interchangeable and chosen once at
//! startup by [`open`]; they are never mixed within a process.
//!
//! | Backend | Module | Identifier |
//! |---------|--------|------------|
//! | SQLite | [`sqlite`] | auto-increment integer |
//! | In-memory document store | [`memory`] | generated UUID |
//! | MongoDB (feature `mongodb`) | `mongo` | `ObjectId` hex |
//!
//! Every backend returns the same [`Contact`] shape with a string id, and
//! reports a uniqueness violation on insert as [`StoreError::DuplicateKey`].
//!
//! [`StoreError::DuplicateKey`]: crate::error::StoreError::DuplicateKey

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod sqlite;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Backend, Config};
use crate::error::StoreResult;
use crate::models::Contact;

/// Persistence operations over the single `contacts` collection.
///
/// # Operations
///
/// | Method | Absence |
/// |--------|---------|
/// | [`list_all`](ContactStore::list_all) | empty vec |
/// | [`find_by_email`](ContactStore::find_by_email) | `None` |
/// | [`find_by_id`](ContactStore::find_by_id) | `None`, also for malformed ids |
/// | [`insert`](ContactStore::insert) | n/a |
/// | [`delete_by_id`](ContactStore::delete_by_id) | `false` |
/// | [`search`](ContactStore::search) | empty vec |
/// | [`count`](ContactStore::count) | `0` |
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// All contacts, newest first.
    async fn list_all(&self) -> StoreResult<Vec<Contact>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>>;

    /// Looks up a contact by id. An id the engine cannot parse is treated
    /// as absent rather than as a fault.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Contact>>;

    /// Creates a contact, assigning `id` and `created_at`.
    ///
    /// Fails with [`StoreError::DuplicateKey`](crate::error::StoreError::DuplicateKey)
    /// when the email is already stored.
    async fn insert(&self, name: &str, email: &str) -> StoreResult<Contact>;

    /// Returns `true` iff a contact was removed.
    async fn delete_by_id(&self, id: &str) -> StoreResult<bool>;

    /// Contacts whose name or email contains `query` (case-insensitive,
    /// matched literally), newest first.
    async fn search(&self, query: &str) -> StoreResult<Vec<Contact>>;

    async fn count(&self) -> StoreResult<u64>;

    /// Releases the engine connection. Called once at shutdown.
    async fn close(&self) {}

    /// Short backend label used in logs.
    fn backend_name(&self) -> &'static str;
}

/// Case folding shared by every backend's search: both the stored fields
/// and the query go through Rust's Unicode lowercasing, so a query matches
/// the same contacts whichever engine holds them.
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
}

/// Opens the backend selected by `[db].backend`, creating the schema or
/// indexes if they are missing.
pub async fn open(config: &Config) -> Result<Arc<dyn ContactStore>> {
    let store: Arc<dyn ContactStore> = match config.db.backend {
        Backend::Sqlite => Arc::new(sqlite::SqliteContactStore::open(config).await?),
        Backend::Memory => Arc::new(memory::InMemoryContactStore::new()),
        #[cfg(feature = "mongodb")]
        Backend::Mongodb => Arc::new(mongo::MongoContactStore::open(config).await?),
        #[cfg(not(feature = "mongodb"))]
        Backend::Mongodb => anyhow::bail!(
            "backend 'mongodb' requires building with `--features mongodb`"
        ),
    };

    tracing::info!(backend = store.backend_name(), "contact store opened");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_backend() {
        let store = open(&Config::minimal()).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn test_fold_case_handles_non_ascii() {
        assert_eq!(fold_case("ÉLISE@Exemple.FR"), "élise@exemple.fr");
        assert_eq!(fold_case("Zoë ØSTER"), "zoë øster");
    }

    #[tokio::test]
    async fn test_search_matches_identically_across_backends() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut sqlite_config = Config::minimal();
        sqlite_config.db.backend = Backend::Sqlite;
        sqlite_config.db.path = tmp.path().join("contacts.sqlite");

        let sqlite = open(&sqlite_config).await.unwrap();
        let memory = open(&Config::minimal()).await.unwrap();

        for store in [&sqlite, &memory] {
            store.insert("Elise Roy", "ÉLISE@exemple.fr").await.unwrap();
            store.insert("Bob Ray", "bob@example.com").await.unwrap();
        }

        for query in ["élise", "ÉLISE", "Élise@EXEMPLE", "roy", "ray", "xyz"] {
            let from_sqlite: Vec<String> = sqlite
                .search(query)
                .await
                .unwrap()
                .into_iter()
                .map(|c| c.email)
                .collect();
            let from_memory: Vec<String> = memory
                .search(query)
                .await
                .unwrap()
                .into_iter()
                .map(|c| c.email)
                .collect();
            assert_eq!(from_sqlite, from_memory, "query {:?}", query);
        }

        let hits = sqlite.search("élise").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].email, "ÉLISE@exemple.fr");

        sqlite.close().await;
    }

    #[cfg(not(feature = "mongodb"))]
    #[tokio::test]
    async fn test_open_mongodb_without_feature_fails() {
        let mut config = Config::minimal();
        config.db.backend = Backend::Mongodb;
        config.db.mongodb_uri = Some("mongodb://localhost:27017".to_string());
        let err = open(&config).await.err().unwrap();
        assert!(err.to_string().contains("--features mongodb"));
    }
}
