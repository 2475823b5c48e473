//! In-memory [`ContactStore`] implementation for tests and ephemeral runs.
//!
//! Behaves like a document store: ids are generated UUIDs, and a secondary
//! email index plays the role of the unique constraint. State lives behind a
//! single `std::sync::RwLock` so an insert checks and claims the email
//! atomically.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{fold_case, ContactStore};
use crate::error::{StoreError, StoreResult};
use crate::models::Contact;

#[derive(Default)]
struct State {
    /// Contacts in insertion order.
    contacts: Vec<Contact>,
    /// email → id
    by_email: HashMap<String, String>,
}

/// In-memory document store.
pub struct InMemoryContactStore {
    state: RwLock<State>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("contact store lock poisoned")))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend(anyhow::anyhow!("contact store lock poisoned")))
    }
}

impl Default for InMemoryContactStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Newest first; later insertions win ties.
fn newest_first<'a>(contacts: impl DoubleEndedIterator<Item = &'a Contact>) -> Vec<Contact> {
    let mut out: Vec<Contact> = contacts.rev().cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn list_all(&self) -> StoreResult<Vec<Contact>> {
        let state = self.read()?;
        Ok(newest_first(state.contacts.iter()))
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>> {
        let state = self.read()?;
        Ok(state
            .by_email
            .get(email)
            .and_then(|id| state.contacts.iter().find(|c| &c.id == id))
            .cloned())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Contact>> {
        let state = self.read()?;
        Ok(state.contacts.iter().find(|c| c.id == id).cloned())
    }

    async fn insert(&self, name: &str, email: &str) -> StoreResult<Contact> {
        let mut state = self.write()?;
        if state.by_email.contains_key(email) {
            return Err(StoreError::DuplicateKey(email.to_string()));
        }

        let contact = Contact {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        state
            .by_email
            .insert(contact.email.clone(), contact.id.clone());
        state.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some(pos) = state.contacts.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        let removed = state.contacts.remove(pos);
        state.by_email.remove(&removed.email);
        Ok(true)
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Contact>> {
        let needle = fold_case(query);
        let state = self.read()?;
        let matches: Vec<&Contact> = state
            .contacts
            .iter()
            .filter(|c| {
                fold_case(&c.name).contains(&needle) || fold_case(&c.email).contains(&needle)
            })
            .collect();
        Ok(newest_first(matches.into_iter()))
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.read()?.contacts.len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_generates_unique_string_ids() {
        let store = InMemoryContactStore::new();
        let a = store.insert("Ann", "ann@example.com").await.unwrap();
        let b = store.insert("Bob", "bob@example.com").await.unwrap();
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert_eq!(store.find_by_id(&a.id).await.unwrap(), Some(a.clone()));
    }

    #[tokio::test]
    async fn test_duplicate_key() {
        let store = InMemoryContactStore::new();
        store.insert("Ann", "ann@example.com").await.unwrap();
        let err = store.insert("Other", "ann@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(_)));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_frees_email() {
        let store = InMemoryContactStore::new();
        let a = store.insert("Ann", "ann@example.com").await.unwrap();
        assert!(store.delete_by_id(&a.id).await.unwrap());
        assert!(!store.delete_by_id(&a.id).await.unwrap());
        assert!(!store.delete_by_id("not-an-id").await.unwrap());
        assert!(store.insert("Ann", "ann@example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_search_and_order() {
        let store = InMemoryContactStore::new();
        store.insert("Ann Lee", "ann@example.com").await.unwrap();
        store.insert("Bob Ray", "bob@work.org").await.unwrap();
        store.insert("Cat Annis", "cat@example.com").await.unwrap();

        let names: Vec<String> = store
            .search("ANN")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Cat Annis", "Ann Lee"]);

        let all = store.list_all().await.unwrap();
        assert_eq!(all[0].name, "Cat Annis");
        assert_eq!(all[2].name, "Ann Lee");
        assert!(store.search("a.n").await.unwrap().is_empty());
    }
}
