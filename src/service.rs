//! Contact operations with business rules applied.
//!
//! [`ContactService`] sits between the transports (HTTP server, CLI) and a
//! [`ContactStore`]. It holds no state of its own beyond the injected store
//! handle, so every call is a single request/response.
//!
//! Creating a contact runs in this order:
//!
//! 1. Trim the raw input.
//! 2. Validate; on failure return [`ContactError::ValidationFailed`] without
//!    touching storage.
//! 3. Look the email up; if taken return [`ContactError::DuplicateEmail`].
//! 4. Insert. A [`StoreError::DuplicateKey`] here means a concurrent create
//!    won the race between steps 3 and 4, and is also reported as
//!    [`ContactError::DuplicateEmail`]. The storage constraint is the real
//!    guarantee; step 3 only avoids a failed write in the common case.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ContactError, ContactResult, StoreError};
use crate::models::{ContactResponse, NewContact};
use crate::store::ContactStore;
use crate::validation::validate_contact;

#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self { store }
    }

    /// All contacts, newest first.
    pub async fn get_all(&self) -> ContactResult<Vec<ContactResponse>> {
        let contacts = self.store.list_all().await?;
        Ok(contacts.into_iter().map(ContactResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: &str) -> ContactResult<Option<ContactResponse>> {
        Ok(self.store.find_by_id(id).await?.map(ContactResponse::from))
    }

    pub async fn get_by_email(&self, email: &str) -> ContactResult<Option<ContactResponse>> {
        Ok(self
            .store
            .find_by_email(email.trim())
            .await?
            .map(ContactResponse::from))
    }

    pub async fn create(&self, input: &NewContact) -> ContactResult<ContactResponse> {
        let candidate = input.trimmed();

        let report = validate_contact(&candidate.name, &candidate.email);
        if !report.is_valid() {
            debug!(errors = ?report.errors, "rejected invalid contact");
            return Err(ContactError::ValidationFailed(report.errors));
        }

        if self.store.find_by_email(&candidate.email).await?.is_some() {
            warn!(email = %candidate.email, "duplicate email rejected");
            return Err(ContactError::DuplicateEmail(candidate.email));
        }

        let created = match self.store.insert(&candidate.name, &candidate.email).await {
            Ok(contact) => contact,
            Err(StoreError::DuplicateKey(_)) => {
                warn!(email = %candidate.email, "duplicate email rejected by storage constraint");
                return Err(ContactError::DuplicateEmail(candidate.email));
            }
            Err(e) => return Err(e.into()),
        };

        info!(id = %created.id, email = %created.email, "contact created");
        Ok(created.into())
    }

    /// Deletes by id; `false` when nothing matched.
    pub async fn delete(&self, id: &str) -> ContactResult<bool> {
        let deleted = self.store.delete_by_id(id).await?;
        if deleted {
            info!(id, "contact deleted");
        } else {
            debug!(id, "delete matched no contact");
        }
        Ok(deleted)
    }

    /// Substring search over name and email. A blank query lists everything.
    pub async fn search(&self, query: &str) -> ContactResult<Vec<ContactResponse>> {
        let query = query.trim();
        if query.is_empty() {
            return self.get_all().await;
        }

        debug!(query, "searching contacts");
        let contacts = self.store.search(query).await?;
        Ok(contacts.into_iter().map(ContactResponse::from).collect())
    }

    pub async fn count(&self) -> ContactResult<u64> {
        Ok(self.store.count().await?)
    }
}
