//! MongoDB-backed [`ContactStore`] implementation (feature `mongodb`).
//!
//! Documents have the shape
//! `{ _id: ObjectId, name, email, createdAt: Date, nameFolded, emailFolded }`.
//! A unique index on `email` enforces one contact per address; MongoDB
//! reports a violation as write error code `11000`, mapped to
//! [`StoreError::DuplicateKey`]. Ids are surfaced as the ObjectId's hex form.
//!
//! Search matches an escaped regex against the `*Folded` fields, which hold
//! [`fold_case`] output, so case-insensitivity is the same as the other
//! backends rather than the server's `$options: "i"` rules.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};

use super::{fold_case, ContactStore};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{ts_from_millis, Contact};

const COLLECTION: &str = "contacts";
const DUPLICATE_KEY_CODE: i32 = 11000;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError::Backend(err.into())
    }
}

pub struct MongoContactStore {
    client: Client,
    collection: Collection<Document>,
}

impl MongoContactStore {
    /// Connects to `[db].mongodb_uri` and ensures the indexes exist.
    pub async fn open(config: &Config) -> Result<Self> {
        let uri = config
            .db
            .mongodb_uri
            .as_deref()
            .context("db.mongodb_uri is not set")?;

        let client = Client::with_uri_str(uri)
            .await
            .with_context(|| "Failed to connect to MongoDB")?;
        let collection = client
            .database(&config.db.mongodb_database)
            .collection::<Document>(COLLECTION);

        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        collection.create_index(unique_email).await?;

        let by_created = IndexModel::builder()
            .keys(doc! { "createdAt": -1 })
            .build();
        collection.create_index(by_created).await?;

        Ok(Self { client, collection })
    }

    async fn find_sorted(&self, filter: Document) -> StoreResult<Vec<Contact>> {
        let docs: Vec<Document> = self
            .collection
            .find(filter)
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?
            .try_collect()
            .await?;

        docs.iter().map(doc_to_contact).collect()
    }
}

/// Parses a contact id; anything that is not a 24-digit ObjectId hex is absent.
fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

fn contact_document(oid: ObjectId, name: &str, email: &str, created_at_ms: i64) -> Document {
    doc! {
        "_id": oid,
        "name": name,
        "email": email,
        "createdAt": BsonDateTime::from_millis(created_at_ms),
        "nameFolded": fold_case(name),
        "emailFolded": fold_case(email),
    }
}

fn search_filter(query: &str) -> Document {
    let pattern = regex::escape(&fold_case(query));
    doc! {
        "$or": [
            { "nameFolded": { "$regex": pattern.as_str() } },
            { "emailFolded": { "$regex": pattern.as_str() } },
        ]
    }
}

fn doc_to_contact(doc: &Document) -> StoreResult<Contact> {
    let parse = || -> Result<Contact> {
        Ok(Contact {
            id: doc.get_object_id("_id")?.to_hex(),
            name: doc.get_str("name")?.to_string(),
            email: doc.get_str("email")?.to_string(),
            created_at: ts_from_millis(doc.get_datetime("createdAt")?.timestamp_millis()),
        })
    };
    parse()
        .context("malformed contact document")
        .map_err(StoreError::Backend)
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => {
            write_err.code == DUPLICATE_KEY_CODE
        }
        ErrorKind::Command(cmd_err) => cmd_err.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

#[async_trait]
impl ContactStore for MongoContactStore {
    async fn list_all(&self) -> StoreResult<Vec<Contact>> {
        self.find_sorted(doc! {}).await
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>> {
        self.collection
            .find_one(doc! { "email": email })
            .await?
            .as_ref()
            .map(doc_to_contact)
            .transpose()
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Contact>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        self.collection
            .find_one(doc! { "_id": oid })
            .await?
            .as_ref()
            .map(doc_to_contact)
            .transpose()
    }

    async fn insert(&self, name: &str, email: &str) -> StoreResult<Contact> {
        let created_at = Utc::now().timestamp_millis();
        let oid = ObjectId::new();
        let document = contact_document(oid, name, email, created_at);

        self.collection.insert_one(document).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::DuplicateKey(email.to_string())
            } else {
                StoreError::from(e)
            }
        })?;

        Ok(Contact {
            id: oid.to_hex(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: ts_from_millis(created_at),
        })
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Contact>> {
        self.find_sorted(search_filter(query)).await
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regex_patterns(filter: &Document) -> Vec<String> {
        filter
            .get_array("$or")
            .unwrap()
            .iter()
            .map(|clause| {
                let clause = clause.as_document().unwrap();
                let (_, cond) = clause.iter().next().unwrap();
                cond.as_document()
                    .unwrap()
                    .get_str("$regex")
                    .unwrap()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_search_filter_escapes_metacharacters() {
        assert_eq!(regex_patterns(&search_filter("a.n")), vec!["a\\.n", "a\\.n"]);
        assert_eq!(
            regex_patterns(&search_filter("(x)")),
            vec!["\\(x\\)", "\\(x\\)"]
        );
    }

    #[test]
    fn test_search_filter_targets_folded_fields() {
        assert_eq!(
            search_filter("ÉLISE"),
            doc! {
                "$or": [
                    { "nameFolded": { "$regex": "élise" } },
                    { "emailFolded": { "$regex": "élise" } },
                ]
            }
        );
    }

    #[test]
    fn test_contact_document_round_trips() {
        let oid = ObjectId::new();
        let document = contact_document(oid, "Elise Roy", "ÉLISE@exemple.fr", 1_714_564_800_123);
        assert_eq!(document.get_str("emailFolded").unwrap(), "élise@exemple.fr");
        assert_eq!(document.get_str("nameFolded").unwrap(), "elise roy");

        let contact = doc_to_contact(&document).unwrap();
        assert_eq!(contact.id, oid.to_hex());
        assert_eq!(contact.id.len(), 24);
        assert_eq!(contact.name, "Elise Roy");
        assert_eq!(contact.email, "ÉLISE@exemple.fr");
        assert_eq!(contact.created_at, ts_from_millis(1_714_564_800_123));
    }

    #[test]
    fn test_malformed_document_is_backend_error() {
        let missing_fields = doc! { "name": "Elise Roy" };
        assert!(matches!(
            doc_to_contact(&missing_fields),
            Err(StoreError::Backend(_))
        ));

        let string_id = doc! {
            "_id": "1",
            "name": "Elise Roy",
            "email": "elise@exemple.fr",
            "createdAt": BsonDateTime::from_millis(0),
        };
        assert!(matches!(doc_to_contact(&string_id), Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_parse_object_id() {
        assert_eq!(parse_object_id("abc"), None);
        assert_eq!(parse_object_id("1"), None);
        assert_eq!(parse_object_id(""), None);

        let oid = ObjectId::new();
        assert_eq!(parse_object_id(&oid.to_hex()), Some(oid));
    }
}
