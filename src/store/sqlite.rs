//! SQLite-backed [`ContactStore`] implementation.
//!
//! Ids are `INTEGER PRIMARY KEY AUTOINCREMENT` values rendered as decimal
//! strings. `created_at` is stored as Unix milliseconds. The unique index on
//! `email` is the authority on duplicates: an insert that trips it comes back
//! as `SQLITE_CONSTRAINT_UNIQUE`, which is mapped to
//! [`StoreError::DuplicateKey`].
//!
//! Search runs against `name_folded`/`email_folded`, filled with
//! [`fold_case`] at insert time, because SQLite's own `LIKE` only ignores
//! case for ASCII letters.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{fold_case, ContactStore};
use crate::config::Config;
use crate::db;
use crate::error::{StoreError, StoreResult};
use crate::models::{ts_from_millis, Contact};
use crate::schema;

const SELECT_COLUMNS: &str = "SELECT id, name, email, created_at FROM contacts";

/// SQLite implementation of the [`ContactStore`] trait.
pub struct SqliteContactStore {
    pool: SqlitePool,
}

impl SqliteContactStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connects to `[db].path` and ensures the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        schema::ensure_schema(&pool).await?;
        Ok(Self::new(pool))
    }
}

fn row_to_contact(row: &SqliteRow) -> Contact {
    let id: i64 = row.get("id");
    let created_at: i64 = row.get("created_at");
    Contact {
        id: id.to_string(),
        name: row.get("name"),
        email: row.get("email"),
        created_at: ts_from_millis(created_at),
    }
}

/// Escapes `LIKE` metacharacters so the query matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn map_insert_error(err: sqlx::Error, email: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateKey(email.to_string());
        }
    }
    StoreError::from(err)
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn list_all(&self) -> StoreResult<Vec<Contact>> {
        let rows = sqlx::query(&format!(
            "{} ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_contact).collect())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Contact>> {
        let row = sqlx::query(&format!("{} WHERE email = ?", SELECT_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_contact))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Contact>> {
        let Ok(id) = id.parse::<i64>() else {
            return Ok(None);
        };

        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(row_to_contact))
    }

    async fn insert(&self, name: &str, email: &str) -> StoreResult<Contact> {
        let created_at = Utc::now().timestamp_millis();

        let result = sqlx::query(
            "INSERT INTO contacts (name, email, created_at, name_folded, email_folded) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(created_at)
        .bind(fold_case(name))
        .bind(fold_case(email))
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, email))?;

        Ok(Contact {
            id: result.last_insert_rowid().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: ts_from_millis(created_at),
        })
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<bool> {
        let Ok(id) = id.parse::<i64>() else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM contacts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, query: &str) -> StoreResult<Vec<Contact>> {
        let pattern = like_pattern(&fold_case(query));
        let rows = sqlx::query(&format!(
            "{} WHERE name_folded LIKE ? ESCAPE '\\' OR email_folded LIKE ? ESCAPE '\\' \
             ORDER BY created_at DESC, id DESC",
            SELECT_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(row_to_contact).collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
