//! Idempotent creation of the SQLite `contacts` table and its indexes.

use anyhow::Result;
use sqlx::SqlitePool;

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    // `created_at` holds Unix milliseconds; AUTOINCREMENT keeps ids from
    // being reused after deletes. `name_folded`/`email_folded` carry the
    // Rust-lowercased fields that search matches against.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL,
            name_folded TEXT NOT NULL,
            email_folded TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_contacts_created_at ON contacts(created_at DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
