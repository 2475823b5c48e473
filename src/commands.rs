//! CLI command implementations.
//!
//! Each `run_*` function opens the configured store, performs one service
//! call, prints the result to stdout, and closes the store again. Storage
//! faults are logged before they become the process's error, matching what
//! the HTTP server does for a 500.

use anyhow::{bail, Result};
use tracing::error;

use crate::config::{Backend, Config};
use crate::error::ContactError;
use crate::models::{ContactResponse, NewContact};
use crate::service::ContactService;
use crate::store;

async fn with_service<T, F, Fut>(config: &Config, f: F) -> Result<T>
where
    F: FnOnce(ContactService) -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let store = store::open(config).await?;
    let result = f(ContactService::new(store.clone())).await;
    store.close().await;
    result
}

/// Converts a service error for the CLI, logging storage faults.
fn log_fault(err: ContactError) -> anyhow::Error {
    if let ContactError::Storage(ref e) = err {
        error!(error = %e, "storage fault");
    }
    err.into()
}

fn init_message(config: &Config) -> String {
    let backend = config.db.backend.as_str();
    match config.db.backend {
        Backend::Sqlite => format!(
            "Initialized {} store at {}.",
            backend,
            config.db.path.display()
        ),
        Backend::Memory => format!("Initialized {} store (nothing is persisted).", backend),
        Backend::Mongodb => format!(
            "Initialized {} store in database '{}'.",
            backend, config.db.mongodb_database
        ),
    }
}

/// Creates the database and schema (or indexes) if they do not exist.
pub async fn run_init(config: &Config) -> Result<()> {
    with_service(config, |_| async { Ok(()) }).await?;
    println!("{}", init_message(config));
    Ok(())
}

pub async fn run_list(config: &Config) -> Result<()> {
    let contacts =
        with_service(config, |svc| async move { svc.get_all().await.map_err(log_fault) }).await?;
    print_contacts(&contacts);
    Ok(())
}

pub async fn run_add(config: &Config, name: &str, email: &str) -> Result<()> {
    let input = NewContact::new(name, email);
    let outcome = with_service(config, |svc| async move {
        match svc.create(&input).await {
            Ok(c) => Ok(Ok(c)),
            Err(e @ ContactError::Storage(_)) => Err(log_fault(e)),
            Err(e) => Ok(Err(e)),
        }
    })
    .await?;

    match outcome {
        Ok(contact) => {
            println!("Created contact {}", contact.id);
            print_contact(&contact);
            Ok(())
        }
        Err(ContactError::ValidationFailed(errors)) => {
            for e in &errors {
                eprintln!("  - {}", e);
            }
            bail!("invalid contact ({} problem(s))", errors.len())
        }
        Err(e) => bail!("{}", e),
    }
}

pub async fn run_get(config: &Config, id: &str) -> Result<()> {
    let id = id.to_string();
    let contact =
        with_service(config, |svc| async move { svc.get_by_id(&id).await.map_err(log_fault) })
            .await?;
    match contact {
        Some(c) => {
            print_contact(&c);
            Ok(())
        }
        None => bail!("contact not found"),
    }
}

pub async fn run_search(config: &Config, query: &str) -> Result<()> {
    let query = query.to_string();
    let contacts =
        with_service(config, |svc| async move { svc.search(&query).await.map_err(log_fault) })
            .await?;
    print_contacts(&contacts);
    Ok(())
}

pub async fn run_delete(config: &Config, id: &str) -> Result<()> {
    let owned = id.to_string();
    let deleted =
        with_service(config, |svc| async move { svc.delete(&owned).await.map_err(log_fault) })
            .await?;
    if !deleted {
        bail!("contact not found: {}", id);
    }
    println!("Deleted contact {}", id);
    Ok(())
}

pub async fn run_count(config: &Config) -> Result<()> {
    let count =
        with_service(config, |svc| async move { svc.count().await.map_err(log_fault) }).await?;
    println!("{}", count);
    Ok(())
}

fn print_contact(c: &ContactResponse) {
    println!("id:         {}", c.id);
    println!("name:       {}", c.name);
    println!("email:      {}", c.email);
    println!("created_at: {}", c.created_at);
}

fn print_contacts(contacts: &[ContactResponse]) {
    if contacts.is_empty() {
        println!("No contacts.");
        return;
    }

    println!("{:<6} {:<28} {:<36} CREATED", "ID", "NAME", "EMAIL");
    for c in contacts {
        println!("{:<6} {:<28} {:<36} {}", c.id, c.name, c.email, c.created_at);
    }
    println!();
    println!("{} contact(s)", contacts.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn test_init_message_names_backend() {
        let mut config = Config::minimal();
        assert!(init_message(&config).contains("memory"));

        config.db.backend = Backend::Sqlite;
        config.db.path = "/tmp/contacts.sqlite".into();
        let msg = init_message(&config);
        assert!(msg.contains("sqlite"));
        assert!(msg.contains("/tmp/contacts.sqlite"));

        config.db.backend = Backend::Mongodb;
        assert!(init_message(&config).contains("mongodb"));
    }

    #[test]
    fn test_log_fault_keeps_error_message() {
        let fault = ContactError::Storage(StoreError::Backend(anyhow::anyhow!("disk full")));
        assert!(log_fault(fault).to_string().contains("disk full"));

        let dup = ContactError::DuplicateEmail("ann@example.com".to_string());
        assert!(log_fault(dup).to_string().contains("ann@example.com"));
    }

    #[tokio::test]
    async fn test_storage_fault_surfaces_as_cli_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.db.backend = Backend::Sqlite;
        config.db.path = tmp.path().join("contacts.sqlite");

        // A file that is not a database fails on the first query
        std::fs::write(&config.db.path, b"not a sqlite database at all").unwrap();
        assert!(run_count(&config).await.is_err());
    }
}
