//! # Contact Book CLI (`contacts`)
//!
//! Manage contacts from the terminal or start the REST API server.
//!
//! ## Usage
//!
//! ```bash
//! contacts --config ./config/contacts.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `contacts init` | Create the database and schema |
//! | `contacts list` | List all contacts, newest first |
//! | `contacts add <name> <email>` | Create a contact |
//! | `contacts get <id>` | Show one contact |
//! | `contacts search "<query>"` | Substring search over name and email |
//! | `contacts delete <id>` | Delete a contact |
//! | `contacts count` | Print the number of contacts |
//! | `contacts serve` | Start the HTTP API |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use contact_book::{commands, config, server};

#[derive(Parser)]
#[command(
    name = "contacts",
    about = "Contact Book: list, add, search and delete contacts over SQLite or a document store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/contacts.toml")]
    config: PathBuf,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it multiple times is safe.
    Init,

    /// List all contacts, newest first.
    List,

    /// Add a contact.
    Add {
        /// Letters and spaces only, at most 50 characters.
        name: String,
        email: String,
    },

    /// Show a contact by id.
    Get { id: String },

    /// Search contacts by name or email (case-insensitive substring).
    ///
    /// An empty query lists every contact.
    Search {
        #[arg(default_value = "")]
        query: String,
    },

    /// Delete a contact by id.
    Delete { id: String },

    /// Print the total number of contacts.
    Count,

    /// Start the REST API server on `[server].bind`.
    Serve,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "contact_book={},tower_http={}",
            default_level, default_level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => commands::run_init(&cfg).await?,
        Commands::List => commands::run_list(&cfg).await?,
        Commands::Add { name, email } => commands::run_add(&cfg, &name, &email).await?,
        Commands::Get { id } => commands::run_get(&cfg, &id).await?,
        Commands::Search { query } => commands::run_search(&cfg, &query).await?,
        Commands::Delete { id } => commands::run_delete(&cfg, &id).await?,
        Commands::Count => commands::run_count(&cfg).await?,
        Commands::Serve => server::run_server(&cfg).await?,
    }

    Ok(())
}
