//! # Contact Book
//!
//! A small contact manager: a REST API and CLI for listing, adding,
//! searching, counting and deleting contacts, backed by SQLite or a
//! document store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐
//! │   CLI    │   │   HTTP   │
//! │(contacts)│   │  (axum)  │
//! └────┬─────┘   └────┬─────┘
//!      └──────┬───────┘
//!             ▼
//!     ┌──────────────┐   ┌────────────┐
//!     │ContactService│──▶│ validation │
//!     └──────┬───────┘   └────────────┘
//!            ▼
//!     ┌──────────────┐
//!     │ ContactStore │  SQLite │ memory │ MongoDB
//!     └──────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Contact record and response shape |
//! | [`validation`] | Name and email rules |
//! | [`store`] | Storage trait and backends |
//! | [`service`] | Business rules over a store |
//! | [`server`] | REST HTTP server |
//! | [`commands`] | CLI command implementations |
//! | [`db`] | SQLite connection |
//! | [`schema`] | SQLite schema creation |
//! | [`error`] | Storage and service error types |

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod server;
pub mod service;
pub mod store;
pub mod validation;
