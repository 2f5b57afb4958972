//! Database module: item models, schema and storage backends.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring joined item rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: the `ItemStore` capability both backends implement
//! - `sqlite.rs` / `json_file.rs`: the two backends

pub mod json_file;
pub mod models;
pub mod schema;
pub mod sqlite;
pub mod store;

pub use json_file::JsonFileItemStore;
pub use models::{Item, ItemId, ItemsList, NewItem};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqliteItemStore, SqlitePool};
pub use store::ItemStore;
