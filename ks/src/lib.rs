//! KeyStore - durable local key-value store
//!
//! A small persistence mechanism scoped to one user on one machine. Values
//! survive process restarts; there is no multi-device or multi-user story.
//!
//! # Architecture
//!
//! ```text
//! store/
//! ├── todos.json        # value for key "todos"
//! ├── todos.corrupt.json
//! └── ...
//! ```
//!
//! Writes land in a sibling temp file and are renamed into place, so a
//! reader never sees a half-written value. Concurrent writers from separate
//! processes resolve last-writer-wins.
//!
//! # Example
//!
//! ```ignore
//! use keystore::{FileStore, KeyValueStore};
//!
//! let mut store = FileStore::open("store")?;
//! store.set("todos", "[]")?;
//! assert_eq!(store.get("todos")?.as_deref(), Some("[]"));
//! ```

pub mod cli;
pub mod config;
mod error;
mod memory;
mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{FileStore, KeyValueStore, validate_key};

/// Default per-value quota (5 MiB, the usual browser local-storage budget)
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// File extension used for stored values
pub const VALUE_EXTENSION: &str = "json";
