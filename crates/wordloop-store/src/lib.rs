//! Store backends for wordloop.
//!
//! Two implementations of the core store traits: [`MemoryStore`] for tests and
//! scratch sessions, and [`SqliteStore`] for durable single-file storage.
//! [`create_store`] picks one from configuration.

pub mod config;
pub mod memory;
pub mod sqlite;

pub use config::{create_store, load_config, load_config_from, StoreConfig, WordloopConfig};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
