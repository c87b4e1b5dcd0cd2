//! Durable key-value blob storage.
//!
//! Keys are collection names, values are JSON text. Backends only move
//! strings around; (de)serialisation lives in `persistence`.

use std::future::Future;

use crate::error::StoreError;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub trait KeyValueStore: Send + Sync + 'static {
    /// `Ok(None)` when nothing has been stored under `key`.
    fn get_item(&self, key: &str)
    -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    fn set_item(&self, key: &str, value: String)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Drops every key.
    fn clear(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
