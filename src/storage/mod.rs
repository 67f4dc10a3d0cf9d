//! Client-local key-value persistence.
//!
//! All durable state lives behind the [`KvStore`] capability so the same
//! wardrobe and workflow logic runs against the on-disk store in production
//! and an in-memory fake in tests.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

/// Storage key for the serialized wardrobe collection.
pub const WARDROBE_KEY: &str = "wardrobe_images";
/// Storage key for the API credential.
pub const CREDENTIAL_KEY: &str = "gemini_api_key";
/// Storage key for the append-only generated-outfit log.
pub const OUTFIT_LOG_KEY: &str = "generated_outfits";

/// Minimal key-value capability: whole-value reads and writes, no partial
/// updates, no transactions. Callers serialize their own payloads.
pub trait KvStore: Send + Sync {
    /// Load the value stored under `key`, or `None` if the key is absent.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the value stored under `key`.
    fn save(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Remove `key` entirely. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
