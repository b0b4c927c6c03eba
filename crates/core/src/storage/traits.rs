use crate::errors::CoreError;

/// Durable string key-value store (browser `localStorage` or an equivalent).
///
/// Reads and writes are independent calls; the store offers no
/// read-modify-write transaction. Callers that need one must accept
/// last-writer-wins between two concurrent writers.
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}
