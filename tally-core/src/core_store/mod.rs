//! Store access
//!
//! The `Store` trait is the seam the business methods consume; the remote
//! client implements it over the wire and `MemoryStore` implements it for
//! tests and local runs. Error shaping is part of the seam: cache reads
//! and writes swallow store trouble (a cold cache is not a failed
//! request), while plain lookups let it propagate.

use std::time::Duration;

use async_trait::async_trait;

mod client;
mod errors;
mod memory;
pub mod resp;

pub use client::RemoteStore;
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Cached lookup. Absent covers both "no such key" and "store
    /// unavailable".
    async fn cache_get(&self, key: &str) -> Option<String>;

    /// Cache write with expiry; failures are logged and dropped
    async fn cache_set(&self, key: &str, value: &str, ttl: Duration);

    /// Plain lookup; store failures propagate
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;
}
