//! Seam to the content-addressed storage substrate.
//!
//! The substrate is an external collaborator: a key-value store keyed by
//! content hash that can publish entries, link them to a base, list the
//! entries linked from a base and fetch an entry. [`MemoryStore`] is the
//! in-process implementation used by the CLI and the tests.

mod memory;

pub use memory::MemoryStore;

use crate::entry::{Entry, EntryHash};
use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Kind of link between two entries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum LinkTag {
    /// Game entry to every move published for it.
    Moves,
    /// Parent (game or move) to the move built on it.
    NextMove,
}

/// Failure reported by the storage substrate.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum StoreError {
    /// The store could not be reached. The operation may be retried.
    #[display("Store unavailable: {}", _0)]
    Unavailable(String),

    /// An entry could not be encoded or decoded.
    #[display("Entry codec failure: {}", _0)]
    Codec(String),
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Returns true if retrying the same operation later can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Codec(err.to_string())
    }
}

/// Operations the game core needs from the storage substrate.
///
/// Entries are immutable: there is no update or delete. `get_links` must
/// return targets in the order the links were accepted, with duplicates
/// collapsed, so that every peer observes the same first successor.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Stores `entry` and returns its content hash. Publishing the same
    /// entry twice returns the same hash.
    async fn publish(&self, entry: Entry) -> Result<EntryHash, StoreError>;

    /// Links `target` from `base` under `tag`.
    async fn link(
        &self,
        base: &EntryHash,
        target: &EntryHash,
        tag: LinkTag,
    ) -> Result<(), StoreError>;

    /// Lists the targets linked from `base` under `tag`, in acceptance order.
    async fn get_links(&self, base: &EntryHash, tag: LinkTag)
    -> Result<Vec<EntryHash>, StoreError>;

    /// Fetches an entry. `None` if this peer has not seen it.
    async fn get_entry(&self, hash: &EntryHash) -> Result<Option<Entry>, StoreError>;
}
