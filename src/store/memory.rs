//! In-memory content store.

use super::{ContentStore, LinkTag, StoreError};
use crate::entry::{Entry, EntryHash};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug, Default)]
struct Tables {
    entries: HashMap<EntryHash, Entry>,
    links: HashMap<(EntryHash, LinkTag), Vec<EntryHash>>,
}

/// Content store held in process memory.
///
/// Shared between peers through an `Arc`. Each operation takes the lock once,
/// so operations are individually atomic. [`MemoryStore::set_offline`]
/// simulates a substrate outage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with [`StoreError::Unavailable`] while set.
    #[instrument(skip(self))]
    pub fn set_offline(&self, offline: bool) {
        debug!(offline, "Toggling store availability");
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of distinct entries held.
    pub async fn len(&self) -> usize {
        self.tables.read().await.entries.len()
    }

    /// Returns true if nothing has been published.
    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.entries.is_empty()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    #[instrument(skip(self, entry), fields(kind = entry.kind()))]
    async fn publish(&self, entry: Entry) -> Result<EntryHash, StoreError> {
        self.ensure_online()?;
        let hash = entry.address()?;
        let mut tables = self.tables.write().await;
        tables.entries.entry(hash).or_insert(entry);
        debug!(hash = %hash.short(), "Entry published");
        Ok(hash)
    }

    #[instrument(skip(self), fields(base = %base.short(), target = %target.short()))]
    async fn link(
        &self,
        base: &EntryHash,
        target: &EntryHash,
        tag: LinkTag,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let targets = tables.links.entry((*base, tag)).or_default();
        if targets.contains(target) {
            debug!("Link already present");
        } else {
            targets.push(*target);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(base = %base.short()))]
    async fn get_links(
        &self,
        base: &EntryHash,
        tag: LinkTag,
    ) -> Result<Vec<EntryHash>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables.links.get(&(*base, tag)).cloned().unwrap_or_default())
    }

    #[instrument(skip(self), fields(hash = %hash.short()))]
    async fn get_entry(&self, hash: &EntryHash) -> Result<Option<Entry>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables.entries.get(hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::GameEntry;
    use connect_four_rules::BoardSize;

    fn game() -> Entry {
        GameEntry::new("alice".into(), "bob".into(), 0, BoardSize::STANDARD).into()
    }

    #[tokio::test]
    async fn test_publish_is_idempotent() {
        let store = MemoryStore::new();
        let a = store.publish(game()).await.unwrap();
        let b = store.publish(game()).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get_entry(&a).await.unwrap(), Some(game()));
    }

    #[tokio::test]
    async fn test_links_keep_order_and_collapse_duplicates() {
        let store = MemoryStore::new();
        let base = store.publish(game()).await.unwrap();
        let first = EntryHash::from_bytes([1; 32]);
        let second = EntryHash::from_bytes([2; 32]);

        store.link(&base, &second, LinkTag::NextMove).await.unwrap();
        store.link(&base, &first, LinkTag::NextMove).await.unwrap();
        store.link(&base, &second, LinkTag::NextMove).await.unwrap();

        let links = store.get_links(&base, LinkTag::NextMove).await.unwrap();
        assert_eq!(links, vec![second, first]);
        assert!(store.get_links(&base, LinkTag::Moves).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_entry_is_none() {
        let store = MemoryStore::new();
        let missing = EntryHash::from_bytes([9; 32]);
        assert_eq!(store.get_entry(&missing).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_offline_store_rejects_everything() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let err = store.publish(game()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(store.is_empty().await);

        store.set_offline(false);
        assert!(store.publish(game()).await.is_ok());
    }
}
