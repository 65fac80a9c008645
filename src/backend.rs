//! Pluggable map backends for a [`Collection`](crate::Collection).
//!
//! Implement [`DocumentBackend`] to bring your own concurrent map. Maps don't
//! keep insertion order, so every stored [`Entry`] carries a sequence number
//! and the collection sorts by it when it needs storage order.

use crate::document::Document;
use std::collections::HashMap;

/// A document plus its position in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Monotonic position; lower comes first.
    pub seq: u64,
    /// The stored record.
    pub doc: Document,
}

/// Trait that a concurrent map keyed by document id must satisfy.
///
/// Every method works with owned entries so the collection API stays uniform
/// regardless of how the backend stores things internally. Backends that keep
/// values behind an `Arc` (like ShardMap) clone on read.
pub trait DocumentBackend: Send + Sync {
    /// Store `entry` under `id`, returning the previous entry if any.
    fn put(&self, id: String, entry: Entry) -> Option<Entry>;

    /// Look up an entry by id.
    fn get(&self, id: &str) -> Option<Entry>;

    /// Remove an id, returning its entry if it was present.
    fn remove(&self, id: &str) -> Option<Entry>;

    /// Copy of every entry, in whatever order the map iterates. Must not hold
    /// locks after returning.
    fn snapshot(&self) -> Vec<(String, Entry)>;

    /// Number of entries.
    fn count(&self) -> usize;

    /// Check if an id exists. Override when the backend can skip the clone.
    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Drop all entries. The default removes one id at a time; override with
    /// the backend's native clear when available.
    fn clear(&self) {
        for (id, _) in self.snapshot() {
            self.remove(&id);
        }
    }
}

// ---- ShardMap ----------------------------------------------------------------

// ShardMap lookups take `&K`, hence the `to_owned` on the way in.
impl DocumentBackend for shardmap::ShardMap<String, Entry> {
    fn put(&self, id: String, entry: Entry) -> Option<Entry> {
        shardmap::ShardMap::insert(self, id, entry).map(|arc| (*arc).clone())
    }

    fn get(&self, id: &str) -> Option<Entry> {
        shardmap::ShardMap::get(self, &id.to_owned()).map(|arc| (*arc).clone())
    }

    fn remove(&self, id: &str) -> Option<Entry> {
        shardmap::ShardMap::remove(self, &id.to_owned()).map(|arc| (*arc).clone())
    }

    fn snapshot(&self) -> Vec<(String, Entry)> {
        shardmap::ShardMap::iter_snapshot(self)
            .map(|(id, arc)| (id, (*arc).clone()))
            .collect()
    }

    fn count(&self) -> usize {
        shardmap::ShardMap::len(self)
    }

    // get() hands back an Arc, so this is a refcount bump rather than a clone.
    fn contains(&self, id: &str) -> bool {
        shardmap::ShardMap::get(self, &id.to_owned()).is_some()
    }
}

// ---- RwLock<HashMap> ---------------------------------------------------------

impl DocumentBackend for parking_lot::RwLock<HashMap<String, Entry>> {
    fn put(&self, id: String, entry: Entry) -> Option<Entry> {
        self.write().insert(id, entry)
    }

    fn get(&self, id: &str) -> Option<Entry> {
        self.read().get(id).cloned()
    }

    fn remove(&self, id: &str) -> Option<Entry> {
        self.write().remove(id)
    }

    fn snapshot(&self) -> Vec<(String, Entry)> {
        self.read()
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect()
    }

    fn count(&self) -> usize {
        self.read().len()
    }

    fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    fn clear(&self) {
        self.write().clear()
    }
}

// ---- DashMap (feature-gated) -------------------------------------------------

#[cfg(feature = "dashmap")]
impl DocumentBackend for dashmap::DashMap<String, Entry> {
    fn put(&self, id: String, entry: Entry) -> Option<Entry> {
        dashmap::DashMap::insert(self, id, entry)
    }

    fn get(&self, id: &str) -> Option<Entry> {
        dashmap::DashMap::get(self, id).map(|r| r.value().clone())
    }

    fn remove(&self, id: &str) -> Option<Entry> {
        dashmap::DashMap::remove(self, id).map(|(_, entry)| entry)
    }

    fn snapshot(&self) -> Vec<(String, Entry)> {
        self.iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect()
    }

    fn count(&self) -> usize {
        dashmap::DashMap::len(self)
    }

    fn contains(&self, id: &str) -> bool {
        dashmap::DashMap::contains_key(self, id)
    }

    fn clear(&self) {
        dashmap::DashMap::clear(self)
    }
}
