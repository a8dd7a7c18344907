use crate::domain::features::{FeatureMap, FeatureTuple};
use crate::error::Result;
use dashmap::DashMap;
use sled::Db;
use std::path::Path;

/// Corpus-wide document frequency of feature tuples: in how many files each one appears.
/// Implementations must be thread-safe (Send + Sync).
pub trait FeatureStore: Send + Sync {
    /// Record one file. Each distinct tuple counts once, however often the file emitted it.
    fn record_file(&self, features: &FeatureMap) -> Result<()>;
    fn document_frequency(&self, tuple: &FeatureTuple) -> Option<u64>;
    /// All tuples with their counts, most frequent first.
    fn snapshot(&self) -> Result<Vec<(FeatureTuple, u64)>>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sort_snapshot(entries: &mut [(FeatureTuple, u64)]) {
    entries.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| a.0.context.cmp(&b.0.context))
            .then_with(|| a.0.value.to_string().cmp(&b.0.value.to_string()))
    });
}

// ============================================================================
// MemoryFeatureStore - in-memory counts using DashMap
// ============================================================================

#[derive(Default)]
pub struct MemoryFeatureStore {
    pub counts: DashMap<FeatureTuple, u64>,
}

impl FeatureStore for MemoryFeatureStore {
    fn record_file(&self, features: &FeatureMap) -> Result<()> {
        for tuple in features.tuples() {
            *self.counts.entry(tuple.clone()).or_insert(0) += 1;
        }
        Ok(())
    }

    fn document_frequency(&self, tuple: &FeatureTuple) -> Option<u64> {
        self.counts.get(tuple).map(|r| *r)
    }

    fn snapshot(&self) -> Result<Vec<(FeatureTuple, u64)>> {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect();
        sort_snapshot(&mut entries);
        Ok(entries)
    }

    fn len(&self) -> usize {
        self.counts.len()
    }
}

// ============================================================================
// DiskFeatureStore - persistent counts using sled, one tree per corpus label
// ============================================================================

pub struct DiskFeatureStore {
    db: Db,
    counts_tree: sled::Tree,
}

impl DiskFeatureStore {
    /// Open (or create) the store at `path`; counts for `label` accumulate across runs.
    pub fn open(path: &Path, label: &str) -> Result<Self> {
        let db = sled::open(path)?;
        let counts_tree = db.open_tree(format!("_all_features_{}", label))?;
        Ok(Self { db, counts_tree })
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn decode_count(bytes: &[u8]) -> u64 {
        <[u8; 8]>::try_from(bytes).map(u64::from_be_bytes).unwrap_or(0)
    }
}

impl FeatureStore for DiskFeatureStore {
    fn record_file(&self, features: &FeatureMap) -> Result<()> {
        for tuple in features.tuples() {
            let key = bincode::serialize(tuple)?;
            self.counts_tree.update_and_fetch(key, |old| {
                let next = old.map(Self::decode_count).unwrap_or(0) + 1;
                Some(next.to_be_bytes().to_vec())
            })?;
        }
        Ok(())
    }

    fn document_frequency(&self, tuple: &FeatureTuple) -> Option<u64> {
        let key = bincode::serialize(tuple).ok()?;
        self.counts_tree
            .get(key)
            .ok()
            .flatten()
            .map(|bytes| Self::decode_count(&bytes))
    }

    fn snapshot(&self) -> Result<Vec<(FeatureTuple, u64)>> {
        let mut entries = Vec::with_capacity(self.counts_tree.len());
        for item in self.counts_tree.iter() {
            let (key, value) = item?;
            let tuple: FeatureTuple = bincode::deserialize(&key)?;
            entries.push((tuple, Self::decode_count(&value)));
        }
        sort_snapshot(&mut entries);
        Ok(entries)
    }

    fn len(&self) -> usize {
        self.counts_tree.len()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
