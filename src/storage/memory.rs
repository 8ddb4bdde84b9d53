// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::RecordStore;
use crate::error::StoreError;
use crate::record::Searchable;

/// In-memory record store keyed (and ordered) by search key.
pub struct MemoryRecordStore<R> {
    data: RwLock<BTreeMap<String, R>>,
}

impl<R: Searchable> MemoryRecordStore<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert or replace a record
    pub fn insert(&self, record: R) {
        self.data.write().insert(record.search_key(), record);
    }

    pub fn remove(&self, key: &str) -> Option<R> {
        self.data.write().remove(key)
    }

    /// Get current record count
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl<R: Searchable> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Searchable> FromIterator<R> for MemoryRecordStore<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

#[async_trait]
impl<R: Searchable> RecordStore<R> for MemoryRecordStore<R> {
    async fn find_many(&self, keys: &[String]) -> Result<Vec<R>, StoreError> {
        let data = self.data.read();
        Ok(keys.iter().filter_map(|key| data.get(key).cloned()).collect())
    }

    async fn chunk_after(&self, after: Option<&str>, limit: usize) -> Result<Vec<R>, StoreError> {
        let data = self.data.read();
        let records = match after {
            Some(after) => data
                .range::<str, _>((std::ops::Bound::Excluded(after), std::ops::Bound::Unbounded))
                .take(limit)
                .map(|(_, record)| record.clone())
                .collect(),
            None => data.values().take(limit).cloned().collect(),
        };
        Ok(records)
    }
}
