// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Result Reconciler
//!
//! Maps raw engine hits back to canonical records.
//!
//! ```text
//! hits [5, 2, 9] ──→ store.find_many([5, 2, 9]) ──→ {2, 5}
//!                                                     │
//!           walk hits in engine order ←───────────────┘
//!                     │
//!                     └─→ [record 5, record 2]   (9 is stale, dropped)
//! ```
//!
//! Hits from a virtual index (one that is not the record type's own table)
//! are returned as their source payloads and the store is never queried.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::SearchError;
use crate::metrics;
use crate::record::Searchable;
use crate::storage::traits::RecordStore;

/// One raw engine hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_source", default)]
    pub source: Value,
    #[serde(rename = "_score", default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Hit {
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            source,
            score: None,
        }
    }
}

/// Hits plus the engine-reported total match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResults {
    pub total: u64,
    pub hits: Vec<Hit>,
}

impl RawResults {
    pub fn new(total: u64, hits: Vec<Hit>) -> Self {
        Self { total, hits }
    }

    /// Parse an engine search response (`hits.total` as a number or as `{"value": n}`).
    pub fn from_response(response: Value) -> Result<Self, SearchError> {
        let Some(hits) = response.get("hits") else {
            return Err(SearchError::Response("missing `hits`".into()));
        };

        let total = match hits.get("total") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::Object(total)) => total.get("value").and_then(Value::as_u64),
            _ => None,
        }
        .ok_or_else(|| SearchError::Response("missing `hits.total`".into()))?;

        let hits = match hits.get("hits") {
            Some(list) => serde_json::from_value(list.clone())?,
            None => Vec::new(),
        };

        Ok(Self { total, hits })
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hit ids in hit order.
    pub fn keys(&self) -> Vec<String> {
        self.hits.iter().map(|hit| hit.id.clone()).collect()
    }
}

/// A reconciled result: a canonical record, or a virtual-index document.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchItem<R> {
    Record(R),
    Document { id: String, source: Value },
}

impl<R> SearchItem<R> {
    pub fn record(&self) -> Option<&R> {
        match self {
            Self::Record(record) => Some(record),
            Self::Document { .. } => None,
        }
    }

    pub fn into_record(self) -> Option<R> {
        match self {
            Self::Record(record) => Some(record),
            Self::Document { .. } => None,
        }
    }
}

/// One page of reconciled results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub per_page: usize,
    pub page: usize,
    pub page_count: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, per_page: usize, page: usize) -> Self {
        Self {
            items,
            total,
            per_page,
            page,
            page_count: page_count(total, per_page),
        }
    }
}

/// `ceil(total / per_page)`; zero when `per_page` is zero.
pub fn page_count(total: u64, per_page: usize) -> u64 {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page as u64)
}

/// Whether `index` holds documents that are not backed by `R`'s table.
pub fn is_virtual_index<R: Searchable>(index: &str) -> bool {
    index != R::table()
}

/// Map raw hits to records, keeping hit order and dropping stale hits.
pub async fn reconcile<R, S>(
    results: &RawResults,
    index: &str,
    store: &S,
) -> Result<Vec<SearchItem<R>>, SearchError>
where
    R: Searchable,
    S: RecordStore<R> + ?Sized,
{
    if results.is_empty() {
        return Ok(Vec::new());
    }

    if is_virtual_index::<R>(index) {
        return Ok(results
            .hits
            .iter()
            .map(|hit| SearchItem::Document {
                id: hit.id.clone(),
                source: hit.source.clone(),
            })
            .collect());
    }

    let keys = results.keys();
    let by_key: HashMap<String, R> = store
        .find_many(&keys)
        .await?
        .into_iter()
        .map(|record| (record.search_key(), record))
        .collect();

    let mut items = Vec::with_capacity(keys.len());
    let mut stale = 0usize;
    for key in &keys {
        match by_key.get(key) {
            Some(record) => items.push(SearchItem::Record(record.clone())),
            None => stale += 1,
        }
    }

    if stale > 0 {
        debug!(index = %index, stale, "Dropped hits with no backing record");
        metrics::record_stale_hits(index, stale);
    }

    Ok(items)
}
