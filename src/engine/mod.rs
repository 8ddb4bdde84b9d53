// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search engine backends.
//!
//! [`SearchEngine`] is the single contract the rest of the crate talks to:
//! compile a query, execute it, write bulk operations, reconcile hits and
//! apply index settings. Backends are variants behind that contract, picked
//! from configuration through [`AnyEngine`]:
//!
//! - [`ElasticEngine`]: Elasticsearch-compatible engine over a [`SearchClient`]
//! - [`NullEngine`]: accepts writes, stores nothing, finds nothing

mod client;
mod elastic;
mod null;
#[cfg(test)]
pub(crate) mod test_support;

pub use client::SearchClient;
pub use elastic::ElasticEngine;
pub use null::NullEngine;

use std::sync::Arc;

use async_trait::async_trait;

use crate::bulk::{BulkOperation, BulkResponse, BulkWriter, IndexTarget};
use crate::config::{EngineKind, SearchSyncConfig};
use crate::error::SearchError;
use crate::record::Searchable;
use crate::search::{self, PageRequest, RawResults, SearchBuilder, SearchItem, WireQuery};
use crate::storage::traits::RecordStore;

/// Capability interface implemented by every engine variant.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Compile a builder into the wire query this engine would send.
    fn compile_query(&self, builder: &SearchBuilder, page: Option<PageRequest>) -> WireQuery;

    /// Run a search against `index`. A raw hook on the builder replaces the
    /// standard call and its results are returned unchanged.
    async fn search(
        &self,
        builder: &SearchBuilder,
        index: &str,
        page: Option<PageRequest>,
    ) -> Result<RawResults, SearchError>;

    /// Submit operations as one bulk call.
    async fn bulk_write(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse, SearchError>;

    /// Close the index, update malformed-field tolerance, reopen it.
    async fn apply_settings(&self, index: &str) -> Result<(), SearchError>;

    /// Index a batch. Empty batches (or batches of empty projections) make no call.
    async fn update<T>(&self, records: &[T], index_override: Option<&str>) -> Result<BulkResponse, SearchError>
    where
        T: IndexTarget + Sync,
    {
        let operations = BulkWriter::update(records, index_override);
        if operations.is_empty() {
            return Ok(BulkResponse::default());
        }
        self.bulk_write(operations).await
    }

    /// Remove a batch from the index. Empty batches make no call.
    async fn delete<T>(&self, records: &[T], index_override: Option<&str>) -> Result<BulkResponse, SearchError>
    where
        T: IndexTarget + Sync,
    {
        let operations = BulkWriter::delete(records, index_override);
        if operations.is_empty() {
            return Ok(BulkResponse::default());
        }
        self.bulk_write(operations).await
    }

    /// Map raw hits back to records from `store`.
    async fn reconcile<R, S>(
        &self,
        results: &RawResults,
        index: &str,
        store: &S,
    ) -> Result<Vec<SearchItem<R>>, SearchError>
    where
        R: Searchable,
        S: RecordStore<R> + ?Sized,
    {
        search::reconcile(results, index, store).await
    }
}

/// Engine variant selected from [`SearchSyncConfig::engine`].
pub enum AnyEngine {
    Elastic(ElasticEngine),
    Null(NullEngine),
}

impl AnyEngine {
    pub fn from_config(config: &SearchSyncConfig, client: Arc<dyn SearchClient>) -> Self {
        match config.engine {
            EngineKind::Elasticsearch => Self::Elastic(ElasticEngine::new(client, config)),
            EngineKind::Null => Self::Null(NullEngine::new(config)),
        }
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            Self::Elastic(_) => EngineKind::Elasticsearch,
            Self::Null(_) => EngineKind::Null,
        }
    }
}

#[async_trait]
impl SearchEngine for AnyEngine {
    fn compile_query(&self, builder: &SearchBuilder, page: Option<PageRequest>) -> WireQuery {
        match self {
            Self::Elastic(engine) => engine.compile_query(builder, page),
            Self::Null(engine) => engine.compile_query(builder, page),
        }
    }

    async fn search(
        &self,
        builder: &SearchBuilder,
        index: &str,
        page: Option<PageRequest>,
    ) -> Result<RawResults, SearchError> {
        match self {
            Self::Elastic(engine) => engine.search(builder, index, page).await,
            Self::Null(engine) => engine.search(builder, index, page).await,
        }
    }

    async fn bulk_write(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse, SearchError> {
        match self {
            Self::Elastic(engine) => engine.bulk_write(operations).await,
            Self::Null(engine) => engine.bulk_write(operations).await,
        }
    }

    async fn apply_settings(&self, index: &str) -> Result<(), SearchError> {
        match self {
            Self::Elastic(engine) => engine.apply_settings(index).await,
            Self::Null(engine) => engine.apply_settings(index).await,
        }
    }
}
