// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Caller-facing search and sync operations for one record type.
//!
//! [`IndexSync`] binds a record type to its engine and backing store. The
//! bindings are passed in, never looked up from process state.
//!
//! # Architecture
//!
//! ```text
//! read:   SearchBuilder ─→ engine.search ─→ reconcile(store) ─→ get / first / keys / paginate
//!
//! write:  searchable(records) ──────┐
//!         unsearchable(records) ────┼─→ SyncDispatcher ─→ engine bulk │ JobQueue
//!         make_all_searchable() ────┤        (chunked, suspendable)
//!         remove_all_from_search() ─┘
//!                                    │
//!                                    └─→ EventSink: progress per chunk
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use search_sync::{IndexSync, NullEngine, SearchBuilder, SearchSyncConfig, Searchable};
//! # use search_sync::storage::memory::MemoryRecordStore;
//! # async fn example<R: Searchable>(store: Arc<MemoryRecordStore<R>>) -> Result<(), search_sync::SearchError> {
//! let config = SearchSyncConfig::default();
//! let sync: IndexSync<R, _, _> = IndexSync::new(Arc::new(NullEngine::new(&config)), store, &config);
//!
//! let page = sync
//!     .paginate(&SearchBuilder::new("red shoes").where_op("price", "<", 100), 10, 1)
//!     .await?;
//! println!("{} of {}", page.items.len(), page.total);
//! # Ok(())
//! # }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::SearchSyncConfig;
use crate::dispatch::{DispatchMode, DispatchOutcome, SyncDispatcher, SyncSuspension};
use crate::engine::SearchEngine;
use crate::error::SearchError;
use crate::metrics::{self, LatencyTimer};
use crate::record::Searchable;
use crate::search::{Page, PageRequest, RawResults, SearchBuilder, SearchItem};
use crate::storage::traits::{EventSink, JobQueue, RecordStore};

/// Search and sync operations for record type `R`.
pub struct IndexSync<R, S, E> {
    engine: Arc<E>,
    store: Arc<S>,
    dispatcher: SyncDispatcher,
    _record: PhantomData<fn() -> R>,
}

impl<R, S, E> IndexSync<R, S, E>
where
    R: Searchable,
    S: RecordStore<R>,
    E: SearchEngine,
{
    pub fn new(engine: Arc<E>, store: Arc<S>, config: &SearchSyncConfig) -> Self {
        Self {
            engine,
            store,
            dispatcher: SyncDispatcher::new(config),
            _record: PhantomData,
        }
    }

    /// Wire a job queue. Writes go through it when `config.queue` is set.
    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.dispatcher = self.dispatcher.with_queue(queue);
        self
    }

    /// Wire the sink that receives a progress event per dispatched chunk.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.dispatcher = self.dispatcher.with_events(events);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dispatcher(&self) -> &SyncDispatcher {
        &self.dispatcher
    }

    fn resolve_index(builder: &SearchBuilder) -> String {
        builder
            .index()
            .map(str::to_string)
            .unwrap_or_else(R::default_index)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Read
    // ═══════════════════════════════════════════════════════════════════════════

    /// Execute the search and return the engine's results untouched.
    pub async fn raw(&self, builder: &SearchBuilder) -> Result<RawResults, SearchError> {
        let index = Self::resolve_index(builder);
        self.engine.search(builder, &index, None).await
    }

    /// Matching records in relevance order. Stale hits are dropped.
    pub async fn get(&self, builder: &SearchBuilder) -> Result<Vec<SearchItem<R>>, SearchError> {
        let index = Self::resolve_index(builder);
        let results = self.engine.search(builder, &index, None).await?;
        self.engine.reconcile(&results, &index, self.store.as_ref()).await
    }

    /// First matching record, if any.
    pub async fn first(&self, builder: &SearchBuilder) -> Result<Option<SearchItem<R>>, SearchError> {
        Ok(self.get(builder).await?.into_iter().next())
    }

    /// Hit ids in relevance order. The store is not consulted.
    pub async fn keys(&self, builder: &SearchBuilder) -> Result<Vec<String>, SearchError> {
        Ok(self.raw(builder).await?.keys())
    }

    /// One page of results. `page` is 1-indexed.
    pub async fn paginate(
        &self,
        builder: &SearchBuilder,
        per_page: usize,
        page: usize,
    ) -> Result<Page<SearchItem<R>>, SearchError> {
        let request = PageRequest::new(per_page, page)?;
        let index = Self::resolve_index(builder);

        let results = self.engine.search(builder, &index, Some(request)).await?;
        let items = self.engine.reconcile(&results, &index, self.store.as_ref()).await?;

        debug!(index = %index, page, per_page, total = results.total, "Paginated search");
        Ok(Page::new(items, results.total, per_page, page))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Record-level sync
    // ═══════════════════════════════════════════════════════════════════════════

    /// Index `records` in their own index.
    pub async fn searchable(&self, records: &[R]) -> Result<DispatchOutcome, SearchError> {
        self.dispatcher.update(self.engine.as_ref(), records, None).await
    }

    /// Index `records` into `index` instead of their own.
    pub async fn searchable_into(&self, records: &[R], index: &str) -> Result<DispatchOutcome, SearchError> {
        self.dispatcher.update(self.engine.as_ref(), records, Some(index)).await
    }

    /// Remove `records` from their index.
    pub async fn unsearchable(&self, records: &[R]) -> Result<DispatchOutcome, SearchError> {
        self.dispatcher.delete(self.engine.as_ref(), records, None).await
    }

    /// Suspend syncing until the returned guard drops.
    ///
    /// ```rust,ignore
    /// let _paused = sync.without_syncing();
    /// store.bulk_load(records); // nothing reaches the index
    /// ```
    pub fn without_syncing(&self) -> SyncSuspension {
        self.dispatcher.suspend()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Table-level sync
    // ═══════════════════════════════════════════════════════════════════════════

    /// Walk the whole store in key order and index every record.
    ///
    /// Returns the number of records dispatched. The walk stops early if
    /// syncing is suspended while it runs.
    pub async fn make_all_searchable(&self) -> Result<usize, SearchError> {
        let _timer = LatencyTimer::new("import");
        let index = R::default_index();
        let dispatch = |chunk: Vec<R>| async move {
            self.dispatcher.update(self.engine.as_ref(), &chunk, None).await
        };
        let count = self.for_each_chunk(dispatch).await?;

        info!(index = %index, records = count, "Import complete");
        Ok(count)
    }

    /// Walk the whole store in key order and remove every record from the
    /// index.
    pub async fn remove_all_from_search(&self) -> Result<usize, SearchError> {
        let _timer = LatencyTimer::new("removal");
        let index = R::default_index();
        let dispatch = |chunk: Vec<R>| async move {
            self.dispatcher.delete(self.engine.as_ref(), &chunk, None).await
        };
        let count = self.for_each_chunk(dispatch).await?;

        info!(index = %index, records = count, "Removal complete");
        Ok(count)
    }

    async fn for_each_chunk<F, Fut>(&self, mut dispatch: F) -> Result<usize, SearchError>
    where
        F: FnMut(Vec<R>) -> Fut,
        Fut: std::future::Future<Output = Result<DispatchOutcome, SearchError>>,
    {
        if self.dispatcher.is_suspended() {
            debug!(index = %R::default_index(), "Syncing suspended; skipping table walk");
            metrics::record_dispatch_suppressed();
            return Ok(0);
        }

        let limit = self.dispatcher.chunk_size();
        let mut after: Option<String> = None;
        let mut total = 0usize;

        loop {
            let chunk = self.store.chunk_after(after.as_deref(), limit).await?;
            let Some(last) = chunk.last() else {
                break;
            };
            let last_key = last.search_key();
            let size = chunk.len();

            let outcome = dispatch(chunk).await?;
            if outcome.mode == DispatchMode::Suppressed {
                debug!(index = %R::default_index(), records = total, "Syncing suspended; stopping table walk");
                break;
            }
            total += outcome.records;

            if size < limit {
                break;
            }
            after = Some(last_key);
        }

        Ok(total)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Settings
    // ═══════════════════════════════════════════════════════════════════════════

    /// Apply index settings to the record type's default index.
    ///
    /// Closes, updates and reopens the index. The sequence is not
    /// transactional: a failure after the close leaves the index closed.
    pub async fn apply_settings(&self) -> Result<(), SearchError> {
        self.engine.apply_settings(&R::default_index()).await
    }
}
