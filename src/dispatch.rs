// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Sync Dispatcher
//!
//! Decides, per change set, whether index writes happen inline or are
//! deferred to the job queue. Change sets are split into chunks of at most
//! `chunk_size` records before either path runs:
//!
//! ```text
//! records ──→ chunks(≤ chunk_size)
//!                 │
//!                 ├─ suspended ──────────→ dropped (counted)
//!                 ├─ queue configured ───→ JobQueue.submit(SyncJob, name, connection)
//!                 └─ otherwise ──────────→ engine.update / engine.delete
//!                                                  │
//!                          EventSink ←─ progress (last key) per chunk
//! ```
//!
//! Queued jobs carry [`Projection`]s only, so an index override survives the
//! trip through the queue. Delivery is at-least-once; index and delete
//! actions are idempotent per document id, so replays are harmless.
//!
//! # Suspension
//!
//! [`SyncDispatcher::suspend`] returns a guard. While any guard is alive no
//! writes are dispatched. Guards nest and dispatch resumes once the last one
//! drops, on every exit path including errors and panics.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Map;
use tracing::debug;

use crate::bulk::BulkResponse;
use crate::config::SearchSyncConfig;
use crate::engine::SearchEngine;
use crate::error::SearchError;
use crate::metrics;
use crate::record::{Projection, Searchable, SearchableRecord};
use crate::storage::traits::{EventSink, JobQueue, NoopEvents};

/// Deferred index work. Serializable so any queue backend can carry it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum SyncJob {
    Update { documents: Vec<Projection> },
    Delete { documents: Vec<Projection> },
}

impl SyncJob {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn documents(&self) -> &[Projection] {
        match self {
            Self::Update { documents } | Self::Delete { documents } => documents,
        }
    }

    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    /// Worker-side handler: apply the job against `engine`.
    pub async fn run<E: SearchEngine>(&self, engine: &E) -> Result<BulkResponse, SearchError> {
        debug!(kind = self.kind(), documents = self.len(), "Running sync job");
        match self {
            Self::Update { documents } => engine.update(documents, None).await,
            Self::Delete { documents } => engine.delete(documents, None).await,
        }
    }
}

/// Progress notifications raised after each dispatched chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A chunk of records was dispatched for indexing.
    ImportProgress {
        index: String,
        last_key: String,
        count: usize,
    },
    /// A chunk of records was dispatched for removal.
    RemovalProgress {
        index: String,
        last_key: String,
        count: usize,
    },
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ImportProgress { .. } => "import_progress",
            Self::RemovalProgress { .. } => "removal_progress",
        }
    }

    pub fn last_key(&self) -> &str {
        match self {
            Self::ImportProgress { last_key, .. } | Self::RemovalProgress { last_key, .. } => last_key,
        }
    }
}

/// Path a change set took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// Written inline before the call returned
    #[default]
    Sync,
    /// Submitted to the job queue
    Queued,
    /// Dropped because syncing is suspended
    Suppressed,
}

impl DispatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Queued => "queued",
            Self::Suppressed => "suppressed",
        }
    }
}

/// Result of dispatching one change set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub mode: DispatchMode,
    /// Chunks written or submitted
    pub chunks: usize,
    /// Records covered by those chunks
    pub records: usize,
    /// Key of the last record dispatched
    pub last_key: Option<String>,
    /// Document ids the engine reported as failed (sync path only)
    pub failed: Vec<String>,
}

/// Scoped suspension of dispatch. Dropping the guard lifts it.
#[must_use = "syncing resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SyncSuspension {
    depth: Arc<AtomicUsize>,
}

impl Drop for SyncSuspension {
    fn drop(&mut self) {
        let previous = self.depth.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            debug!("Index syncing resumed");
        }
    }
}

/// Routes change sets to the inline or queued write path.
pub struct SyncDispatcher {
    chunk_size: usize,
    use_queue: bool,
    queue: Option<Arc<dyn JobQueue>>,
    queue_name: Option<String>,
    queue_connection: Option<String>,
    events: Arc<dyn EventSink>,
    suspended: Arc<AtomicUsize>,
}

impl SyncDispatcher {
    pub fn new(config: &SearchSyncConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            use_queue: config.queue,
            queue: None,
            queue_name: config.queue_name.clone(),
            queue_connection: config.queue_connection.clone(),
            events: Arc::new(NoopEvents),
            suspended: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wire the job queue used when queueing is enabled in configuration.
    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Wire the sink that receives per-chunk progress events.
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::SeqCst) > 0
    }

    /// Suspend dispatch until the returned guard (and any nested ones) drop.
    pub fn suspend(&self) -> SyncSuspension {
        if self.suspended.fetch_add(1, Ordering::SeqCst) == 0 {
            debug!("Index syncing suspended");
        }
        SyncSuspension {
            depth: Arc::clone(&self.suspended),
        }
    }

    /// Path the next change set will take.
    pub fn mode(&self) -> DispatchMode {
        if self.is_suspended() {
            DispatchMode::Suppressed
        } else if self.use_queue && self.queue.is_some() {
            DispatchMode::Queued
        } else {
            DispatchMode::Sync
        }
    }

    /// Index `records`, into `index_override` when given.
    pub async fn update<R, E>(
        &self,
        engine: &E,
        records: &[R],
        index_override: Option<&str>,
    ) -> Result<DispatchOutcome, SearchError>
    where
        R: Searchable,
        E: SearchEngine,
    {
        self.dispatch(engine, records, index_override, Action::Update).await
    }

    /// Remove `records` from the index, or from `index_override` when given.
    pub async fn delete<R, E>(
        &self,
        engine: &E,
        records: &[R],
        index_override: Option<&str>,
    ) -> Result<DispatchOutcome, SearchError>
    where
        R: Searchable,
        E: SearchEngine,
    {
        self.dispatch(engine, records, index_override, Action::Delete).await
    }

    async fn dispatch<R, E>(
        &self,
        engine: &E,
        records: &[R],
        index_override: Option<&str>,
        action: Action,
    ) -> Result<DispatchOutcome, SearchError>
    where
        R: Searchable,
        E: SearchEngine,
    {
        let mode = self.mode();
        let mut outcome = DispatchOutcome {
            mode,
            ..Default::default()
        };

        if records.is_empty() {
            return Ok(outcome);
        }

        if mode == DispatchMode::Suppressed {
            debug!(records = records.len(), "Syncing suspended; dropping change set");
            metrics::record_dispatch_suppressed();
            return Ok(outcome);
        }

        for chunk in records.chunks(self.chunk_size) {
            match mode {
                DispatchMode::Queued => self.submit(chunk, index_override, action).await?,
                _ => {
                    let response = Self::write(engine, chunk, index_override, action).await?;
                    outcome.failed.extend(response.failed);
                }
            }

            metrics::record_chunk_dispatched(mode.as_str());
            outcome.chunks += 1;
            outcome.records += chunk.len();
            if let Some(last) = chunk.last() {
                let last_key = last.search_key();
                let index = index_override
                    .map(str::to_string)
                    .unwrap_or_else(|| last.searchable_as());
                self.events.publish(action.progress(index, last_key.clone(), chunk.len()));
                outcome.last_key = Some(last_key);
            }
            debug!(
                mode = mode.as_str(),
                action = action.as_str(),
                records = chunk.len(),
                "Dispatched chunk"
            );
        }

        Ok(outcome)
    }

    async fn write<R, E>(
        engine: &E,
        chunk: &[R],
        index_override: Option<&str>,
        action: Action,
    ) -> Result<BulkResponse, SearchError>
    where
        R: Searchable,
        E: SearchEngine,
    {
        let batch: Vec<SearchableRecord<R>> = chunk
            .iter()
            .map(|record| match index_override {
                Some(index) => SearchableRecord::Projection(Projection::capture(record, Some(index))),
                None => SearchableRecord::Record(record.clone()),
            })
            .collect();

        match action {
            Action::Update => engine.update(&batch, None).await,
            Action::Delete => engine.delete(&batch, None).await,
        }
    }

    async fn submit<R: Searchable>(
        &self,
        chunk: &[R],
        index_override: Option<&str>,
        action: Action,
    ) -> Result<(), SearchError> {
        let Some(queue) = &self.queue else {
            return Ok(());
        };

        let job = match action {
            Action::Update => SyncJob::Update {
                documents: chunk
                    .iter()
                    .map(|record| Projection::capture(record, index_override))
                    .collect(),
            },
            Action::Delete => SyncJob::Delete {
                documents: chunk
                    .iter()
                    .map(|record| {
                        let index = index_override
                            .map(str::to_string)
                            .unwrap_or_else(|| record.searchable_as());
                        Projection::new(record.search_key(), index, Map::new())
                    })
                    .collect(),
            },
        };

        queue
            .submit(job, self.queue_name.as_deref(), self.queue_connection.as_deref())
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Update,
    Delete,
}

impl Action {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn progress(&self, index: String, last_key: String, count: usize) -> SyncEvent {
        match self {
            Self::Update => SyncEvent::ImportProgress { index, last_key, count },
            Self::Delete => SyncEvent::RemovalProgress { index, last_key, count },
        }
    }
}
