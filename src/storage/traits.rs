// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Collaborator seams: the backing record store, the job queue and the
//! notification channel. Each is consumed only through these traits.

use async_trait::async_trait;

use crate::dispatch::{SyncEvent, SyncJob};
use crate::error::{QueueError, StoreError};
use crate::record::Searchable;

/// Canonical record store the index is synchronized from.
#[async_trait]
pub trait RecordStore<R: Searchable>: Send + Sync {
    /// Fetch records by key in one batch. Missing keys are simply absent;
    /// result order is unspecified.
    async fn find_many(&self, keys: &[String]) -> Result<Vec<R>, StoreError>;

    /// Next chunk of at most `limit` records ordered by key, starting after
    /// `after` (from the beginning when `None`). Returns an empty vec when
    /// the set is exhausted.
    async fn chunk_after(&self, after: Option<&str>, limit: usize) -> Result<Vec<R>, StoreError>;
}

/// Deferred work queue. Delivery is at-least-once with no ordering
/// guarantee across jobs.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn submit(
        &self,
        job: SyncJob,
        queue: Option<&str>,
        connection: Option<&str>,
    ) -> Result<(), QueueError>;
}

/// Fire-and-forget notification channel.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: SyncEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEvents;

impl EventSink for NoopEvents {
    fn publish(&self, _event: SyncEvent) {}
}
