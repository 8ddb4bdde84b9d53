// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-process job queue.
//!
//! Jobs are serialized on submit and decoded when drained, the same trip a
//! payload makes through an external queue. Useful for tests and for hosts
//! that run the worker in the same process.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::traits::JobQueue;
use crate::dispatch::SyncJob;
use crate::engine::SearchEngine;
use crate::error::{QueueError, SearchError};

/// A submitted job with its routing.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedJob {
    pub payload: String,
    pub queue: Option<String>,
    pub connection: Option<String>,
}

impl QueuedJob {
    pub fn job(&self) -> Result<SyncJob, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

/// Unbounded in-memory queue backed by a tokio channel.
pub struct LocalQueue {
    sender: mpsc::UnboundedSender<QueuedJob>,
    receiver: Mutex<mpsc::UnboundedReceiver<QueuedJob>>,
}

impl LocalQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Take every job submitted so far.
    pub fn drain(&self) -> Vec<QueuedJob> {
        let mut receiver = self.receiver.lock();
        let mut jobs = Vec::new();
        while let Ok(job) = receiver.try_recv() {
            jobs.push(job);
        }
        jobs
    }

    /// Drain and run every pending job against `engine`, in submission order.
    /// Stops at the first failure; jobs not yet run are lost, as with any
    /// at-least-once queue whose worker crashed mid-batch.
    pub async fn run_pending<E: SearchEngine>(&self, engine: &E) -> Result<usize, SearchError> {
        let jobs = self.drain();
        let total = jobs.len();
        for queued in jobs {
            let job = queued.job()?;
            if let Err(e) = job.run(engine).await {
                warn!(kind = job.kind(), queue = ?queued.queue, error = %e, "Queued sync job failed");
                return Err(e);
            }
        }
        debug!(jobs = total, "Ran pending sync jobs");
        Ok(total)
    }
}

impl Default for LocalQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobQueue for LocalQueue {
    async fn submit(
        &self,
        job: SyncJob,
        queue: Option<&str>,
        connection: Option<&str>,
    ) -> Result<(), QueueError> {
        let payload = serde_json::to_string(&job).map_err(|e| QueueError::Submit(e.to_string()))?;
        self.sender
            .send(QueuedJob {
                payload,
                queue: queue.map(str::to_string),
                connection: connection.map(str::to_string),
            })
            .map_err(|e| QueueError::Submit(e.to_string()))
    }
}
