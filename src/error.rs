// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types.
//!
//! Engine-side failures are wrapped in [`SearchError::Client`] and handed
//! back as-is. Nothing in this crate retries them; retry policy for deferred
//! writes belongs to the job queue.

use thiserror::Error;

/// Failure reported by the search client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Search transport error: {0}")]
    Transport(String),
    #[error("Search engine rejected request ({status}): {reason}")]
    Rejected { status: u16, reason: String },
    #[error("Malformed search request: {0}")]
    Malformed(String),
}

/// Failure reported by the backing record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record store error: {0}")]
    Backend(String),
}

/// Failure submitting a deferred job.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Job submission failed: {0}")]
    Submit(String),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("Page numbers start at 1, got {page}")]
    InvalidPage { page: usize },
    #[error("Page size must be at least 1")]
    InvalidPerPage,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unexpected search response: {0}")]
    Response(String),
}
