// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for search synchronization.
//!
//! # Example
//!
//! ```
//! use search_sync::{SearchSyncConfig, EngineKind};
//!
//! // Minimal config (uses defaults)
//! let config = SearchSyncConfig::default();
//! assert_eq!(config.chunk_size, 500);
//! assert_eq!(config.engine, EngineKind::Elasticsearch);
//!
//! // Deferred writes through a named queue
//! let config = SearchSyncConfig {
//!     queue: true,
//!     queue_name: Some("search".into()),
//!     chunk_size: 250,
//!     ..Default::default()
//! };
//! assert!(config.queue);
//! ```

use serde::Deserialize;

/// Which engine variant backs the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Elasticsearch-compatible engine reached through a [`crate::SearchClient`]
    #[default]
    Elasticsearch,
    /// Discards writes and returns empty results
    Null,
}

/// Configuration for search synchronization.
///
/// All fields have defaults. Loading the values (files, environment) is left
/// to the host application.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSyncConfig {
    /// Engine variant
    #[serde(default)]
    pub engine: EngineKind,

    /// Maximum records per bulk request (default: 500)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Defer writes to the job queue instead of writing inline
    #[serde(default)]
    pub queue: bool,

    /// Queue name passed to the job queue
    #[serde(default)]
    pub queue_name: Option<String>,

    /// Queue connection passed to the job queue
    #[serde(default)]
    pub queue_connection: Option<String>,

    /// Result size used when a search sets no limit (default: 10000)
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Ask the engine to make bulk writes visible immediately
    #[serde(default = "default_refresh")]
    pub refresh: bool,

    /// Value written to `index.mapping.ignore_malformed` by settings apply
    #[serde(default = "default_ignore_malformed")]
    pub ignore_malformed: bool,
}

fn default_chunk_size() -> usize { 500 }
fn default_max_results() -> usize { 10_000 }
fn default_refresh() -> bool { true }
fn default_ignore_malformed() -> bool { true }

impl Default for SearchSyncConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            chunk_size: default_chunk_size(),
            queue: false,
            queue_name: None,
            queue_connection: None,
            max_results: default_max_results(),
            refresh: default_refresh(),
            ignore_malformed: default_ignore_malformed(),
        }
    }
}
