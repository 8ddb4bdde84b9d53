// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for search-sync.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `search_sync_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: engine, raw
//! - `action`: index, delete
//! - `mode`: sync, queued
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a search query outcome
pub fn record_search_query(kind: &str, status: &str) {
    counter!(
        "search_sync_search_queries_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record search latency
pub fn record_search_latency(duration: Duration) {
    histogram!("search_sync_search_seconds").record(duration.as_secs_f64());
}

/// Record hits returned per search
pub fn record_search_results(count: usize) {
    histogram!("search_sync_search_results").record(count as f64);
}

/// Record hits dropped because the store no longer has the record
pub fn record_stale_hits(index: &str, count: usize) {
    counter!(
        "search_sync_stale_hits_total",
        "index" => index.to_string()
    )
    .increment(count as u64);
}

/// Record one bulk operation by action
pub fn record_bulk_operation(action: &str) {
    counter!(
        "search_sync_bulk_operations_total",
        "action" => action.to_string()
    )
    .increment(1);
}

/// Record records skipped because their projection was empty
pub fn record_skipped_projections(count: usize) {
    counter!("search_sync_skipped_projections_total").increment(count as u64);
}

/// Record a chunk handed to the sync or queued path
pub fn record_chunk_dispatched(mode: &str) {
    counter!(
        "search_sync_chunks_dispatched_total",
        "mode" => mode.to_string()
    )
    .increment(1);
}

/// Record a dispatch skipped while syncing is suspended
pub fn record_dispatch_suppressed() {
    counter!("search_sync_dispatch_suppressed_total").increment(1);
}

/// Record a step of the settings-apply sequence
pub fn record_settings_operation(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(
        "search_sync_settings_operations_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record duration of a table-level operation (import, removal)
pub fn record_table_operation(operation: &str, duration: Duration) {
    histogram!(
        "search_sync_table_operation_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// A timing guard that records table-operation latency on drop
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_table_operation(self.operation, self.start.elapsed());
    }
}
