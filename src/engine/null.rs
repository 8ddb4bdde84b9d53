// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use tracing::debug;

use super::SearchEngine;
use crate::bulk::{BulkOperation, BulkResponse};
use crate::config::SearchSyncConfig;
use crate::error::SearchError;
use crate::search::{PageRequest, QueryCompiler, RawResults, SearchBuilder, WireQuery};

/// Engine that drops writes and finds nothing. Useful where indexing is
/// disabled but call sites stay the same.
#[derive(Debug, Clone)]
pub struct NullEngine {
    max_results: usize,
}

impl NullEngine {
    pub fn new(config: &SearchSyncConfig) -> Self {
        Self {
            max_results: config.max_results,
        }
    }
}

impl Default for NullEngine {
    fn default() -> Self {
        Self::new(&SearchSyncConfig::default())
    }
}

#[async_trait]
impl SearchEngine for NullEngine {
    fn compile_query(&self, builder: &SearchBuilder, page: Option<PageRequest>) -> WireQuery {
        QueryCompiler::compile(builder, page, self.max_results)
    }

    async fn search(
        &self,
        _builder: &SearchBuilder,
        _index: &str,
        _page: Option<PageRequest>,
    ) -> Result<RawResults, SearchError> {
        Ok(RawResults::default())
    }

    async fn bulk_write(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse, SearchError> {
        debug!(operations = operations.len(), "Null engine discarding bulk request");
        Ok(BulkResponse::default())
    }

    async fn apply_settings(&self, _index: &str) -> Result<(), SearchError> {
        Ok(())
    }
}
