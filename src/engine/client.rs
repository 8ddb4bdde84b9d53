// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use serde_json::Value;

use crate::bulk::{BulkRequest, BulkResponse};
use crate::error::ClientError;
use crate::search::{RawResults, SearchRequest};

/// Search engine RPC client.
///
/// Transport and authentication are the implementor's concern. Every method
/// is a single request/response call; errors come back exactly as the
/// transport reports them.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Submit a bulk request as one call.
    async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse, ClientError>;

    /// Execute a compiled query against an index.
    async fn search(&self, request: &SearchRequest) -> Result<RawResults, ClientError>;

    async fn close_index(&self, index: &str) -> Result<(), ClientError>;

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<(), ClientError>;

    async fn open_index(&self, index: &str) -> Result<(), ClientError>;
}
