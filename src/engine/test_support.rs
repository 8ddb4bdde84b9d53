// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Recording client shared by unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::SearchClient;
use crate::bulk::{BulkRequest, BulkResponse};
use crate::error::ClientError;
use crate::search::{RawResults, SearchRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum ClientCall {
    Bulk(BulkRequest),
    Search(SearchRequest),
    Close(String),
    PutSettings(String, Value),
    Open(String),
}

/// Records every call and answers searches with a canned response.
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<ClientCall>>,
    response: Mutex<RawResults>,
    failure: Mutex<Option<(&'static str, ClientError)>>,
    failed_items: Mutex<Vec<String>>,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, results: RawResults) {
        *self.response.lock() = results;
    }

    /// Fail every call to `method` with `error`.
    pub fn fail_with(&self, method: &'static str, error: ClientError) {
        *self.failure.lock() = Some((method, error));
    }

    /// Report these document ids as failed items on every bulk call.
    pub fn fail_items(&self, ids: &[&str]) {
        *self.failed_items.lock() = ids.iter().map(|id| id.to_string()).collect();
    }

    pub fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().clone()
    }

    pub fn bulk_requests(&self) -> Vec<BulkRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ClientCall::Bulk(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ClientCall::Search(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn check(&self, method: &str) -> Result<(), ClientError> {
        match &*self.failure.lock() {
            Some((failing, error)) if *failing == method => Err(error.clone()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SearchClient for RecordingClient {
    async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse, ClientError> {
        self.check("bulk")?;
        self.calls.lock().push(ClientCall::Bulk(request.clone()));
        Ok(BulkResponse {
            items: request.len(),
            failed: self.failed_items.lock().clone(),
        })
    }

    async fn search(&self, request: &SearchRequest) -> Result<RawResults, ClientError> {
        self.check("search")?;
        self.calls.lock().push(ClientCall::Search(request.clone()));
        Ok(self.response.lock().clone())
    }

    async fn close_index(&self, index: &str) -> Result<(), ClientError> {
        self.check("close_index")?;
        self.calls.lock().push(ClientCall::Close(index.to_string()));
        Ok(())
    }

    async fn put_settings(&self, index: &str, settings: &Value) -> Result<(), ClientError> {
        self.check("put_settings")?;
        self.calls.lock().push(ClientCall::PutSettings(index.to_string(), settings.clone()));
        Ok(())
    }

    async fn open_index(&self, index: &str) -> Result<(), ClientError> {
        self.check("open_index")?;
        self.calls.lock().push(ClientCall::Open(index.to_string()));
        Ok(())
    }
}
