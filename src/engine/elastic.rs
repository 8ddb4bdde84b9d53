// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{SearchClient, SearchEngine};
use crate::bulk::{BulkOperation, BulkRequest, BulkResponse};
use crate::config::SearchSyncConfig;
use crate::error::SearchError;
use crate::metrics;
use crate::search::{IndexSettings, PageRequest, QueryCompiler, RawResults, SearchBuilder, SearchRequest, WireQuery};

/// Elasticsearch-compatible engine driven through a [`SearchClient`].
pub struct ElasticEngine {
    client: Arc<dyn SearchClient>,
    max_results: usize,
    refresh: bool,
    settings: IndexSettings,
}

impl ElasticEngine {
    pub fn new(client: Arc<dyn SearchClient>, config: &SearchSyncConfig) -> Self {
        Self {
            client,
            max_results: config.max_results,
            refresh: config.refresh,
            settings: IndexSettings::from_config(config),
        }
    }
}

#[async_trait]
impl SearchEngine for ElasticEngine {
    fn compile_query(&self, builder: &SearchBuilder, page: Option<PageRequest>) -> WireQuery {
        QueryCompiler::compile(builder, page, self.max_results)
    }

    async fn search(
        &self,
        builder: &SearchBuilder,
        index: &str,
        page: Option<PageRequest>,
    ) -> Result<RawResults, SearchError> {
        let start = Instant::now();
        let request = SearchRequest {
            index: index.to_string(),
            body: self.compile_query(builder, page),
        };
        debug!(index = %index, query = ?request.body, "Compiled search");

        let (kind, results) = match builder.raw_search() {
            Some(raw) => ("raw", raw.call(Arc::clone(&self.client), request).await),
            None => ("engine", self.client.search(&request).await.map_err(SearchError::from)),
        };

        match &results {
            Ok(results) => {
                metrics::record_search_query(kind, "success");
                metrics::record_search_results(results.hits.len());
            }
            Err(_) => metrics::record_search_query(kind, "error"),
        }
        metrics::record_search_latency(start.elapsed());
        results
    }

    async fn bulk_write(&self, operations: Vec<BulkOperation>) -> Result<BulkResponse, SearchError> {
        if operations.is_empty() {
            return Ok(BulkResponse::default());
        }

        let request = BulkRequest::new(operations, self.refresh);
        for operation in &request.operations {
            metrics::record_bulk_operation(operation.action());
        }
        debug!(operations = request.len(), refresh = request.refresh, "Submitting bulk request");

        let response = self.client.bulk(&request).await?;
        if response.has_errors() {
            warn!(
                failed = response.failed.len(),
                total = response.items,
                ids = ?response.failed,
                "Bulk request reported item failures"
            );
        }
        Ok(response)
    }

    async fn apply_settings(&self, index: &str) -> Result<(), SearchError> {
        let settings = self.settings.to_json();

        self.client.close_index(index).await.map_err(|e| {
            metrics::record_settings_operation("close", false);
            e
        })?;
        metrics::record_settings_operation("close", true);

        // From here on a failure leaves the index closed.
        if let Err(e) = self.client.put_settings(index, &settings).await {
            metrics::record_settings_operation("update", false);
            warn!(index = %index, error = %e, "Settings update failed; index left closed");
            return Err(e.into());
        }
        metrics::record_settings_operation("update", true);

        if let Err(e) = self.client.open_index(index).await {
            metrics::record_settings_operation("open", false);
            warn!(index = %index, error = %e, "Reopen failed; index left closed");
            return Err(e.into());
        }
        metrics::record_settings_operation("open", true);

        info!(index = %index, ignore_malformed = self.settings.ignore_malformed, "Index settings applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{ClientCall, RecordingClient};
    use crate::error::ClientError;
    use crate::record::test_support::Product;
    use crate::record::SearchableRecord;
    use crate::search::{Hit, RawSearchFuture};
    use serde_json::json;

    fn engine(client: &Arc<RecordingClient>) -> ElasticEngine {
        ElasticEngine::new(client.clone(), &SearchSyncConfig::default())
    }

    #[tokio::test]
    async fn test_update_submits_one_refreshing_bulk() {
        let client = Arc::new(RecordingClient::new());
        let records = vec![
            SearchableRecord::Record(Product::new(1, "one", 1.0)),
            SearchableRecord::Record(Product::new(2, "two", 2.0)),
        ];

        engine(&client).update(&records, None).await.unwrap();

        let bulks = client.bulk_requests();
        assert_eq!(bulks.len(), 1);
        assert!(bulks[0].refresh);
        assert_eq!(bulks[0].len(), 2);
    }

    #[tokio::test]
    async fn test_update_of_empty_projections_makes_no_call() {
        let client = Arc::new(RecordingClient::new());
        let records = vec![SearchableRecord::Record(Product::new(1, "", 1.0))];

        let response = engine(&client).update(&records, None).await.unwrap();

        assert_eq!(response, BulkResponse::default());
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_sends_compiled_query() {
        let client = Arc::new(RecordingClient::new());
        client.respond_with(RawResults::new(1, vec![Hit::new("1", json!({}))]));

        let builder = SearchBuilder::new("").where_eq("brand_id", 3).take(5);
        let results = engine(&client).search(&builder, "products", None).await.unwrap();

        assert_eq!(results.total, 1);
        let searches = client.search_requests();
        assert_eq!(searches[0].index, "products");
        assert_eq!(searches[0].body.size, Some(5));
        assert_eq!(searches[0].body.bool_query().filter, vec![json!({"term": {"brand_id": 3}})]);
    }

    #[tokio::test]
    async fn test_raw_hook_replaces_standard_search() {
        let client = Arc::new(RecordingClient::new());
        let builder = SearchBuilder::new("boots").raw(|_client, request| -> RawSearchFuture {
            Box::pin(async move {
                Ok(RawResults::new(42, vec![Hit::new(request.index.clone(), json!({"raw": true}))]))
            })
        });

        let results = engine(&client).search(&builder, "products", None).await.unwrap();

        assert_eq!(results.total, 42);
        assert_eq!(results.hits[0].id, "products");
        assert!(client.search_requests().is_empty());
    }

    #[tokio::test]
    async fn test_client_errors_propagate_unchanged() {
        let client = Arc::new(RecordingClient::new());
        client.fail_with("search", ClientError::Rejected { status: 400, reason: "parse".into() });

        let err = engine(&client)
            .search(&SearchBuilder::new(""), "products", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SearchError::Client(ClientError::Rejected { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_settings_closes_updates_reopens() {
        let client = Arc::new(RecordingClient::new());
        engine(&client).apply_settings("products").await.unwrap();

        assert_eq!(
            client.calls(),
            vec![
                ClientCall::Close("products".into()),
                ClientCall::PutSettings("products".into(), json!({"index": {"mapping": {"ignore_malformed": true}}})),
                ClientCall::Open("products".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_settings_failure_leaves_index_closed() {
        let client = Arc::new(RecordingClient::new());
        client.fail_with("put_settings", ClientError::Transport("reset".into()));

        let err = engine(&client).apply_settings("products").await.unwrap_err();

        assert!(matches!(err, SearchError::Client(ClientError::Transport(_))));
        assert_eq!(client.calls(), vec![ClientCall::Close("products".into())]);
    }
}
