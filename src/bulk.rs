// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bulk write assembly.
//!
//! [`BulkWriter`] turns a batch of records into an ordered operation list.
//! Each record becomes one header, and for index actions the field map
//! follows its header directly:
//!
//! ```text
//! {"index":  {"_index": "products", "_id": "5"}}
//! {"title": "red shoes", "price": 40}
//! {"delete": {"_index": "products", "_id": "9"}}
//! ```
//!
//! Records whose projection is empty produce no operation. The whole list
//! goes out as one request with the refresh flag taken from configuration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::metrics;
use crate::record::{Projection, Searchable, SearchableRecord};

/// One bulk action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BulkOperation {
    Index {
        index: String,
        id: String,
        body: Map<String, Value>,
    },
    Delete {
        index: String,
        id: String,
    },
}

impl BulkOperation {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Index { .. } => "index",
            Self::Delete { .. } => "delete",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Index { id, .. } | Self::Delete { id, .. } => id,
        }
    }

    pub fn index(&self) -> &str {
        match self {
            Self::Index { index, .. } | Self::Delete { index, .. } => index,
        }
    }
}

/// A complete bulk request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkRequest {
    pub operations: Vec<BulkOperation>,
    /// Make the writes visible to searches as soon as the call returns
    pub refresh: bool,
}

impl BulkRequest {
    pub fn new(operations: Vec<BulkOperation>, refresh: bool) -> Self {
        Self { operations, refresh }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Header/body lines in request order.
    pub fn to_lines(&self) -> Vec<Value> {
        let mut lines = Vec::with_capacity(self.operations.len() * 2);
        for operation in &self.operations {
            lines.push(json!({
                operation.action(): { "_index": operation.index(), "_id": operation.id() }
            }));
            if let BulkOperation::Index { body, .. } = operation {
                lines.push(Value::Object(body.clone()));
            }
        }
        lines
    }

    /// Newline-delimited JSON body for the `_bulk` endpoint.
    pub fn to_ndjson(&self) -> Result<String, serde_json::Error> {
        let mut out = String::new();
        for line in self.to_lines() {
            out.push_str(&serde_json::to_string(&line)?);
            out.push('\n');
        }
        Ok(out)
    }
}

/// Outcome of a bulk call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkResponse {
    /// Operations the engine acknowledged
    pub items: usize,
    /// Ids of operations the engine reported as failed
    pub failed: Vec<String>,
}

impl BulkResponse {
    pub fn new(items: usize) -> Self {
        Self { items, failed: Vec::new() }
    }

    /// Read an engine `_bulk` response.
    pub fn from_response(response: &Value) -> Self {
        let items = response
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let failed = items
            .iter()
            .filter_map(|item| item.as_object()?.values().next())
            .filter(|result| result.get("error").is_some())
            .filter_map(|result| result.get("_id").and_then(Value::as_str).map(str::to_string))
            .collect();

        Self {
            items: items.len(),
            failed,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Common view over live records and captured projections.
pub trait IndexTarget {
    fn target_key(&self) -> String;
    fn target_index(&self) -> String;
    fn target_body(&self) -> Map<String, Value>;
}

impl<R: Searchable> IndexTarget for SearchableRecord<R> {
    fn target_key(&self) -> String {
        self.key()
    }

    fn target_index(&self) -> String {
        self.index()
    }

    fn target_body(&self) -> Map<String, Value> {
        self.body()
    }
}

impl IndexTarget for Projection {
    fn target_key(&self) -> String {
        self.key().to_string()
    }

    fn target_index(&self) -> String {
        self.index().to_string()
    }

    fn target_body(&self) -> Map<String, Value> {
        self.body().clone()
    }
}

/// Batch → operation list
pub struct BulkWriter;

impl BulkWriter {
    /// Index operations for every record with a non-empty projection, in
    /// input order.
    pub fn update<T: IndexTarget>(records: &[T], index_override: Option<&str>) -> Vec<BulkOperation> {
        let operations: Vec<BulkOperation> = records
            .iter()
            .filter_map(|record| {
                let body = record.target_body();
                if body.is_empty() {
                    return None;
                }
                Some(BulkOperation::Index {
                    index: Self::resolve_index(record, index_override),
                    id: record.target_key(),
                    body,
                })
            })
            .collect();

        let skipped = records.len() - operations.len();
        if skipped > 0 {
            debug!(skipped, "Skipping records with empty projections");
            metrics::record_skipped_projections(skipped);
        }
        operations
    }

    /// Delete operations, one per record, in input order.
    pub fn delete<T: IndexTarget>(records: &[T], index_override: Option<&str>) -> Vec<BulkOperation> {
        records
            .iter()
            .map(|record| BulkOperation::Delete {
                index: Self::resolve_index(record, index_override),
                id: record.target_key(),
            })
            .collect()
    }

    fn resolve_index<T: IndexTarget>(record: &T, index_override: Option<&str>) -> String {
        index_override
            .map(str::to_string)
            .unwrap_or_else(|| record.target_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_support::Product;

    fn records(products: Vec<Product>) -> Vec<SearchableRecord<Product>> {
        products.into_iter().map(SearchableRecord::Record).collect()
    }

    #[test]
    fn test_update_preserves_order() {
        let batch = records(vec![Product::new(5, "five", 5.0), Product::new(2, "two", 2.0)]);
        let ops = BulkWriter::update(&batch, None);

        let ids: Vec<&str> = ops.iter().map(BulkOperation::id).collect();
        assert_eq!(ids, vec!["5", "2"]);
        assert!(ops.iter().all(|op| op.index() == "products" && op.action() == "index"));
    }

    #[test]
    fn test_update_skips_empty_projection() {
        let batch = records(vec![Product::new(1, "", 1.0), Product::new(2, "two", 2.0)]);
        let ops = BulkWriter::update(&batch, None);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].id(), "2");
    }

    #[test]
    fn test_update_all_empty_yields_nothing() {
        let batch = records(vec![Product::new(1, "", 1.0), Product::new(2, "", 2.0)]);
        assert!(BulkWriter::update(&batch, None).is_empty());

        let empty: Vec<SearchableRecord<Product>> = Vec::new();
        assert!(BulkWriter::update(&empty, None).is_empty());
    }

    #[test]
    fn test_index_override_wins() {
        let batch = records(vec![Product::new(1, "one", 1.0)]);
        let ops = BulkWriter::update(&batch, Some("products_v2"));
        assert_eq!(ops[0].index(), "products_v2");

        let ops = BulkWriter::delete(&batch, Some("products_v2"));
        assert_eq!(ops[0].index(), "products_v2");
    }

    #[test]
    fn test_projection_keeps_captured_index() {
        let product = Product::new(4, "four", 4.0);
        let projections = vec![Projection::capture(&product, Some("archive"))];
        let ops = BulkWriter::update(&projections, None);
        assert_eq!(ops[0].index(), "archive");
        assert_eq!(ops[0].id(), "4");
    }

    #[test]
    fn test_lines_pair_headers_and_bodies() {
        let batch = records(vec![Product::new(1, "one", 1.0)]);
        let mut operations = BulkWriter::update(&batch, None);
        operations.extend(BulkWriter::delete(&records(vec![Product::new(9, "nine", 9.0)]), None));
        let request = BulkRequest::new(operations, true);

        let lines = request.to_lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], json!({"index": {"_index": "products", "_id": "1"}}));
        assert_eq!(lines[1], json!({"title": "one", "price": 1.0}));
        assert_eq!(lines[2], json!({"delete": {"_index": "products", "_id": "9"}}));

        let ndjson = request.to_ndjson().unwrap();
        assert_eq!(ndjson.lines().count(), 3);
        assert!(ndjson.ends_with('\n'));
    }

    #[test]
    fn test_bulk_response_collects_failures() {
        let response = json!({
            "errors": true,
            "items": [
                {"index": {"_id": "1", "status": 201}},
                {"index": {"_id": "2", "status": 400, "error": {"type": "mapper_parsing_exception"}}}
            ]
        });
        let parsed = BulkResponse::from_response(&response);
        assert_eq!(parsed.items, 2);
        assert_eq!(parsed.failed, vec!["2".to_string()]);
        assert!(parsed.has_errors());
    }
}
