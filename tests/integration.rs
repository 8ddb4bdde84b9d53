//! Integration Tests for Search Sync
//!
//! End-to-end flows over in-process collaborators: a fake search client
//! that behaves like a single-node index, `MemoryRecordStore`, `LocalQueue`
//! and `BroadcastEvents`. No external services required.
//!
//! # Running Tests
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//! - `happy_*` - Normal operation: indexing, searching, paging, queued writes
//! - `failure_*` - Client errors, settings apply interrupted mid-sequence

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use search_sync::storage::events::BroadcastEvents;
use search_sync::storage::memory::MemoryRecordStore;
use search_sync::storage::queue::LocalQueue;
use search_sync::{
    AnyEngine, BulkOperation, BulkRequest, BulkResponse, ClientError, DispatchMode, EngineKind, Hit,
    IndexSync, RawResults, SearchBuilder, SearchClient, SearchError, SearchItem, SearchRequest,
    SearchSyncConfig, Searchable,
};

// =============================================================================
// Fixtures
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Product {
    id: u64,
    title: String,
    price: f64,
}

impl Product {
    fn new(id: u64, title: &str, price: f64) -> Self {
        Self {
            id,
            title: title.to_string(),
            price,
        }
    }
}

impl Searchable for Product {
    fn table() -> &'static str {
        "products"
    }

    fn search_key(&self) -> String {
        self.id.to_string()
    }

    fn to_searchable_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("title".into(), json!(self.title));
        map.insert("price".into(), json!(self.price));
        map
    }
}

/// Fake engine: keeps documents per index and answers every search with all
/// documents of the target index in id order.
#[derive(Default)]
struct FakeIndex {
    documents: Mutex<BTreeMap<String, BTreeMap<String, Map<String, Value>>>>,
    searches: Mutex<Vec<SearchRequest>>,
    closed: Mutex<Vec<String>>,
    fail_search: Mutex<Option<ClientError>>,
    fail_open: Mutex<bool>,
}

impl FakeIndex {
    fn ids(&self, index: &str) -> Vec<String> {
        self.documents
            .lock()
            .get(index)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn last_search(&self) -> Option<SearchRequest> {
        self.searches.lock().last().cloned()
    }
}

#[async_trait]
impl SearchClient for FakeIndex {
    async fn bulk(&self, request: &BulkRequest) -> Result<BulkResponse, ClientError> {
        let mut documents = self.documents.lock();
        for operation in &request.operations {
            match operation {
                BulkOperation::Index { index, id, body } => {
                    documents.entry(index.clone()).or_default().insert(id.clone(), body.clone());
                }
                BulkOperation::Delete { index, id } => {
                    if let Some(docs) = documents.get_mut(index) {
                        docs.remove(id);
                    }
                }
            }
        }
        Ok(BulkResponse::new(request.len()))
    }

    async fn search(&self, request: &SearchRequest) -> Result<RawResults, ClientError> {
        if let Some(error) = self.fail_search.lock().clone() {
            return Err(error);
        }
        self.searches.lock().push(request.clone());

        let documents = self.documents.lock();
        let all: Vec<Hit> = documents
            .get(&request.index)
            .map(|docs| {
                docs.iter()
                    .map(|(id, body)| Hit::new(id.clone(), Value::Object(body.clone())))
                    .collect()
            })
            .unwrap_or_default();

        let from = request.body.from.unwrap_or(0);
        let size = request.body.size.unwrap_or(all.len());
        let hits = all.iter().skip(from).take(size).cloned().collect();
        Ok(RawResults::new(all.len() as u64, hits))
    }

    async fn close_index(&self, index: &str) -> Result<(), ClientError> {
        self.closed.lock().push(index.to_string());
        Ok(())
    }

    async fn put_settings(&self, _index: &str, _settings: &Value) -> Result<(), ClientError> {
        Ok(())
    }

    async fn open_index(&self, index: &str) -> Result<(), ClientError> {
        if *self.fail_open.lock() {
            return Err(ClientError::Transport("connection reset".into()));
        }
        self.closed.lock().retain(|closed| closed != index);
        Ok(())
    }
}

type ProductSync = IndexSync<Product, MemoryRecordStore<Product>, AnyEngine>;

fn setup(config: SearchSyncConfig, products: Vec<Product>) -> (Arc<FakeIndex>, Arc<MemoryRecordStore<Product>>, ProductSync) {
    let client = Arc::new(FakeIndex::default());
    let engine = Arc::new(AnyEngine::from_config(&config, client.clone()));
    let store: Arc<MemoryRecordStore<Product>> = Arc::new(products.into_iter().collect());
    let sync = IndexSync::new(engine, store.clone(), &config);
    (client, store, sync)
}

fn catalog(n: u64) -> Vec<Product> {
    (1..=n).map(|id| Product::new(id, "item", id as f64 * 10.0)).collect()
}

fn record_ids(items: &[SearchItem<Product>]) -> Vec<u64> {
    items.iter().filter_map(SearchItem::record).map(|p| p.id).collect()
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn happy_import_then_search_round_trip() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), catalog(3));

    let imported = sync.make_all_searchable().await.unwrap();
    assert_eq!(imported, 3);
    assert_eq!(client.ids("products"), vec!["1", "2", "3"]);

    let items = sync.get(&SearchBuilder::new("item")).await.unwrap();
    assert_eq!(record_ids(&items), vec![1, 2, 3]);

    let wire = client.last_search().unwrap().body;
    assert_eq!(wire.bool_query().must, vec![json!({"query_string": {"query": "item"}})]);
    assert_eq!(wire.size, Some(10_000));
}

#[tokio::test]
async fn happy_stale_hits_are_dropped() {
    let (client, store, sync) = setup(SearchSyncConfig::default(), catalog(3));
    sync.make_all_searchable().await.unwrap();

    store.remove("2");

    let items = sync.get(&SearchBuilder::new("")).await.unwrap();
    assert_eq!(record_ids(&items), vec![1, 3]);
    assert_eq!(sync.keys(&SearchBuilder::new("")).await.unwrap(), vec!["1", "2", "3"]);
    assert_eq!(client.ids("products").len(), 3);
}

#[tokio::test]
async fn happy_paginate_walks_pages() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), catalog(25));
    sync.make_all_searchable().await.unwrap();

    let page = sync.paginate(&SearchBuilder::new(""), 10, 3).await.unwrap();

    assert_eq!(page.total, 25);
    assert_eq!(page.page_count, 3);
    assert_eq!(page.items.len(), 5);
    let wire = client.last_search().unwrap().body;
    assert_eq!((wire.from, wire.size), (Some(20), Some(10)));
}

#[tokio::test]
async fn happy_first_returns_leading_record() {
    let (_client, _store, sync) = setup(SearchSyncConfig::default(), catalog(2));
    sync.make_all_searchable().await.unwrap();

    let first = sync.first(&SearchBuilder::new("")).await.unwrap();

    assert_eq!(first.and_then(SearchItem::into_record), Some(Product::new(1, "item", 10.0)));
}

#[tokio::test]
async fn happy_override_writes_virtual_index_documents() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), Vec::new());

    sync.searchable_into(&[Product::new(7, "archived", 5.0)], "products_archive")
        .await
        .unwrap();

    assert_eq!(client.ids("products_archive"), vec!["7"]);
    let items = sync
        .get(&SearchBuilder::new("").within("products_archive"))
        .await
        .unwrap();
    assert_eq!(
        items,
        vec![SearchItem::Document {
            id: "7".into(),
            source: json!({"title": "archived", "price": 5.0}),
        }]
    );
}

#[tokio::test]
async fn happy_unsearchable_and_remove_all() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), catalog(4));
    sync.make_all_searchable().await.unwrap();

    sync.unsearchable(&[Product::new(1, "item", 10.0)]).await.unwrap();
    assert_eq!(client.ids("products"), vec!["2", "3", "4"]);

    let events = Arc::new(BroadcastEvents::default());
    let mut rx = events.subscribe();
    let sync = sync.with_events(events);
    let removed = sync.remove_all_from_search().await.unwrap();

    assert_eq!(removed, 4);
    assert!(client.ids("products").is_empty());
    let event = rx.try_recv().unwrap();
    assert_eq!(event.name(), "removal_progress");
    assert_eq!(event.last_key(), "4");
}

#[tokio::test]
async fn happy_queued_writes_land_after_worker_runs() {
    let config = SearchSyncConfig {
        queue: true,
        queue_name: Some("search".into()),
        chunk_size: 2,
        ..Default::default()
    };
    let (client, _store, sync) = setup(config, catalog(5));
    let queue = Arc::new(LocalQueue::new());
    let sync = sync.with_queue(queue.clone());

    let outcome = sync
        .searchable_into(&catalog(3), "products_archive")
        .await
        .unwrap();
    assert_eq!(outcome.mode, DispatchMode::Queued);
    assert_eq!(outcome.chunks, 2);
    assert!(client.ids("products_archive").is_empty());

    let ran = queue.run_pending(sync.engine()).await.unwrap();

    assert_eq!(ran, 2);
    assert_eq!(client.ids("products_archive"), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn happy_null_engine_finds_nothing() {
    let config = SearchSyncConfig {
        engine: EngineKind::Null,
        ..Default::default()
    };
    let (client, _store, sync) = setup(config, catalog(3));

    assert_eq!(sync.make_all_searchable().await.unwrap(), 3);
    assert!(sync.get(&SearchBuilder::new("item")).await.unwrap().is_empty());
    assert!(client.ids("products").is_empty());
}

#[tokio::test]
async fn happy_without_syncing_then_resume() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), catalog(2));

    {
        let _paused = sync.without_syncing();
        let _nested = sync.without_syncing();
        sync.searchable(&catalog(2)).await.unwrap();
    }
    assert!(client.ids("products").is_empty());

    sync.searchable(&catalog(2)).await.unwrap();
    assert_eq!(client.ids("products"), vec!["1", "2"]);
}

// =============================================================================
// Failure Scenarios
// =============================================================================

#[tokio::test]
async fn failure_client_error_propagates_unchanged() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), catalog(1));
    *client.fail_search.lock() = Some(ClientError::Rejected {
        status: 400,
        reason: "failed to parse query".into(),
    });

    let err = sync.get(&SearchBuilder::new("(")).await.unwrap_err();

    match err {
        SearchError::Client(ClientError::Rejected { status, reason }) => {
            assert_eq!(status, 400);
            assert_eq!(reason, "failed to parse query");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn failure_settings_reopen_leaves_index_closed() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), Vec::new());
    *client.fail_open.lock() = true;

    let err = sync.apply_settings().await.unwrap_err();

    assert!(matches!(err, SearchError::Client(ClientError::Transport(_))));
    assert_eq!(*client.closed.lock(), vec!["products".to_string()]);
}

#[tokio::test]
async fn failure_invalid_pagination_rejected_before_search() {
    let (client, _store, sync) = setup(SearchSyncConfig::default(), catalog(1));

    assert!(matches!(
        sync.paginate(&SearchBuilder::new(""), 0, 1).await,
        Err(SearchError::InvalidPerPage)
    ));
    assert!(client.last_search().is_none());
}
