//! # Search Sync
//!
//! Keeps a relational record store in step with a full-text search index, and
//! queries that index with relational-style predicates instead of the engine's
//! native query language.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Read Path                             │
//! │  • SearchBuilder collects predicates, sorts, limit, index  │
//! │  • QueryCompiler emits the engine's bool query             │
//! │  • reconcile maps hits back to records in hit order        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   SearchEngine (variant)                    │
//! │  • ElasticEngine over a black-box SearchClient             │
//! │  • NullEngine: indexes nothing, finds nothing              │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Write Path                            │
//! │  • SyncDispatcher chunks change sets (≤ 500)               │
//! │  • inline bulk write, or a SyncJob on the JobQueue         │
//! │  • scoped suspension via a drop guard                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use search_sync::{AnyEngine, IndexSync, SearchBuilder, SearchClient, SearchSyncConfig, Searchable};
//! use search_sync::storage::memory::MemoryRecordStore;
//! use serde_json::{json, Map, Value};
//!
//! #[derive(Clone)]
//! struct Product { id: u64, title: String, price: f64 }
//!
//! impl Searchable for Product {
//!     fn table() -> &'static str { "products" }
//!     fn search_key(&self) -> String { self.id.to_string() }
//!     fn to_searchable_map(&self) -> Map<String, Value> {
//!         let mut map = Map::new();
//!         map.insert("title".into(), json!(self.title));
//!         map.insert("price".into(), json!(self.price));
//!         map
//!     }
//! }
//!
//! async fn run(client: Arc<dyn SearchClient>) -> Result<(), search_sync::SearchError> {
//!     let config = SearchSyncConfig::default();
//!     let engine = Arc::new(AnyEngine::from_config(&config, client));
//!     let store = Arc::new(MemoryRecordStore::<Product>::new());
//!     let sync: IndexSync<Product, _, _> = IndexSync::new(engine, store, &config);
//!
//!     sync.make_all_searchable().await?;
//!
//!     let search = SearchBuilder::new("boots")
//!         .where_eq("brand_id", 3)
//!         .where_op("price", "<", 100)
//!         .order_by_desc("price");
//!     for item in sync.get(&search).await? {
//!         if let Some(product) = item.record() {
//!             println!("{} {}", product.id, product.title);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`SearchSyncConfig`] for all configuration options.
//!
//! ## Modules
//!
//! - [`search`]: Predicate builder, query compiler, result reconciler
//! - [`bulk`]: Bulk operation assembly
//! - [`engine`]: Engine capability trait and its variants
//! - [`dispatch`]: Inline vs. queued write routing, suspension
//! - [`index_sync`]: The caller-facing [`IndexSync`]
//! - [`storage`]: Record store, job queue and event sink seams

pub mod config;
pub mod error;
pub mod record;
pub mod search;
pub mod bulk;
pub mod engine;
pub mod storage;
pub mod dispatch;
pub mod index_sync;
pub mod metrics;

pub use config::{EngineKind, SearchSyncConfig};
pub use error::{ClientError, QueueError, SearchError, StoreError};
pub use record::{Projection, Searchable, SearchableRecord};
pub use search::{
    Direction, Hit, Operator, Page, PageRequest, QueryCompiler, RawResults, SearchBuilder, SearchItem,
    SearchRequest, WireQuery,
};
pub use bulk::{BulkOperation, BulkRequest, BulkResponse, BulkWriter};
pub use engine::{AnyEngine, ElasticEngine, NullEngine, SearchClient, SearchEngine};
pub use storage::traits::{EventSink, JobQueue, RecordStore};
pub use dispatch::{DispatchMode, DispatchOutcome, SyncDispatcher, SyncEvent, SyncJob, SyncSuspension};
pub use index_sync::IndexSync;
pub use metrics::LatencyTimer;
