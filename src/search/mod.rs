// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Relational-style predicates compiled into the engine's boolean query,
//! and raw hits reconciled back into records.
//!
//! # Architecture
//!
//! ```text
//! SearchBuilder (predicates)
//!     ↓
//! QueryCompiler → WireQuery {sort, query.bool{filter,must,must_not,should}, size, from}
//!     ↓
//! SearchClient.search  (or the builder's raw hook)
//!     ↓
//! RawResults {total, hits}
//!     ↓
//! reconcile → [SearchItem] in hit order, stale hits dropped
//! ```
//!
//! # Example
//!
//! ```rust
//! use search_sync::search::{QueryCompiler, SearchBuilder};
//! use serde_json::json;
//!
//! let search = SearchBuilder::new("")
//!     .where_op("price", ">", 10)
//!     .where_op("price", "<", 100);
//!
//! let wire = QueryCompiler::compile(&search, None, 10_000);
//! assert_eq!(
//!     wire.bool_query().must,
//!     vec![json!({"range": {"price": {"gt": 10, "lt": 100}}})]
//! );
//! ```

mod query_builder;
mod compiler;
mod reconciler;
mod index_settings;

pub use query_builder::{
    Direction, InPredicate, InValues, Operator, Predicate, RawSearch, RawSearchFuture, SearchBuilder, SortSpec,
};
pub use compiler::{BoolQuery, PageRequest, QueryClause, QueryCompiler, SearchRequest, WireQuery};
pub use reconciler::{is_virtual_index, page_count, reconcile, Hit, Page, RawResults, SearchItem};
pub use index_settings::IndexSettings;
