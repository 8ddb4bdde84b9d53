// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Searchable records.
//!
//! A [`Searchable`] record knows its key, the index it lives in and the
//! field map it projects into that index. A [`Projection`] is the detached
//! form of the same three things, captured once so that work crossing a
//! queue boundary keeps an index override the record itself knows nothing
//! about.
//!
//! # Example
//!
//! ```
//! use search_sync::{Searchable, Projection};
//! use serde_json::{json, Map, Value};
//!
//! #[derive(Clone)]
//! struct Product { id: u64, title: String }
//!
//! impl Searchable for Product {
//!     fn table() -> &'static str { "products" }
//!     fn search_key(&self) -> String { self.id.to_string() }
//!     fn to_searchable_map(&self) -> Map<String, Value> {
//!         let mut map = Map::new();
//!         map.insert("title".into(), json!(self.title));
//!         map
//!     }
//! }
//!
//! let shoe = Product { id: 7, title: "red shoes".into() };
//! let projection = Projection::capture(&shoe, Some("products_archive"));
//! assert_eq!(projection.key(), "7");
//! assert_eq!(projection.index(), "products_archive");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A canonical record that can be written to the search index.
pub trait Searchable: Clone + Send + Sync + 'static {
    /// Native storage location of the record type (table name).
    fn table() -> &'static str;

    /// Index the record type is searched in by default.
    ///
    /// When this differs from [`Searchable::table`] the index is *virtual*:
    /// its documents are authoritative and are not looked up in the store.
    fn default_index() -> String {
        Self::table().to_string()
    }

    /// Stable document id.
    fn search_key(&self) -> String;

    /// Index this particular record is written to.
    fn searchable_as(&self) -> String {
        Self::default_index()
    }

    /// Field map sent as the document body. An empty map is not indexed.
    fn to_searchable_map(&self) -> Map<String, Value>;
}

/// A record's key, index tag and field map, captured at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    key: String,
    index: String,
    body: Map<String, Value>,
}

impl Projection {
    /// Capture a record, resolving the target index now.
    pub fn capture<R: Searchable>(record: &R, index_override: Option<&str>) -> Self {
        Self {
            key: record.search_key(),
            index: index_override
                .map(str::to_string)
                .unwrap_or_else(|| record.searchable_as()),
            body: record.to_searchable_map(),
        }
    }

    /// Build a projection from parts (e.g. a document with no backing record).
    pub fn new(key: impl Into<String>, index: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            key: key.into(),
            index: index.into(),
            body,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }
}

/// Input to the bulk writer: either a live record or a captured projection.
#[derive(Debug, Clone)]
pub enum SearchableRecord<R> {
    Record(R),
    Projection(Projection),
}

impl<R: Searchable> SearchableRecord<R> {
    pub fn key(&self) -> String {
        match self {
            Self::Record(record) => record.search_key(),
            Self::Projection(projection) => projection.key.clone(),
        }
    }

    pub fn index(&self) -> String {
        match self {
            Self::Record(record) => record.searchable_as(),
            Self::Projection(projection) => projection.index.clone(),
        }
    }

    pub fn body(&self) -> Map<String, Value> {
        match self {
            Self::Record(record) => record.to_searchable_map(),
            Self::Projection(projection) => projection.body.clone(),
        }
    }
}

impl<R> From<Projection> for SearchableRecord<R> {
    fn from(projection: Projection) -> Self {
        Self::Projection(projection)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use serde_json::json;

    /// Record type shared by unit tests.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Product {
        pub id: u64,
        pub title: String,
        pub price: f64,
    }

    impl Product {
        pub fn new(id: u64, title: &str, price: f64) -> Self {
            Self { id, title: title.to_string(), price }
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
            if self.title.is_empty() {
                return Map::new();
            }
            let mut map = Map::new();
            map.insert("title".into(), json!(self.title));
            map.insert("price".into(), json!(self.price));
            map
        }
    }
}
