// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Builder - accumulated predicates for one search call
//!
//! Collects relational-style predicates (equality, comparison, `like`,
//! disjunction, set membership), sort specs, a limit and an index override.
//! The builder is plain data: [`super::QueryCompiler`] turns it into the
//! engine's boolean query.
//!
//! # Example
//!
//! ```rust
//! use search_sync::search::SearchBuilder;
//!
//! let search = SearchBuilder::new("red shoes")
//!     .where_eq("brand_id", 12)
//!     .where_op("price", ">", 10)
//!     .where_op("price", "<", 100)
//!     .or_where("colour", "=", "red")
//!     .where_in("size", "40,41,42")
//!     .order_by_desc("created_at")
//!     .take(20);
//!
//! assert_eq!(search.limit(), Some(20));
//! ```
//!
//! Operators outside the supported set are dropped, not rejected:
//!
//! ```rust
//! use search_sync::search::SearchBuilder;
//!
//! let search = SearchBuilder::new("").where_op("price", "between", 10);
//! assert!(search.predicates().is_empty());
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::compiler::SearchRequest;
use super::reconciler::RawResults;
use crate::engine::SearchClient;
use crate::error::SearchError;

/// Comparison operator, normalized to one canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    /// `!=` and `<>`
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Like,
}

impl Operator {
    /// Parse an operator string, case-insensitively. Unknown operators yield `None`.
    pub fn parse(op: &str) -> Option<Self> {
        match op.trim().to_ascii_lowercase().as_str() {
            "=" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            ">" => Some(Self::Gt),
            "<=" => Some(Self::Lte),
            ">=" => Some(Self::Gte),
            "like" => Some(Self::Like),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Like => "like",
        }
    }

    /// Range boundary key for comparators (`gt`, `gte`, `lt`, `lte`).
    pub fn range_key(&self) -> Option<&'static str> {
        match self {
            Self::Gt => Some("gt"),
            Self::Gte => Some("gte"),
            Self::Lt => Some("lt"),
            Self::Lte => Some("lte"),
            _ => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `{column, operator, value}` triple.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

/// Values for a set-membership predicate.
///
/// Built from a list, or from a comma-delimited string that is split into one.
#[derive(Debug, Clone, PartialEq)]
pub struct InValues(Vec<Value>);

impl InValues {
    pub fn values(&self) -> &[Value] {
        &self.0
    }

    fn split(delimited: &str) -> Self {
        Self(
            delimited
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| Value::String(part.to_string()))
                .collect(),
        )
    }
}

impl<T: Into<Value>> From<Vec<T>> for InValues {
    fn from(values: Vec<T>) -> Self {
        Self(values.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for InValues {
    fn from(delimited: &str) -> Self {
        Self::split(delimited)
    }
}

impl From<String> for InValues {
    fn from(delimited: String) -> Self {
        Self::split(&delimited)
    }
}

/// A `{column, values[]}` set-membership predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct InPredicate {
    pub column: String,
    pub values: InValues,
}

/// Sort direction. Anything other than `asc` is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn parse(direction: &str) -> Self {
        if direction.trim().eq_ignore_ascii_case("asc") {
            Self::Asc
        } else {
            Self::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: Direction,
}

/// Future returned by a raw search hook.
pub type RawSearchFuture = Pin<Box<dyn Future<Output = Result<RawResults, SearchError>> + Send>>;

type RawSearchFn = dyn Fn(Arc<dyn SearchClient>, SearchRequest) -> RawSearchFuture + Send + Sync;

/// Escape hook that receives the compiled request and the client, and
/// executes the search itself. Its results are used unchanged.
#[derive(Clone)]
pub struct RawSearch(Arc<RawSearchFn>);

impl RawSearch {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Arc<dyn SearchClient>, SearchRequest) -> RawSearchFuture + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, client: Arc<dyn SearchClient>, request: SearchRequest) -> RawSearchFuture {
        (self.0)(client, request)
    }
}

impl fmt::Debug for RawSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawSearch(..)")
    }
}

/// Predicates accumulated for a single search call.
#[derive(Debug, Clone, Default)]
pub struct SearchBuilder {
    query: String,
    wheres: Vec<(String, Value)>,
    predicates: Vec<Predicate>,
    or_predicates: Vec<Predicate>,
    in_predicates: Vec<InPredicate>,
    orders: Vec<SortSpec>,
    limit: Option<usize>,
    index: Option<String>,
    raw: Option<RawSearch>,
}

impl SearchBuilder {
    /// Start a search with a free-text query (may be empty).
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Equality predicate. A second call for the same column replaces the value.
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.wheres.iter_mut().find(|(existing, _)| *existing == column) {
            Some(slot) => slot.1 = value,
            None => self.wheres.push((column, value)),
        }
        self
    }

    /// Operator predicate. Unsupported operators are dropped.
    pub fn where_op(mut self, column: impl Into<String>, op: &str, value: impl Into<Value>) -> Self {
        let column = column.into();
        match Operator::parse(op) {
            Some(operator) => self.predicates.push(Predicate {
                column,
                operator,
                value: value.into(),
            }),
            None => debug!(column = %column, op = %op, "Dropping unsupported operator"),
        }
        self
    }

    /// Operator predicate with an already-parsed operator.
    pub fn where_cmp(mut self, column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            column: column.into(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Fan a list of `(column, operator, value)` triples out into operator predicates.
    pub fn where_all<C, V, I>(self, triples: I) -> Self
    where
        I: IntoIterator<Item = (C, &'static str, V)>,
        C: Into<String>,
        V: Into<Value>,
    {
        triples
            .into_iter()
            .fold(self, |builder, (column, op, value)| builder.where_op(column, op, value))
    }

    /// Apply a group of predicates through a closure.
    pub fn scoped(self, f: impl FnOnce(Self) -> Self) -> Self {
        f(self)
    }

    /// Disjunctive predicate: an optional match, at least one of which must hold.
    pub fn or_where(mut self, column: impl Into<String>, op: &str, value: impl Into<Value>) -> Self {
        let column = column.into();
        match Operator::parse(op) {
            Some(operator) => self.or_predicates.push(Predicate {
                column,
                operator,
                value: value.into(),
            }),
            None => debug!(column = %column, op = %op, "Dropping unsupported OR operator"),
        }
        self
    }

    /// Disjunctive equality predicate.
    pub fn or_where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.or_where(column, "=", value)
    }

    /// Set-membership predicate. Accepts a list or a comma-delimited string.
    pub fn where_in(mut self, column: impl Into<String>, values: impl Into<InValues>) -> Self {
        self.in_predicates.push(InPredicate {
            column: column.into(),
            values: values.into(),
        });
        self
    }

    /// Sort ascending by a column.
    pub fn order_by(self, column: impl Into<String>) -> Self {
        self.order_by_direction(column, "asc")
    }

    pub fn order_by_desc(self, column: impl Into<String>) -> Self {
        self.order_by_direction(column, "desc")
    }

    /// Sort by a column; any direction other than `asc` sorts descending.
    pub fn order_by_direction(mut self, column: impl Into<String>, direction: &str) -> Self {
        self.orders.push(SortSpec {
            column: column.into(),
            direction: Direction::parse(direction),
        });
        self
    }

    /// Limit the number of results.
    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Search a different index than the record type's default.
    pub fn within(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Execute the compiled query through a custom hook instead of the
    /// standard search call.
    pub fn raw<F>(mut self, f: F) -> Self
    where
        F: Fn(Arc<dyn SearchClient>, SearchRequest) -> RawSearchFuture + Send + Sync + 'static,
    {
        self.raw = Some(RawSearch::new(f));
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn wheres(&self) -> &[(String, Value)] {
        &self.wheres
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn or_predicates(&self) -> &[Predicate] {
        &self.or_predicates
    }

    pub fn in_predicates(&self) -> &[InPredicate] {
        &self.in_predicates
    }

    pub fn orders(&self) -> &[SortSpec] {
        &self.orders
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn raw_search(&self) -> Option<&RawSearch> {
        self.raw.as_ref()
    }
}
