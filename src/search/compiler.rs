// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Compiler
//!
//! Translates a [`SearchBuilder`] into the engine's boolean query document.
//!
//! # Clause placement
//!
//! ```text
//! free text                 → must      query_string
//! col = <numeric>           → filter    term   (no score contribution)
//! col = <string>            → must      term
//! col != value              → must_not  term
//! col < > <= >= value       → must      one range clause, all columns
//! col like "a b"            → must      match, operator: and
//! OR col = / like value     → should    match
//! OR col < > <= >= value    → should    range (per predicate)
//! OR col != value           → should    bool.must_not term
//! col IN (a, b)             → should    bool.should [term a, term b]
//! ```
//!
//! A non-empty `should` list always carries `minimum_should_match: 1`, so at
//! least one disjunct is required.
//!
//! Set membership compiles to one nested `should` group per predicate with a
//! `term` clause per value: every matching value adds to the score. A single
//! `terms` filter would match the same documents without scoring them.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::query_builder::{Operator, Predicate, SearchBuilder};
use crate::error::SearchError;

/// Boolean query body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    pub filter: Vec<Value>,
    pub must: Vec<Value>,
    pub must_not: Vec<Value>,
    pub should: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
}

/// `{"bool": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryClause {
    #[serde(rename = "bool")]
    pub bool_query: BoolQuery,
}

/// Wire query document sent to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireQuery {
    pub sort: Vec<Value>,
    pub query: QueryClause,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,
}

impl WireQuery {
    pub fn bool_query(&self) -> &BoolQuery {
        &self.query.bool_query
    }

    pub fn to_json(&self) -> Result<Value, SearchError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// A compiled query addressed to an index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub index: String,
    pub body: WireQuery,
}

/// Page-based retrieval window. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    per_page: usize,
    page: usize,
}

impl PageRequest {
    pub fn new(per_page: usize, page: usize) -> Result<Self, SearchError> {
        if per_page == 0 {
            return Err(SearchError::InvalidPerPage);
        }
        if page == 0 || (page - 1).checked_mul(per_page).is_none() {
            return Err(SearchError::InvalidPage { page });
        }
        Ok(Self { per_page, page })
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// `(page − 1) × per_page`; cannot overflow once constructed.
    pub fn from(&self) -> usize {
        (self.page - 1) * self.per_page
    }
}

/// Builder → wire query translator
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compile a builder into a wire query.
    ///
    /// Without a page, `size` is the builder's limit or `max_results`.
    pub fn compile(builder: &SearchBuilder, page: Option<PageRequest>, max_results: usize) -> WireQuery {
        let mut bool_query = BoolQuery::default();

        let text = builder.query().trim();
        if !text.is_empty() {
            bool_query.must.push(json!({ "query_string": { "query": text } }));
        }

        for (column, value) in builder.wheres() {
            Self::push_equality(&mut bool_query, column, value);
        }

        let mut ranges = Map::new();
        for predicate in builder.predicates() {
            match predicate.operator {
                Operator::Eq => Self::push_equality(&mut bool_query, &predicate.column, &predicate.value),
                Operator::Ne => bool_query.must_not.push(term(&predicate.column, &predicate.value)),
                Operator::Like => bool_query.must.push(json!({
                    "match": { predicate.column.as_str(): { "query": predicate.value, "operator": "and" } }
                })),
                Operator::Lt | Operator::Gt | Operator::Lte | Operator::Gte => {
                    Self::merge_range(&mut ranges, predicate);
                }
            }
        }
        if !ranges.is_empty() {
            bool_query.must.push(json!({ "range": ranges }));
        }

        for predicate in builder.or_predicates() {
            bool_query.should.push(Self::or_clause(predicate));
        }

        for membership in builder.in_predicates() {
            let terms: Vec<Value> = membership
                .values
                .values()
                .iter()
                .map(|value| term(&membership.column, value))
                .collect();
            bool_query.should.push(json!({
                "bool": { "should": terms, "minimum_should_match": 1 }
            }));
        }

        if !bool_query.should.is_empty() {
            bool_query.minimum_should_match = Some(1);
        }

        let sort = builder
            .orders()
            .iter()
            .map(|spec| json!({ spec.column.as_str(): { "order": spec.direction.as_str() } }))
            .collect();

        let (size, from) = match page {
            Some(page) => (Some(page.per_page()), Some(page.from())),
            None => (Some(builder.limit().unwrap_or(max_results)), None),
        };

        WireQuery {
            sort,
            query: QueryClause { bool_query },
            size,
            from,
        }
    }

    fn push_equality(bool_query: &mut BoolQuery, column: &str, value: &Value) {
        if is_numeric(value) {
            bool_query.filter.push(term(column, value));
        } else {
            bool_query.must.push(term(column, value));
        }
    }

    /// Later predicates overwrite earlier ones on the same column and boundary.
    fn merge_range(ranges: &mut Map<String, Value>, predicate: &Predicate) {
        let Some(key) = predicate.operator.range_key() else {
            return;
        };
        let bounds = ranges
            .entry(predicate.column.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(bounds) = bounds {
            bounds.insert(key.to_string(), predicate.value.clone());
        }
    }

    fn or_clause(predicate: &Predicate) -> Value {
        let column = predicate.column.as_str();
        match predicate.operator {
            Operator::Eq | Operator::Like => json!({ "match": { column: predicate.value } }),
            Operator::Ne => json!({ "bool": { "must_not": [term(column, &predicate.value)] } }),
            Operator::Lt | Operator::Gt | Operator::Lte | Operator::Gte => {
                let key = predicate.operator.range_key().unwrap_or("gte");
                json!({ "range": { column: { key: predicate.value } } })
            }
        }
    }
}

fn term(column: &str, value: &Value) -> Value {
    json!({ "term": { column: value } })
}

/// Numbers, and strings that read as a plain decimal number.
fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty()
                && s.chars().any(|c| c.is_ascii_digit())
                && s.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
                && s.parse::<f64>().is_ok()
        }
        _ => false,
    }
}
