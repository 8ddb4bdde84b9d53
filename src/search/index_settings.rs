// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Index Settings
//!
//! The one settings change applied to an index: tolerance of malformed
//! field values. Static settings can only change on a closed index, so the
//! engine applies it as a three-step sequence:
//!
//! ```text
//! POST  /{index}/_close
//! PUT   /{index}/_settings   {"index": {"mapping": {"ignore_malformed": true}}}
//! POST  /{index}/_open
//! ```
//!
//! The sequence is not transactional. If the update or reopen step fails,
//! the index stays closed until it is reopened by hand.

use serde_json::{json, Value};

use crate::config::SearchSyncConfig;

/// Settings written by [`crate::SearchEngine::apply_settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSettings {
    pub ignore_malformed: bool,
}

impl IndexSettings {
    pub fn new(ignore_malformed: bool) -> Self {
        Self { ignore_malformed }
    }

    pub fn from_config(config: &SearchSyncConfig) -> Self {
        Self::new(config.ignore_malformed)
    }

    /// Settings body for the update call
    pub fn to_json(&self) -> Value {
        json!({ "index": { "mapping": { "ignore_malformed": self.ignore_malformed } } })
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self::new(true)
    }
}
