//! Provider-agnostic query result container.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Raw result produced by an output channel.
///
/// Holds an ordered sequence of opaque data items, the authoritative total
/// hit count, and associated metadata. The hit count may exceed the number
/// of materialized items — providers that know total hits without fetching
/// every document report the full total here.
///
/// `Clone` produces a fully independent copy; windowing operations clone
/// before replacing the data so the source result is never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct RawResult {
    data: Value,
    hit_count: usize,
    metadata: HashMap<String, Value>,
}

impl RawResult {
    /// Create a result from opaque data and its authoritative hit count.
    pub fn new(data: Value, hit_count: usize) -> Self {
        Self {
            data,
            hit_count,
            metadata: HashMap::new(),
        }
    }

    /// Create an empty result.
    pub fn empty() -> Self {
        Self::new(Value::Array(Vec::new()), 0)
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Replace the data sequence, leaving hit count and metadata untouched.
    pub fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    /// Authoritative total hit count.
    pub fn hit_count(&self) -> usize {
        self.hit_count
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Number of materialized items, or 0 when the data is not a sequence.
    pub fn materialized_len(&self) -> usize {
        match &self.data {
            Value::Array(items) => items.len(),
            _ => 0,
        }
    }
}
