//! Lazy windowed pagination over a raw result.

use serde_json::Value;
use std::sync::Arc;

use crate::context::ContextDefinition;
use crate::result::RawResult;

/// Normalizes a windowed result slice into caller-facing documents.
///
/// Invoked with the sliced copy plus the context definition and channel
/// name the adapter was given. Expected to be a pure, non-blocking
/// transform.
pub trait DocumentNormalizer: Send + Sync {
    fn normalize(
        &self,
        result: &RawResult,
        context: Option<&ContextDefinition>,
        output_channel_name: Option<&str>,
    ) -> anyhow::Result<Vec<Value>>;
}

/// Windows one [`RawResult`] lazily, normalizing each materialized slice.
///
/// Every window is produced from an independent copy of the result; the
/// source is never mutated, so repeated calls with the same arguments are
/// idempotent. Malformed provider output degrades to an empty window
/// rather than failing — after a successful query that is a data-quality
/// issue, not a dispatch failure.
pub struct PaginationAdapter {
    raw_result: RawResult,
    context_definition: Option<Arc<ContextDefinition>>,
    output_channel_name: Option<String>,
    normalizer: Option<Arc<dyn DocumentNormalizer>>,
}

impl PaginationAdapter {
    pub fn new(raw_result: RawResult) -> Self {
        Self {
            raw_result,
            context_definition: None,
            output_channel_name: None,
            normalizer: None,
        }
    }

    pub fn set_context_definition(&mut self, context_definition: Arc<ContextDefinition>) {
        self.context_definition = Some(context_definition);
    }

    pub fn set_output_channel_name(&mut self, output_channel_name: impl Into<String>) {
        self.output_channel_name = Some(output_channel_name.into());
    }

    pub fn set_document_normalizer(&mut self, normalizer: Arc<dyn DocumentNormalizer>) {
        self.normalizer = Some(normalizer);
    }

    /// Materialize one window of items.
    ///
    /// An in-bounds offset yields the slice
    /// `[offset, offset + item_count_per_page)`; an offset at or past the
    /// end of the data yields the full data unmodified. Non-sequence data
    /// yields an empty window.
    pub fn get_items(&self, offset: usize, item_count_per_page: usize) -> Vec<Value> {
        let items = match self.raw_result.data() {
            Value::Array(items) => items,
            _ => return Vec::new(),
        };

        let window: Vec<Value> = if items.len() > offset {
            let end = offset.saturating_add(item_count_per_page).min(items.len());
            items[offset..end].to_vec()
        } else {
            items.clone()
        };

        // Window copy carries the slice; hit count and metadata stay intact.
        let mut windowed = self.raw_result.clone();
        windowed.set_data(Value::Array(window.clone()));

        let Some(normalizer) = &self.normalizer else {
            return window;
        };

        match normalizer.normalize(
            &windowed,
            self.context_definition.as_deref(),
            self.output_channel_name.as_deref(),
        ) {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::warn!(
                    channel = self.output_channel_name.as_deref().unwrap_or("-"),
                    "document normalizer failed, returning empty window: {e}"
                );
                Vec::new()
            }
        }
    }

    /// Authoritative total hit count of the underlying result, independent
    /// of what any window materialized.
    pub fn count(&self) -> usize {
        self.raw_result.hit_count()
    }
}
