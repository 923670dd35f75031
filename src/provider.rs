//! The index provider capability set and its option schema.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::channel::ChannelQuery;
use crate::config::{OptionsMap, OUTPUT_CHANNEL_OPTION_PREFIX};
use crate::error::OptionsError;
use crate::logger::SearchLogger;
use crate::result::RawResult;

/// A backend-specific index provider.
///
/// Providers vary in backend (search engine, database) but share this
/// capability set. The Index Manager obtains a fresh instance from the
/// registry, resolves the context's options against
/// [`accepted_options`](IndexProvider::accepted_options), applies them via
/// [`configure`](IndexProvider::configure), attaches a logger, and caches
/// the instance — one live instance per token. After caching the provider
/// is only reached through `&self`; internal mutable state (e.g. a
/// connection) is the implementation's own concern.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Schema of options this provider accepts from context configuration.
    fn accepted_options(&self) -> OptionSchema;

    /// Apply resolved options. Called exactly once, before the instance
    /// is cached; never called again for the cached instance.
    fn configure(&mut self, options: OptionsMap) -> Result<()>;

    /// Attach the shared logger collaborator.
    fn set_logger(&mut self, logger: SearchLogger);

    /// Execute a provider-native query outside any output channel.
    async fn query(&self, query: ChannelQuery) -> Result<RawResult>;
}

impl std::fmt::Debug for dyn IndexProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn IndexProvider")
    }
}

/// Declared accepted-option schema of a provider.
///
/// Required options must be present in the context configuration; optional
/// options may carry a default that is merged in when absent; any other
/// key is rejected. Keys prefixed `output_channel_` are channel-type
/// opt-ins and are always accepted.
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    required: Vec<String>,
    optional: Vec<String>,
    defaults: OptionsMap,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required option.
    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Declare an optional option without a default.
    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.optional.push(name.into());
        self
    }

    /// Declare an optional option with a default value, merged into the
    /// resolved options when the context does not set it.
    pub fn default_value(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        self.optional.push(name.clone());
        self.defaults.insert(name, value);
        self
    }

    fn accepts(&self, key: &str) -> bool {
        key.starts_with(OUTPUT_CHANNEL_OPTION_PREFIX)
            || self.required.iter().any(|k| k == key)
            || self.optional.iter().any(|k| k == key)
    }

    /// Validate provided options and produce the merged option map
    /// (schema defaults overlaid by the provided values).
    ///
    /// Fails on the first missing required key or unknown key.
    pub fn resolve(&self, provided: &OptionsMap) -> Result<OptionsMap, OptionsError> {
        for key in provided.keys() {
            if !self.accepts(key) {
                return Err(OptionsError::UnknownOption(key.clone()));
            }
        }
        for key in &self.required {
            if !provided.contains_key(key) {
                return Err(OptionsError::MissingRequired(key.clone()));
            }
        }

        let mut merged = self.defaults.clone();
        for (key, value) in provided {
            merged.insert(key.clone(), value.clone());
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("index")
            .optional("analyzer")
            .default_value("timeout_ms", json!(500))
    }

    fn options(entries: &[(&str, Value)]) -> OptionsMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn resolve_merges_defaults() {
        let merged = schema()
            .resolve(&options(&[("index", json!("products"))]))
            .unwrap();

        assert_eq!(merged["index"], "products");
        assert_eq!(merged["timeout_ms"], 500);
        assert!(!merged.contains_key("analyzer"));
    }

    #[test]
    fn provided_value_overrides_default() {
        let merged = schema()
            .resolve(&options(&[
                ("index", json!("products")),
                ("timeout_ms", json!(50)),
            ]))
            .unwrap();

        assert_eq!(merged["timeout_ms"], 50);
    }

    #[test]
    fn missing_required_rejected() {
        let err = schema()
            .resolve(&options(&[("analyzer", json!("standard"))]))
            .unwrap_err();
        assert_eq!(err, OptionsError::MissingRequired("index".to_string()));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = schema()
            .resolve(&options(&[
                ("index", json!("products")),
                ("shards", json!(3)),
            ]))
            .unwrap_err();
        assert_eq!(err, OptionsError::UnknownOption("shards".to_string()));
    }

    #[test]
    fn output_channel_keys_always_accepted() {
        let merged = schema()
            .resolve(&options(&[
                ("index", json!("products")),
                ("output_channel_autocomplete", json!("es_autocomplete")),
            ]))
            .unwrap();

        assert_eq!(merged["output_channel_autocomplete"], "es_autocomplete");
    }
}
