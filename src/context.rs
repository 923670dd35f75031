//! Context definitions and the configuration-backed resolver.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{ChannelConfig, OptionsMap, SearchConfig, OUTPUT_CHANNEL_OPTION_PREFIX};
use crate::error::ContextConfigurationError;

/// Immutable configuration record for one named search context.
///
/// Built once at configuration-load time and shared read-only for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct ContextDefinition {
    name: String,
    provider_token: String,
    provider_options: OptionsMap,
    channels: HashMap<String, ChannelConfig>,
}

impl ContextDefinition {
    pub fn new(
        name: impl Into<String>,
        provider_token: impl Into<String>,
        provider_options: OptionsMap,
        channels: HashMap<String, ChannelConfig>,
    ) -> Self {
        Self {
            name: name.into(),
            provider_token: provider_token.into(),
            provider_options,
            channels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider_token(&self) -> &str {
        &self.provider_token
    }

    pub fn provider_options(&self) -> &OptionsMap {
        &self.provider_options
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.get(name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Service name this context declared for a channel type, read from
    /// the `output_channel_<type>` opt-in key in the provider options.
    pub fn output_channel_service(&self, channel_type: &str) -> Option<&str> {
        self.provider_options
            .get(&format!("{OUTPUT_CHANNEL_OPTION_PREFIX}{channel_type}"))
            .and_then(|v| v.as_str())
    }
}

/// A context's resolved runtime view, produced per dispatch call.
///
/// Producing a fresh view per call (rather than caching one) keeps option
/// validation running against current configuration; whether validation
/// actually re-runs is decided by the Index Manager's provider cache alone.
#[derive(Debug, Clone)]
pub struct ContextData {
    definition: Arc<ContextDefinition>,
}

impl ContextData {
    pub fn new(definition: Arc<ContextDefinition>) -> Self {
        Self { definition }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Provider token this context dispatches to.
    pub fn index_provider(&self) -> &str {
        self.definition.provider_token()
    }

    pub fn index_provider_options(&self) -> &OptionsMap {
        self.definition.provider_options()
    }

    pub fn definition(&self) -> &Arc<ContextDefinition> {
        &self.definition
    }
}

/// Pure lookup from context name to definition.
///
/// Holds definitions built from loaded configuration; no side effects,
/// idempotent, safe for concurrent readers.
#[derive(Debug, Default)]
pub struct ContextResolver {
    contexts: HashMap<String, Arc<ContextDefinition>>,
}

impl ContextResolver {
    /// Build a resolver from validated configuration.
    pub fn new(config: &SearchConfig) -> Self {
        let contexts = config
            .contexts
            .iter()
            .map(|(name, ctx)| {
                let definition = ContextDefinition::new(
                    name.clone(),
                    ctx.provider.clone(),
                    ctx.options.clone(),
                    ctx.channels.clone(),
                );
                (name.clone(), Arc::new(definition))
            })
            .collect();
        Self { contexts }
    }

    /// Resolve a context name to its definition.
    pub fn resolve(
        &self,
        context_name: &str,
    ) -> Result<Arc<ContextDefinition>, ContextConfigurationError> {
        self.contexts
            .get(context_name)
            .cloned()
            .ok_or_else(|| ContextConfigurationError::UnknownContext(context_name.to_string()))
    }

    /// Resolve a context name to a runtime data view.
    pub fn resolve_data(
        &self,
        context_name: &str,
    ) -> Result<ContextData, ContextConfigurationError> {
        Ok(ContextData::new(self.resolve(context_name)?))
    }

    pub fn context_names(&self) -> impl Iterator<Item = &str> {
        self.contexts.keys().map(String::as_str)
    }
}
