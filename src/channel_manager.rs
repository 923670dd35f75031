//! Lookup of output channels, runtime strategies, and named modifiers.
//!
//! Everything here is assembled at bootstrap; dispatch-time operations are
//! pure lookups. Modifier pipelines are resolved from their configured
//! name lists once per (context, channel) and cached alongside that
//! configuration, so the pipeline stays data-driven without paying the
//! name lookups on every request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::channel::{OutputChannel, RuntimeOptionsBuilder, RuntimeQueryProvider};
use crate::context::ContextDefinition;
use crate::modifier::{ModifierAction, ModifierFilter, ModifierPipeline};
use crate::registry::ProviderRegistry;

/// Bootstrap-registered catalog of runtime strategies and modifiers,
/// plus channel resolution against the provider registry.
pub struct OutputChannelManager {
    registry: Arc<ProviderRegistry>,
    query_providers: HashMap<String, Arc<dyn RuntimeQueryProvider>>,
    options_builders: HashMap<String, Arc<dyn RuntimeOptionsBuilder>>,
    filters: HashMap<(String, String), Arc<dyn ModifierFilter>>,
    actions: HashMap<(String, String), Vec<Arc<dyn ModifierAction>>>,
    pipelines: Mutex<HashMap<(String, String), Arc<ModifierPipeline>>>,
}

impl OutputChannelManager {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            query_providers: HashMap::new(),
            options_builders: HashMap::new(),
            filters: HashMap::new(),
            actions: HashMap::new(),
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// Register the runtime query provider for a provider token.
    pub fn register_runtime_query_provider(
        &mut self,
        token: impl Into<String>,
        provider: Arc<dyn RuntimeQueryProvider>,
    ) {
        self.query_providers.insert(token.into(), provider);
    }

    /// Register the runtime options builder for a provider token.
    pub fn register_runtime_options_builder(
        &mut self,
        token: impl Into<String>,
        builder: Arc<dyn RuntimeOptionsBuilder>,
    ) {
        self.options_builders.insert(token.into(), builder);
    }

    /// Register a named filter for a channel service.
    pub fn register_modifier_filter(
        &mut self,
        service: impl Into<String>,
        name: impl Into<String>,
        filter: Arc<dyn ModifierFilter>,
    ) {
        self.filters.insert((service.into(), name.into()), filter);
    }

    /// Register a named action for a channel service. Multiple actions
    /// may be registered under one name; they run in registration order.
    pub fn register_modifier_action(
        &mut self,
        service: impl Into<String>,
        name: impl Into<String>,
        action: Arc<dyn ModifierAction>,
    ) {
        self.actions
            .entry((service.into(), name.into()))
            .or_default()
            .push(action);
    }

    /// Resolve the output channel a context configured under a channel
    /// name. `None` when the context does not declare the channel, has
    /// not opted into the channel type, or no factory is registered.
    pub fn get_output_channel(
        &self,
        definition: &ContextDefinition,
        channel_name: &str,
    ) -> Option<Box<dyn OutputChannel>> {
        definition.channel(channel_name)?;
        definition.output_channel_service(channel_name)?;

        self.registry
            .get_output_channel(channel_name, definition.provider_token())
            .ok()
            .map(|factory| factory.create())
    }

    pub fn get_output_channel_runtime_query_provider(
        &self,
        provider_token: &str,
    ) -> Option<Arc<dyn RuntimeQueryProvider>> {
        self.query_providers.get(provider_token).cloned()
    }

    pub fn get_output_channel_runtime_options_builder(
        &self,
        provider_token: &str,
    ) -> Option<Arc<dyn RuntimeOptionsBuilder>> {
        self.options_builders.get(provider_token).cloned()
    }

    /// Actions registered under a name for a channel service. An
    /// unregistered name yields an empty list, not an error — actions are
    /// optional enrichments.
    pub fn get_output_channel_modifier_action(
        &self,
        service: &str,
        action: &str,
    ) -> Vec<Arc<dyn ModifierAction>> {
        self.actions
            .get(&(service.to_string(), action.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_output_channel_modifier_filter(
        &self,
        service: &str,
        filter: &str,
    ) -> Option<Arc<dyn ModifierFilter>> {
        self.filters
            .get(&(service.to_string(), filter.to_string()))
            .cloned()
    }

    /// Ordered modifier pipeline for a context's channel, assembled from
    /// the channel's configured filter/action name lists and cached per
    /// (context, channel).
    ///
    /// Unknown filter names are skipped with a warning (a configured
    /// filter that is missing is a bootstrap defect worth surfacing);
    /// unknown action names contribute nothing.
    pub fn pipeline(
        &self,
        definition: &ContextDefinition,
        channel_name: &str,
        service: &str,
    ) -> Arc<ModifierPipeline> {
        let key = (definition.name().to_string(), channel_name.to_string());

        let mut cache = self
            .pipelines
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(pipeline) = cache.get(&key) {
            return pipeline.clone();
        }

        let pipeline = Arc::new(self.assemble_pipeline(definition, channel_name, service));
        cache.insert(key, pipeline.clone());
        pipeline
    }

    fn assemble_pipeline(
        &self,
        definition: &ContextDefinition,
        channel_name: &str,
        service: &str,
    ) -> ModifierPipeline {
        let Some(channel) = definition.channel(channel_name) else {
            return ModifierPipeline::empty();
        };

        let mut filters = Vec::with_capacity(channel.filters.len());
        for name in &channel.filters {
            match self.get_output_channel_modifier_filter(service, name) {
                Some(filter) => filters.push(filter),
                None => tracing::warn!(
                    context = definition.name(),
                    channel = channel_name,
                    filter = name.as_str(),
                    "configured filter is not registered, skipping"
                ),
            }
        }

        let mut actions = Vec::new();
        for name in &channel.actions {
            actions.extend(self.get_output_channel_modifier_action(service, name));
        }

        ModifierPipeline::new(filters, actions)
    }
}
