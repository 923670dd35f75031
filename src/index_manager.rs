//! Lazy provider resolution, option validation, and the per-token
//! instance cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::channel::OutputChannel;
use crate::config::{OptionsMap, OUTPUT_CHANNEL_OPTION_PREFIX};
use crate::context::ContextData;
use crate::error::{ContextConfigurationError, ProviderError};
use crate::logger::SearchLogger;
use crate::provider::IndexProvider;
use crate::registry::ProviderRegistry;

/// Resolves a context's declared provider token to a configured, ready-to-
/// query provider instance.
///
/// At most one live instance exists per token for the manager's lifetime.
/// The cache is guarded by a single mutex held across first construction;
/// option validation is in-process and non-blocking, so serializing
/// concurrent first resolutions this way is cheap and rules out two live
/// instances for one token.
pub struct IndexManager {
    registry: Arc<ProviderRegistry>,
    logger: SearchLogger,
    providers: Mutex<HashMap<String, Arc<dyn IndexProvider>>>,
}

impl IndexManager {
    pub fn new(registry: Arc<ProviderRegistry>, logger: SearchLogger) -> Self {
        Self {
            registry,
            logger,
            providers: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the provider for a context.
    ///
    /// Validates the context's provider options against the provider's
    /// accepted-option schema before the instance is handed out; a cache
    /// hit bypasses re-validation (option schemas are static
    /// configuration, so validation cost is paid once per provider per
    /// process).
    pub fn get_index_provider(
        &self,
        context_data: &ContextData,
    ) -> Result<Arc<dyn IndexProvider>, ProviderError> {
        let token = context_data.index_provider();

        if token.is_empty() || !self.registry.has(token) {
            return Err(ProviderError::new(
                "Invalid requested index provider",
                (!token.is_empty()).then_some(token),
            ));
        }

        let mut cache = self
            .providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(provider) = cache.get(token) {
            tracing::debug!(provider = token, "provider cache hit");
            return Ok(provider.clone());
        }

        let mut provider = self.registry.get(token)?;

        let options = self.apply_provider_options(provider.as_ref(), context_data)?;
        provider.configure(options).map_err(|e| {
            ProviderError::new(format!("provider rejected configuration: {e}"), Some(token))
        })?;
        provider.set_logger(self.logger.for_provider(token));

        tracing::debug!(
            provider = token,
            context = context_data.name(),
            "provider configured and cached"
        );

        let provider: Arc<dyn IndexProvider> = Arc::from(provider);
        cache.insert(token.to_string(), provider.clone());

        Ok(provider)
    }

    /// Resolve the output channel of a context's provider for a channel
    /// type.
    ///
    /// The provider is resolved first (which guarantees it is configured),
    /// then the context must have opted into the channel type via an
    /// `output_channel_<type>` key in its provider options.
    pub fn get_index_provider_output_channel(
        &self,
        context_data: &ContextData,
        channel_type: &str,
    ) -> Result<Box<dyn OutputChannel>, ProviderError> {
        let _provider = self.get_index_provider(context_data)?;

        let token = context_data.index_provider();
        let service_key = format!("{OUTPUT_CHANNEL_OPTION_PREFIX}{channel_type}");

        if !context_data
            .index_provider_options()
            .contains_key(&service_key)
        {
            return Err(ProviderError::new(
                format!("Invalid requested index output channel service \"{channel_type}\""),
                Some(token),
            ));
        }

        let factory = self.registry.get_output_channel(channel_type, token)?;

        Ok(factory.create())
    }

    /// Number of live cached provider instances.
    pub fn cached_providers(&self) -> usize {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Validate the context's provider options against the provider's
    /// schema, producing the merged option map.
    ///
    /// A schema mismatch is a configuration error; it is wrapped into a
    /// [`ProviderError`] carrying the token and the original cause.
    fn apply_provider_options(
        &self,
        provider: &dyn IndexProvider,
        context_data: &ContextData,
    ) -> Result<OptionsMap, ProviderError> {
        let token = context_data.index_provider();

        provider
            .accepted_options()
            .resolve(context_data.index_provider_options())
            .map_err(|e| {
                let cause = ContextConfigurationError::invalid_options(
                    context_data.name(),
                    e.to_string(),
                );
                ProviderError::with_cause(cause.to_string(), Some(token), cause)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelQuery;
    use crate::config::OptionsMap;
    use crate::context::ContextDefinition;
    use crate::provider::OptionSchema;
    use crate::result::RawResult;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider;

    #[async_trait]
    impl IndexProvider for StubProvider {
        fn accepted_options(&self) -> OptionSchema {
            OptionSchema::new().required("index")
        }

        fn configure(&mut self, _options: OptionsMap) -> anyhow::Result<()> {
            Ok(())
        }

        fn set_logger(&mut self, _logger: SearchLogger) {}

        async fn query(&self, _query: ChannelQuery) -> anyhow::Result<RawResult> {
            Ok(RawResult::empty())
        }
    }

    fn manager_with_counter() -> (Arc<IndexManager>, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let mut registry = ProviderRegistry::new();
        {
            let created = created.clone();
            registry.register_provider(
                "es",
                Arc::new(move || {
                    created.fetch_add(1, Ordering::SeqCst);
                    Box::new(StubProvider) as Box<dyn IndexProvider>
                }),
            );
        }
        let manager = Arc::new(IndexManager::new(
            Arc::new(registry),
            SearchLogger::new(),
        ));
        (manager, created)
    }

    fn shop_data() -> ContextData {
        let mut options = OptionsMap::new();
        options.insert("index".to_string(), json!("products"));
        ContextData::new(Arc::new(ContextDefinition::new(
            "shop",
            "es",
            options,
            HashMap::new(),
        )))
    }

    #[test]
    fn concurrent_first_resolutions_yield_one_instance() {
        let (manager, created) = manager_with_counter();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                std::thread::spawn(move || {
                    manager.get_index_provider(&shop_data()).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(manager.cached_providers(), 1);
    }
}
