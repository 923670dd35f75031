//! Process-wide catalog of installed index providers and their output
//! channel factories.
//!
//! The registry is an explicitly constructed object passed into the
//! managers that need it — no ambient global state. Registration happens
//! once at bootstrap; during dispatch the registry is read-only, so
//! concurrent reads need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::channel::OutputChannelFactory;
use crate::error::ProviderError;
use crate::provider::IndexProvider;

/// Factory producing fresh, unconfigured provider instances.
///
/// The registry catalogs factories, not live instances; the Index Manager
/// owns instance lifetime and caching.
pub trait ProviderFactory: Send + Sync {
    fn create(&self) -> Box<dyn IndexProvider>;
}

impl<F> ProviderFactory for F
where
    F: Fn() -> Box<dyn IndexProvider> + Send + Sync,
{
    fn create(&self) -> Box<dyn IndexProvider> {
        self()
    }
}

/// Catalog of provider factories by token and output-channel factories by
/// (channel type, provider token).
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn ProviderFactory>>,
    output_channels: HashMap<(String, String), Arc<dyn OutputChannelFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory under a token. A later registration
    /// for the same token replaces the earlier one.
    pub fn register_provider(
        &mut self,
        token: impl Into<String>,
        factory: Arc<dyn ProviderFactory>,
    ) {
        self.providers.insert(token.into(), factory);
    }

    /// Register an output-channel factory for a (channel type, token) pair.
    pub fn register_output_channel(
        &mut self,
        channel_type: impl Into<String>,
        token: impl Into<String>,
        factory: Arc<dyn OutputChannelFactory>,
    ) {
        self.output_channels
            .insert((channel_type.into(), token.into()), factory);
    }

    pub fn has(&self, token: &str) -> bool {
        self.providers.contains_key(token)
    }

    /// Produce a fresh, unconfigured provider instance for a token.
    pub fn get(&self, token: &str) -> Result<Box<dyn IndexProvider>, ProviderError> {
        self.providers
            .get(token)
            .map(|factory| factory.create())
            .ok_or_else(|| ProviderError::new("index provider is not registered", Some(token)))
    }

    /// Look up the output-channel factory for a (channel type, token) pair.
    pub fn get_output_channel(
        &self,
        channel_type: &str,
        token: &str,
    ) -> Result<Arc<dyn OutputChannelFactory>, ProviderError> {
        self.output_channels
            .get(&(channel_type.to_string(), token.to_string()))
            .cloned()
            .ok_or_else(|| {
                ProviderError::new(
                    format!("output channel \"{channel_type}\" is not registered"),
                    Some(token),
                )
            })
    }

    pub fn provider_tokens(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }
}
