//! Output channels and the per-provider runtime strategy seams.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::OptionsMap;
use crate::context::ContextDefinition;
use crate::result::RawResult;

/// Identity of an in-flight dispatch, shared with runtime strategies,
/// modifiers, and normalizers so they can act on configuration without
/// re-deriving it.
#[derive(Debug, Clone)]
pub struct DispatchContext {
    /// The resolved context definition.
    pub context: Arc<ContextDefinition>,
    /// Channel name as requested by the caller (e.g. `"autocomplete"`).
    pub channel: String,
    /// Channel service name the context opted into for this channel type.
    pub service: String,
}

/// Query handed to an output channel for execution.
#[derive(Debug, Clone)]
pub struct ChannelQuery {
    /// Channel type this query targets.
    pub channel: String,
    /// Provider-native query, or the raw request payload when no runtime
    /// query provider is registered for the provider.
    pub query: Value,
    /// Runtime options built for this dispatch, or the channel's static
    /// configured options when no builder is registered.
    pub options: OptionsMap,
}

/// A named, provider-scoped endpoint capable of executing a query.
///
/// `execute` is the only point of a dispatch expected to block (network
/// I/O to a search backend); implementations return backend failures as
/// plain [`anyhow::Error`] and the dispatcher wraps them with context.
#[async_trait]
pub trait OutputChannel: Send + Sync {
    /// Channel service name (e.g. `"es_autocomplete"`).
    fn name(&self) -> &str;

    /// Execute the query against the backend and produce a raw result.
    async fn execute(&self, query: ChannelQuery) -> Result<RawResult>;
}

impl std::fmt::Debug for dyn OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn OutputChannel")
    }
}

/// Factory producing output channels, registered per
/// (channel type, provider token) pair.
///
/// Channels are looked up per dispatch and never cached outside the
/// provider, so factories must be cheap.
pub trait OutputChannelFactory: Send + Sync {
    fn create(&self) -> Box<dyn OutputChannel>;
}

impl<F> OutputChannelFactory for F
where
    F: Fn() -> Box<dyn OutputChannel> + Send + Sync,
{
    fn create(&self) -> Box<dyn OutputChannel> {
        self()
    }
}

/// Builds provider-specific query options from an incoming request.
///
/// Stateless, keyed by provider token, invoked fresh per dispatch. When no
/// builder is registered the channel receives only its static configured
/// options.
pub trait RuntimeOptionsBuilder: Send + Sync {
    fn build_options(&self, payload: &Value, ctx: &DispatchContext) -> Result<OptionsMap>;
}

/// Translates an incoming request into a provider-native query.
///
/// Stateless, keyed by provider token, invoked fresh per dispatch. When no
/// query provider is registered the channel's `execute` receives the raw
/// request unchanged.
pub trait RuntimeQueryProvider: Send + Sync {
    fn build_query(
        &self,
        payload: &Value,
        options: &OptionsMap,
        ctx: &DispatchContext,
    ) -> Result<Value>;
}
