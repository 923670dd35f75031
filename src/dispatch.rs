//! The query dispatch orchestrator.
//!
//! Ties the resolver and both managers together for query-type requests
//! (autocomplete, suggestions, generic search): resolve the context and
//! channel, compose runtime options and the provider-native query, execute
//! against the backend, then run the channel's modifier pipeline over the
//! raw result.

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::channel::{ChannelQuery, DispatchContext};
use crate::channel_manager::OutputChannelManager;
use crate::config::{OptionsMap, SearchConfig};
use crate::context::{ContextData, ContextResolver};
use crate::error::DispatchError;
use crate::index_manager::IndexManager;
use crate::logger::SearchLogger;
use crate::modifier::PipelineOutcome;
use crate::registry::ProviderRegistry;
use crate::result::RawResult;

/// An incoming query request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Opaque request payload (query string, parameters).
    pub payload: Value,
    /// Caller deadline for the backend call. The only long-running step
    /// of a dispatch is the channel's `execute`; the deadline applies
    /// there and surfaces as [`DispatchError::Cancelled`].
    pub timeout: Option<Duration>,
}

impl SearchRequest {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Final result of a dispatch, carrying the resolved identity so
/// transport-layer callers can respond without re-deriving state.
#[derive(Debug)]
pub struct DispatchOutcome {
    pub context: String,
    pub query_type: String,
    /// Channel service name the context opted into.
    pub service: String,
    /// Name of the filter that rejected the result, when one did.
    pub rejected_by: Option<String>,
    pub result: RawResult,
}

/// Routes a named search context to its provider's output channel and
/// post-processes the raw result.
pub struct QueryDispatcher {
    resolver: ContextResolver,
    index_manager: IndexManager,
    channel_manager: OutputChannelManager,
}

impl QueryDispatcher {
    pub fn new(
        resolver: ContextResolver,
        index_manager: IndexManager,
        channel_manager: OutputChannelManager,
    ) -> Self {
        Self {
            resolver,
            index_manager,
            channel_manager,
        }
    }

    pub fn resolver(&self) -> &ContextResolver {
        &self.resolver
    }

    pub fn index_manager(&self) -> &IndexManager {
        &self.index_manager
    }

    pub fn channel_manager(&self) -> &OutputChannelManager {
        &self.channel_manager
    }

    /// Dispatch a query-type request against a context's output channel.
    ///
    /// Steps: resolve context and channel (configuration mismatches fail
    /// here, before any backend call), build runtime options and the
    /// provider-native query, execute, then run filters and actions in
    /// declared order. The first rejecting filter short-circuits the
    /// pipeline and its result is returned as terminal.
    pub async fn dispatch_output_channel_query(
        &self,
        context_name: &str,
        query_type: &str,
        request: SearchRequest,
    ) -> Result<DispatchOutcome, DispatchError> {
        let definition = self.resolver.resolve(context_name)?;
        let context_data = ContextData::new(definition.clone());

        let channel = self
            .index_manager
            .get_index_provider_output_channel(&context_data, query_type)?;

        // Channel opt-in was checked during channel resolution.
        let service = definition
            .output_channel_service(query_type)
            .unwrap_or(query_type)
            .to_string();

        let ctx = DispatchContext {
            context: definition.clone(),
            channel: query_type.to_string(),
            service: service.clone(),
        };

        let options = self.runtime_options(&request.payload, &ctx)?;
        let query = self.native_query(&request.payload, &options, &ctx)?;

        tracing::debug!(
            context = context_name,
            query_type,
            service = service.as_str(),
            "executing output channel query"
        );

        let channel_query = ChannelQuery {
            channel: query_type.to_string(),
            query,
            options,
        };

        let started = Instant::now();
        let executed = match request.timeout {
            Some(timeout) => tokio::time::timeout(timeout, channel.execute(channel_query))
                .await
                .map_err(|_| DispatchError::Cancelled {
                    context: context_name.to_string(),
                    query_type: query_type.to_string(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                })?,
            None => channel.execute(channel_query).await,
        };

        let mut raw = executed.map_err(|e| self.execution_error(context_name, &service, query_type, e))?;
        raw.insert_metadata(
            "execution_time_ms",
            json!(started.elapsed().as_millis() as u64),
        );

        let pipeline = self
            .channel_manager
            .pipeline(&definition, query_type, &service);

        let outcome = pipeline
            .run(raw, &ctx)
            .map_err(|e| self.execution_error(context_name, &service, query_type, e))?;

        let (rejected_by, result) = match outcome {
            PipelineOutcome::Completed(result) => (None, result),
            PipelineOutcome::Rejected { filter, result } => (Some(filter), result),
        };

        Ok(DispatchOutcome {
            context: context_name.to_string(),
            query_type: query_type.to_string(),
            service,
            rejected_by,
            result,
        })
    }

    /// Runtime options for this dispatch: built by the provider's options
    /// builder when one is registered, otherwise the channel's static
    /// configured options.
    fn runtime_options(
        &self,
        payload: &Value,
        ctx: &DispatchContext,
    ) -> Result<OptionsMap, DispatchError> {
        let token = ctx.context.provider_token();

        match self
            .channel_manager
            .get_output_channel_runtime_options_builder(token)
        {
            Some(builder) => builder
                .build_options(payload, ctx)
                .map_err(|e| self.execution_error(ctx.context.name(), &ctx.service, &ctx.channel, e)),
            None => Ok(ctx
                .context
                .channel(&ctx.channel)
                .map(|c| c.options.clone())
                .unwrap_or_default()),
        }
    }

    /// Provider-native query: translated by the provider's query provider
    /// when one is registered, otherwise the raw request payload.
    fn native_query(
        &self,
        payload: &Value,
        options: &OptionsMap,
        ctx: &DispatchContext,
    ) -> Result<Value, DispatchError> {
        let token = ctx.context.provider_token();

        match self
            .channel_manager
            .get_output_channel_runtime_query_provider(token)
        {
            Some(provider) => provider
                .build_query(payload, options, ctx)
                .map_err(|e| self.execution_error(ctx.context.name(), &ctx.service, &ctx.channel, e)),
            None => Ok(payload.clone()),
        }
    }

    fn execution_error(
        &self,
        context: &str,
        channel: &str,
        query_type: &str,
        source: anyhow::Error,
    ) -> DispatchError {
        DispatchError::Execution {
            context: context.to_string(),
            channel: channel.to_string(),
            query_type: query_type.to_string(),
            source,
        }
    }
}

/// Convenience bootstrap: wire a dispatcher from loaded configuration, a
/// populated registry, and an already-assembled channel manager.
pub fn build_dispatcher(
    config: &SearchConfig,
    registry: Arc<ProviderRegistry>,
    channel_manager: OutputChannelManager,
    logger: SearchLogger,
) -> QueryDispatcher {
    let resolver = ContextResolver::new(config);
    let index_manager = IndexManager::new(registry, logger);
    QueryDispatcher::new(resolver, index_manager, channel_manager)
}
