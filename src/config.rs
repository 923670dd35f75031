//! TOML configuration parsing for search contexts.
//!
//! A configuration file declares named contexts, each binding one provider
//! token to a provider-specific option map and a set of output channels:
//!
//! ```toml
//! [contexts.shop]
//! provider = "es"
//!
//! [contexts.shop.options]
//! index = "products"
//! output_channel_autocomplete = "es_autocomplete"
//!
//! [contexts.shop.channels.autocomplete]
//! filters = ["strip_empty"]
//! actions = ["highlight"]
//! items_per_page = 10
//! ```
//!
//! Option maps are carried as opaque JSON values; the core never interprets
//! them beyond schema validation against the owning provider.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::error::ContextConfigurationError;

/// Opaque provider/channel option map.
pub type OptionsMap = serde_json::Map<String, Value>;

/// Option keys starting with this prefix opt a context into an output
/// channel type; their values name the channel service to use.
pub const OUTPUT_CHANNEL_OPTION_PREFIX: &str = "output_channel_";

/// Top-level search configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchConfig {
    /// Configured contexts keyed by name.
    #[serde(default)]
    pub contexts: HashMap<String, ContextConfig>,
}

/// Configuration of a single search context.
#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    /// Token of the index provider this context dispatches to.
    pub provider: String,
    /// Provider-specific options, validated against the provider's
    /// accepted-option schema on first use.
    #[serde(default)]
    pub options: OptionsMap,
    /// Output channels this context exposes, keyed by channel name.
    #[serde(default)]
    pub channels: HashMap<String, ChannelConfig>,
}

/// Configuration of one output channel within a context.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChannelConfig {
    /// Filter names applied to the raw result, in declared order.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Action names applied after the filters, in declared order.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Channel-specific options, passed to the channel when no runtime
    /// options builder is registered for the provider.
    #[serde(default)]
    pub options: OptionsMap,
    /// Page size used by pagination-aware callers.
    #[serde(default = "default_items_per_page")]
    pub items_per_page: usize,
}

fn default_items_per_page() -> usize {
    10
}

/// Load a configuration file and validate its structure.
///
/// Unknown provider tokens are *not* checked here — provider registration
/// happens at bootstrap and is a dispatch-time concern. What is rejected:
/// empty context names, empty provider tokens, empty channel names, and
/// `output_channel_*` opt-in keys whose value is not a service name.
pub fn load_config(path: &Path) -> Result<SearchConfig, ContextConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ContextConfigurationError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let config: SearchConfig =
        toml::from_str(&content).map_err(|e| ContextConfigurationError::Parse(e.to_string()))?;

    validate_config(&config)?;

    Ok(config)
}

/// Structural validation shared by [`load_config`] and programmatic
/// configuration assembly.
pub fn validate_config(config: &SearchConfig) -> Result<(), ContextConfigurationError> {
    for (name, context) in &config.contexts {
        if name.trim().is_empty() {
            return Err(ContextConfigurationError::Parse(
                "context names must not be empty".to_string(),
            ));
        }
        if context.provider.trim().is_empty() {
            return Err(ContextConfigurationError::malformed(
                name,
                "missing provider token",
            ));
        }
        for channel_name in context.channels.keys() {
            if channel_name.trim().is_empty() {
                return Err(ContextConfigurationError::malformed(
                    name,
                    "channel names must not be empty",
                ));
            }
        }
        for (key, value) in &context.options {
            if key.starts_with(OUTPUT_CHANNEL_OPTION_PREFIX) && !value.is_string() {
                return Err(ContextConfigurationError::malformed(
                    name,
                    format!("option \"{key}\" must name a channel service"),
                ));
            }
        }
    }
    Ok(())
}
