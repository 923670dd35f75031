//! Error types for the dispatch engine.
//!
//! Configuration problems are always detected before a provider or backend
//! is touched; backend failures cross the output-channel boundary as
//! [`anyhow::Error`] and are wrapped with dispatch context so callers can
//! log and respond without re-deriving state.

use thiserror::Error;

/// A context is unknown, structurally invalid, or its provider options
/// failed validation against the provider's accepted-option schema.
#[derive(Error, Debug)]
pub enum ContextConfigurationError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {reason}")]
    Read { path: String, reason: String },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// No context with the requested name is configured.
    #[error("unknown search context \"{0}\"")]
    UnknownContext(String),

    /// The context exists but its configuration is structurally invalid.
    #[error("search context \"{context}\" is malformed: {reason}")]
    Malformed { context: String, reason: String },

    /// The context's provider options were rejected by the provider schema.
    #[error("provider options for context \"{context}\" rejected: {reason}")]
    InvalidProviderOptions { context: String, reason: String },
}

impl ContextConfigurationError {
    /// Create a malformed-context error.
    pub fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid-provider-options error.
    pub fn invalid_options(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProviderOptions {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// A provider option failed to resolve against an [`OptionSchema`].
///
/// [`OptionSchema`]: crate::provider::OptionSchema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// A required option was not provided by the context configuration.
    #[error("missing required option \"{0}\"")]
    MissingRequired(String),

    /// An option was provided that the schema does not declare.
    #[error("unknown option \"{0}\"")]
    UnknownOption(String),
}

/// A requested provider token or output-channel type could not be resolved,
/// or the provider rejected its configuration.
///
/// Carries the offending token and, where the failure originated as a
/// configuration mismatch, the original cause.
#[derive(Error, Debug)]
#[error("{message} [provider: {}]", .token.as_deref().unwrap_or("<none>"))]
pub struct ProviderError {
    /// Human-readable failure description.
    pub message: String,
    /// The provider token the failure relates to, if one was requested.
    pub token: Option<String>,
    /// Original cause, when the failure wraps a configuration error.
    #[source]
    pub source: Option<ContextConfigurationError>,
}

impl ProviderError {
    /// Create a provider error for a token without an underlying cause.
    pub fn new(message: impl Into<String>, token: Option<&str>) -> Self {
        Self {
            message: message.into(),
            token: token.map(str::to_owned),
            source: None,
        }
    }

    /// Create a provider error wrapping a configuration failure.
    pub fn with_cause(
        message: impl Into<String>,
        token: Option<&str>,
        cause: ContextConfigurationError,
    ) -> Self {
        Self {
            message: message.into(),
            token: token.map(str::to_owned),
            source: Some(cause),
        }
    }
}

/// Top-level failure of a dispatch call.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Context unknown, malformed, or options failed schema validation.
    #[error(transparent)]
    Configuration(#[from] ContextConfigurationError),

    /// Provider token or output-channel type not registered, or the
    /// provider rejected its configuration.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The output channel (or a modifier acting on its result) failed.
    #[error("query \"{query_type}\" on context \"{context}\" (channel \"{channel}\") failed: {source}")]
    Execution {
        context: String,
        channel: String,
        query_type: String,
        #[source]
        source: anyhow::Error,
    },

    /// Dispatch was aborted by a caller-supplied deadline.
    #[error("query \"{query_type}\" on context \"{context}\" cancelled after {elapsed_ms} ms")]
    Cancelled {
        context: String,
        query_type: String,
        elapsed_ms: u64,
    },
}

impl DispatchError {
    /// Returns `true` for cancellation, which callers may treat as
    /// non-fatal-to-report.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
