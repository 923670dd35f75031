//! Shared logger collaborator handed to providers.

use std::sync::Arc;

/// Cheap clonable logging handle scoping events to a provider token.
///
/// The Index Manager attaches one of these to every provider it configures;
/// providers log through it so backend events carry the token they belong
/// to. Events are emitted through `tracing`, so subscribers installed by
/// the embedding application decide where they go.
#[derive(Debug, Clone, Default)]
pub struct SearchLogger {
    provider: Option<Arc<str>>,
}

impl SearchLogger {
    /// Create an unscoped logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a handle scoped to a provider token.
    pub fn for_provider(&self, provider: &str) -> Self {
        Self {
            provider: Some(Arc::from(provider)),
        }
    }

    fn token(&self) -> &str {
        self.provider.as_deref().unwrap_or("-")
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(provider = self.token(), "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(provider = self.token(), "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(provider = self.token(), "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(provider = self.token(), "{message}");
    }
}
