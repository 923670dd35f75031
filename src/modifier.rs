//! Named result modifiers and the ordered filter/action pipeline.

use anyhow::Result;
use std::sync::Arc;

use crate::channel::DispatchContext;
use crate::result::RawResult;

/// Decision returned by a filter.
///
/// Rejection is expected control flow, not a fault: a rejecting filter
/// short-circuits the remaining filters and all actions, and its result
/// becomes the terminal result of the dispatch.
#[derive(Debug)]
pub enum FilterOutcome {
    /// Continue the pipeline with the (possibly reshaped) result.
    Accepted(RawResult),
    /// Stop the pipeline; this result is terminal.
    Rejected(RawResult),
}

/// A named transform that may reshape or reject a raw result.
pub trait ModifierFilter: Send + Sync {
    fn name(&self) -> &str;

    fn filter(&self, result: RawResult, ctx: &DispatchContext) -> FilterOutcome;
}

/// A named side-effecting transform applied after all filters accepted.
///
/// A single action name may map to zero or more actions; each receives the
/// result produced by its predecessor.
pub trait ModifierAction: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, result: RawResult, ctx: &DispatchContext) -> Result<RawResult>;
}

/// How a pipeline run ended.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// All filters accepted and all actions ran.
    Completed(RawResult),
    /// A filter rejected; its terminal result is carried along with the
    /// rejecting filter's name.
    Rejected { filter: String, result: RawResult },
}

impl PipelineOutcome {
    /// The final result either way.
    pub fn into_result(self) -> RawResult {
        match self {
            Self::Completed(result) => result,
            Self::Rejected { result, .. } => result,
        }
    }
}

/// Ordered modifier pipeline for one output channel.
///
/// Assembled once per channel configuration by the Output Channel Manager
/// and cached alongside it. Filters run strictly before actions, each in
/// declared order.
pub struct ModifierPipeline {
    filters: Vec<Arc<dyn ModifierFilter>>,
    actions: Vec<Arc<dyn ModifierAction>>,
}

impl ModifierPipeline {
    pub fn new(
        filters: Vec<Arc<dyn ModifierFilter>>,
        actions: Vec<Arc<dyn ModifierAction>>,
    ) -> Self {
        Self { filters, actions }
    }

    /// A pipeline with nothing to apply.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.actions.is_empty()
    }

    /// Run the configured filters, then actions, over a raw result.
    ///
    /// The first rejecting filter aborts the run; no further filters or
    /// actions execute. Action failures propagate as errors.
    pub fn run(&self, result: RawResult, ctx: &DispatchContext) -> Result<PipelineOutcome> {
        let mut current = result;

        for filter in &self.filters {
            match filter.filter(current, ctx) {
                FilterOutcome::Accepted(next) => current = next,
                FilterOutcome::Rejected(terminal) => {
                    tracing::debug!(
                        context = ctx.context.name(),
                        channel = ctx.channel.as_str(),
                        filter = filter.name(),
                        "filter rejected result, skipping remaining modifiers"
                    );
                    return Ok(PipelineOutcome::Rejected {
                        filter: filter.name().to_string(),
                        result: terminal,
                    });
                }
            }
        }

        for action in &self.actions {
            current = action.apply(current, ctx)?;
        }

        Ok(PipelineOutcome::Completed(current))
    }
}
