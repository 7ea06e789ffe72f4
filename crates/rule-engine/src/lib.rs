//! Hazard extraction and answer planning.
//!
//! [`ContextExtractor`] turns task text into hazard flags, [`RuleSet`] holds
//! the operator tables, [`AnswerEngine`] resolves answers and
//! [`PlanBuilder`] combines them into a [`Plan`]. Nothing in this crate
//! touches the UI.

pub mod catalogue;
pub mod context;
pub mod engine;
pub mod errors;
pub mod loader;
pub mod plan;
pub mod ruleset;

pub use context::ContextExtractor;
pub use engine::{
    AnswerEngine, DynamicResolution, QuestionCatalogue, ResolutionSource, ResolvedQuestion,
};
pub use errors::RuleError;
pub use plan::{Plan, PlanBuilder};
pub use ruleset::{OverrideRule, RuleSet, RuleSetBuilder};

use std::sync::Arc;

/// Builds a [`PlanBuilder`] over the built-in catalogues and the given rules.
pub fn planner(rules: Arc<RuleSet>) -> Result<PlanBuilder, RuleError> {
    let engine = AnswerEngine::new(rules, Arc::new(QuestionCatalogue::builtin()?));
    Ok(PlanBuilder::new(engine, Arc::new(ContextExtractor::builtin()?)))
}

#[cfg(test)]
mod tests;
