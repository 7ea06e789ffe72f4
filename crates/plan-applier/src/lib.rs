//! Applies a resolved [`hotwork_rule_engine::Plan`] to the permit form.
//!
//! [`PlanApplier`] walks the plan's panels in their fixed order through the
//! form-surface navigator and returns an [`ApplyReport`] with per-panel
//! counters, warnings and the safety-analysis answers actually set.

pub mod applier;
pub mod errors;
pub mod report;

pub use applier::PlanApplier;
pub use errors::ApplyError;
pub use report::{ApplyReport, PanelReport};
