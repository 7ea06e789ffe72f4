//! Hot-work permit filler
//!
//! Command-line front end over the planning and form crates, plus the batch
//! runner used by `hotwork simulate`.

pub mod cli;
pub mod config;
pub mod output;
pub mod runner;

pub use config::AppConfig;
pub use runner::{FormTask, TaskOutcome, TaskRunner, TaskStatus};
