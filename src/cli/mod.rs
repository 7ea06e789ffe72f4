pub mod app;
pub mod catalogue;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod plan;
pub mod runtime;
pub mod simulate;

pub use app::run;
pub use catalogue::{cmd_catalogue, CatalogueArgs};
pub use plan::{cmd_plan, PlanArgs};
pub use simulate::{cmd_simulate, SimulateArgs};
