use clap::Subcommand;

use super::catalogue::CatalogueArgs;
use super::plan::PlanArgs;
use super::simulate::SimulateArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Build a plan from task text alone and print it
    Plan(PlanArgs),

    /// Fill in-memory form fixtures end to end
    Simulate(SimulateArgs),

    /// Print the ordered safety-analysis question catalogue
    Catalogue(CatalogueArgs),
}
