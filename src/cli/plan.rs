use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use hotwork_core_types::{TaskId, TaskText};
use hotwork_rule_engine::planner;

use crate::cli::context::CliContext;
use crate::output::render_plan;

#[derive(Args, Clone, Debug)]
pub struct PlanArgs {
    /// Rule file (defaults to the configured one)
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Task description
    #[arg(short, long)]
    pub description: String,

    /// Work characteristics, comma separated
    #[arg(long, default_value = "")]
    pub characteristics: String,

    /// Record identifier shown in the output
    #[arg(long)]
    pub task: Option<String>,

    /// Output JSON instead of the human summary
    #[arg(long)]
    pub json: bool,
}

pub async fn cmd_plan(args: PlanArgs, ctx: &CliContext) -> Result<()> {
    let rules = ctx.load_rules(args.rules.as_deref())?;
    let builder = planner(rules)?;
    let text = TaskText::new(args.description, args.characteristics);
    let mut plan = builder.build(&text, &[]);
    if let Some(task) = args.task {
        plan = plan.with_task_id(TaskId::new(task));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", render_plan(&plan));
    }
    Ok(())
}
