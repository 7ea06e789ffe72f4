use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use hotwork_core_types::TaskId;
use hotwork_form_surface::MemoryForm;
use tokio::fs;

use crate::cli::context::CliContext;
use crate::output::render_outcome;
use crate::runner::{FormTask, TaskRunner};

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Form fixture (YAML); repeat to run a batch in order
    #[arg(short, long = "form", value_name = "FILE", required = true)]
    pub forms: Vec<PathBuf>,

    /// Rule file (defaults to the configured one)
    #[arg(short, long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Output JSON instead of the human summary
    #[arg(long)]
    pub json: bool,
}

pub async fn cmd_simulate(args: SimulateArgs, ctx: &CliContext) -> Result<()> {
    let rules = ctx.load_rules(args.rules.as_deref())?;
    let runner = TaskRunner::new(rules, ctx.config().interaction.clone())?;

    let mut forms = Vec::with_capacity(args.forms.len());
    for path in &args.forms {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read form fixture {}", path.display()))?;
        let form = MemoryForm::from_yaml(&content)
            .with_context(|| format!("Failed to parse form fixture {}", path.display()))?;
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        forms.push((TaskId::new(id), form));
    }
    let tasks: Vec<FormTask<'_>> = forms
        .iter()
        .map(|(id, form)| FormTask {
            id: id.clone(),
            surface: form,
        })
        .collect();

    let outcomes = runner.run_batch(&tasks).await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        for outcome in &outcomes {
            print!("{}", render_outcome(outcome));
        }
    }

    if let Some(aborted) = outcomes.iter().find(|outcome| outcome.is_aborted()) {
        bail!("task {} aborted: session lost", aborted.task_id);
    }
    Ok(())
}
