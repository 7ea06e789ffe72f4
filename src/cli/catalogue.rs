use anyhow::Result;
use clap::Args;
use hotwork_rule_engine::catalogue::{FallbackSpec, QUESTION_PATTERNS};
use serde_json::json;

use crate::output::render_catalogue;

#[derive(Args, Clone, Debug)]
pub struct CatalogueArgs {
    /// Output JSON instead of the table
    #[arg(long)]
    pub json: bool,
}

pub fn cmd_catalogue(args: CatalogueArgs) -> Result<()> {
    if args.json {
        let entries: Vec<_> = QUESTION_PATTERNS
            .iter()
            .map(|entry| {
                let fallback = match entry.fallback {
                    Some(FallbackSpec::Flag(flag)) => json!({ "flag": flag }),
                    Some(FallbackSpec::Literal(answer)) => json!({ "literal": answer.label() }),
                    None => json!(null),
                };
                json!({
                    "key": entry.key,
                    "pattern": entry.pattern,
                    "fallback": fallback,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print!("{}", render_catalogue(QUESTION_PATTERNS));
    }
    Ok(())
}
