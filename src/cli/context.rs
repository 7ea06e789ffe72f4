use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use hotwork_rule_engine::RuleSet;
use tracing::info;

use crate::config::AppConfig;

pub struct CliContext {
    config: Arc<AppConfig>,
    config_path: PathBuf,
}

impl CliContext {
    pub fn new(config: AppConfig, config_path: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
        }
    }

    pub fn config(&self) -> &AppConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the rule file named on the command line, in the config, or at
    /// the default location.
    pub fn load_rules(&self, explicit: Option<&Path>) -> Result<Arc<RuleSet>> {
        let path = self.config.resolve_rules_path(explicit);
        let rules = RuleSet::load(&path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?;
        info!(path = %path.display(), "rules loaded");
        Ok(Arc::new(rules))
    }
}
