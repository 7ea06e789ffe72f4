//! Application configuration read from `config.yaml`.
//!
//! Every field is optional in the file; an absent file means defaults.

use std::path::{Path, PathBuf};

use hotwork_form_surface::InteractionPolicy;
use serde::{Deserialize, Serialize};

/// Rule file used when neither the command line nor the config names one.
pub const DEFAULT_RULES_PATH: &str = "config/rules.yaml";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Rule file; relative paths are taken from the working directory.
    pub rules_path: Option<PathBuf>,
    /// Log filter used when neither `RUST_LOG` nor `--log-level` is given.
    pub log_level: Option<String>,
    /// Timeouts and click strategies for the form.
    pub interaction: InteractionPolicy,
}

impl AppConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Picks the rule file: explicit argument, then config, then the default
    /// location.
    pub fn resolve_rules_path(&self, explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.rules_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_PATH))
    }
}
