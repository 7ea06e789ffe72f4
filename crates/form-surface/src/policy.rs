use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::ClickMethod;

/// Interaction settings read from the `interaction` section of the config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionPolicy {
    pub timeouts: InteractionTimeouts,
    /// Methods tried in order when activating a radio, label or button.
    pub click_order: Vec<ClickMethod>,
    /// Methods tried in order for checkboxes, where a double activation
    /// would undo itself.
    pub toggle_order: Vec<ClickMethod>,
}

impl Default for InteractionPolicy {
    fn default() -> Self {
        Self {
            timeouts: InteractionTimeouts::default(),
            click_order: vec![
                ClickMethod::PointerDouble,
                ClickMethod::Direct,
                ClickMethod::Forced,
            ],
            toggle_order: vec![ClickMethod::Direct, ClickMethod::Forced],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTimeouts {
    pub tab_ms: u64,
    pub marker_ms: u64,
    pub confirm_ms: u64,
    pub locate_cap_ms: u64,
    pub dialog_ms: u64,
    pub radio_wait_ms: u64,
    pub poll_interval_ms: u64,
    pub stable_for_ms: u64,
    pub settle_ms: u64,
}

impl InteractionTimeouts {
    pub fn tab(&self) -> Duration {
        Duration::from_millis(self.tab_ms)
    }

    pub fn marker(&self) -> Duration {
        Duration::from_millis(self.marker_ms)
    }

    pub fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }

    /// Upper bound for a single element search, whatever the caller's budget.
    pub fn locate(&self, budget: Duration) -> Duration {
        budget.min(Duration::from_millis(self.locate_cap_ms))
    }

    pub fn dialog(&self) -> Duration {
        Duration::from_millis(self.dialog_ms)
    }

    pub fn radio_wait(&self) -> Duration {
        Duration::from_millis(self.radio_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn stable_for(&self) -> Duration {
        Duration::from_millis(self.stable_for_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for InteractionTimeouts {
    fn default() -> Self {
        Self {
            tab_ms: 15_000,
            marker_ms: 5_000,
            confirm_ms: 20_000,
            locate_cap_ms: 8_000,
            dialog_ms: 3_000,
            radio_wait_ms: 8_000,
            poll_interval_ms: 150,
            stable_for_ms: 600,
            settle_ms: 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_is_capped() {
        let timeouts = InteractionTimeouts::default();
        assert_eq!(timeouts.locate(timeouts.confirm()), Duration::from_secs(8));
        assert_eq!(
            timeouts.locate(Duration::from_secs(2)),
            Duration::from_secs(2)
        );
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let policy: InteractionPolicy =
            serde_yaml::from_str("timeouts:\n  tab_ms: 1000\n").unwrap();
        assert_eq!(policy.timeouts.tab_ms, 1000);
        assert_eq!(policy.timeouts.confirm_ms, 20_000);
        assert_eq!(policy.toggle_order, vec![ClickMethod::Direct, ClickMethod::Forced]);
    }
}
