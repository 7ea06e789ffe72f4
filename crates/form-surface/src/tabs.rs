//! Tab navigation and the per-panel confirm sequence.
//!
//! The navigator walks `Idle -> Navigating -> Active -> ContentLoaded ->
//! Confirming -> Confirmed` for each panel. Navigation is only accepted from `Idle` or
//! `Confirmed`; any other request is refused with
//! [`InteractionError::NavigationBlocked`]. `Idle` is reachable from every
//! state so a failed panel can be abandoned explicitly.

use std::fmt;

use hotwork_core_types::Panel;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::click::ClickChain;
use crate::errors::InteractionError;
use crate::policy::{InteractionPolicy, InteractionTimeouts};
use crate::ports::{ElementHandle, UiSurface};
use crate::selectors;
use crate::wait::{dismiss_dialogs, find_first, first_match, poll_until, wait_until_stable};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "panel")]
pub enum TabState {
    Idle,
    Navigating(Panel),
    /// The panel's tab reports itself active.
    Active(Panel),
    /// Content marker seen, or its soft wait elapsed.
    ContentLoaded(Panel),
    Confirming(Panel),
    Confirmed(Panel),
}

impl TabState {
    pub fn panel(&self) -> Option<Panel> {
        match self {
            TabState::Idle => None,
            TabState::Navigating(panel)
            | TabState::Active(panel)
            | TabState::ContentLoaded(panel)
            | TabState::Confirming(panel)
            | TabState::Confirmed(panel) => Some(*panel),
        }
    }

    /// Whether a new panel may be entered from this state.
    pub fn accepts_navigation(&self) -> bool {
        matches!(self, TabState::Idle | TabState::Confirmed(_))
    }

    pub fn can_transition(&self, next: TabState) -> bool {
        use TabState::*;
        match (*self, next) {
            (_, Idle) => true,
            (Idle | Confirmed(_), Navigating(_)) => true,
            (Navigating(a), Active(b))
            | (Active(a), ContentLoaded(b))
            | (ContentLoaded(a), Confirming(b))
            | (Confirming(a), Confirmed(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for TabState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabState::Idle => f.write_str("idle"),
            TabState::Navigating(panel) => write!(f, "navigating({panel})"),
            TabState::Active(panel) => write!(f, "active({panel})"),
            TabState::ContentLoaded(panel) => write!(f, "content_loaded({panel})"),
            TabState::Confirming(panel) => write!(f, "confirming({panel})"),
            TabState::Confirmed(panel) => write!(f, "confirmed({panel})"),
        }
    }
}

pub struct TabNavigator<'a> {
    surface: &'a dyn UiSurface,
    timeouts: InteractionTimeouts,
    click: ClickChain,
    state: TabState,
    history: Vec<TabState>,
}

impl<'a> TabNavigator<'a> {
    pub fn new(surface: &'a dyn UiSurface, policy: &InteractionPolicy) -> Self {
        Self {
            surface,
            timeouts: policy.timeouts.clone(),
            click: ClickChain::new(policy.click_order.clone()),
            state: TabState::Idle,
            history: vec![TabState::Idle],
        }
    }

    pub fn state(&self) -> TabState {
        self.state
    }

    /// Every state entered so far, starting with `Idle`.
    pub fn history(&self) -> &[TabState] {
        &self.history
    }

    fn transition(&mut self, next: TabState) -> Result<(), InteractionError> {
        if !self.state.can_transition(next) {
            return Err(InteractionError::NavigationBlocked {
                target: next.to_string(),
                state: self.state.to_string(),
            });
        }
        debug!(from = %self.state, to = %next, "tab state");
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// Opens the panel's tab, waits for it to become active, then gives the
    /// content marker a bounded chance to appear.
    ///
    /// A failed navigation leaves the navigator `Idle`, since nothing was
    /// entered.
    pub async fn goto_panel(&mut self, panel: Panel) -> Result<(), InteractionError> {
        if !self.state.accepts_navigation() {
            return Err(InteractionError::NavigationBlocked {
                target: TabState::Navigating(panel).to_string(),
                state: self.state.to_string(),
            });
        }
        self.transition(TabState::Navigating(panel))?;
        info!(panel = %panel, tab = panel.tab_label(), "opening panel");
        if let Err(err) = self.open_tab(panel).await {
            warn!(panel = %panel, error = %err, "navigation failed");
            self.transition(TabState::Idle)?;
            return Err(err);
        }
        self.transition(TabState::Active(panel))?;

        let markers = selectors::ready_markers(panel);
        let poll = self.timeouts.poll_interval();
        match find_first(self.surface, &markers, self.timeouts.marker(), poll).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(panel = %panel, "no content marker appeared; continuing"),
            Err(err) => {
                self.transition(TabState::Idle)?;
                return Err(err);
            }
        }
        self.transition(TabState::ContentLoaded(panel))
    }

    async fn open_tab(&self, panel: Panel) -> Result<(), InteractionError> {
        let surface = self.surface;
        let poll = self.timeouts.poll_interval();
        dismiss_dialogs(
            surface,
            &selectors::dialog_ok_buttons(),
            &self.click,
            self.timeouts.dialog(),
            poll,
        )
        .await?;

        let links = selectors::tab_link(panel);
        let tab = find_first(surface, &links, self.timeouts.locate(self.timeouts.tab()), poll)
            .await?
            .ok_or_else(|| InteractionError::NavigationFailed {
                panel,
                reason: format!("tab '{}' not found", panel.tab_label()),
            })?;

        if !is_tab_active(surface, tab).await? {
            self.click
                .activate(surface, tab)
                .await
                .map_err(|err| match err {
                    InteractionError::SessionLost(_) => err,
                    other => InteractionError::NavigationFailed {
                        panel,
                        reason: other.to_string(),
                    },
                })?;
        }

        let links_ref = &links;
        let active = poll_until(self.timeouts.tab(), poll, || async move {
            match first_match(surface, links_ref).await? {
                Some(tab) => Ok(is_tab_active(surface, tab).await?.then_some(())),
                None => Ok(None),
            }
        })
        .await?;
        if active.is_none() {
            return Err(InteractionError::PanelLoadTimeout {
                panel,
                waited_ms: self.timeouts.tab_ms,
            });
        }
        Ok(())
    }

    /// Runs the confirm sequence for the loaded panel.
    ///
    /// On failure the navigator stays `Confirming`, which blocks further
    /// navigation until [`TabNavigator::abandon`] is called.
    pub async fn confirm(&mut self) -> Result<(), InteractionError> {
        let panel = match self.state {
            TabState::ContentLoaded(panel) => panel,
            other => {
                return Err(InteractionError::NavigationBlocked {
                    target: "confirming".to_string(),
                    state: other.to_string(),
                })
            }
        };
        self.transition(TabState::Confirming(panel))?;
        info!(panel = %panel, "confirming panel");
        match self.run_confirm().await {
            Ok(()) => {
                info!(panel = %panel, "panel confirmed");
                self.transition(TabState::Confirmed(panel))
            }
            Err(InteractionError::SessionLost(reason)) => {
                Err(InteractionError::SessionLost(reason))
            }
            Err(err) => Err(InteractionError::ConfirmFailed {
                panel,
                reason: err.to_string(),
            }),
        }
    }

    async fn run_confirm(&self) -> Result<(), InteractionError> {
        let surface = self.surface;
        let poll = self.timeouts.poll_interval();
        let dialogs = selectors::dialog_ok_buttons();
        let buttons = selectors::confirm_buttons();
        let budget = self.timeouts.locate(self.timeouts.confirm());

        dismiss_dialogs(surface, &dialogs, &self.click, self.timeouts.dialog(), poll).await?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let button = find_first(surface, &buttons, budget, poll)
                .await?
                .ok_or_else(|| {
                    InteractionError::LocatorNotFound("confirm button".to_string())
                })?;
            if !wait_until_stable(surface, button, self.timeouts.stable_for(), poll, budget)
                .await?
            {
                debug!("confirm button kept moving; clicking anyway");
            }
            match self.click.activate(surface, button).await {
                Ok(_) => break,
                Err(err) if err.is_stale() && attempts < 2 => {
                    debug!("confirm button went stale; locating it again");
                }
                Err(err) => return Err(err),
            }
        }

        sleep(self.timeouts.settle()).await;
        dismiss_dialogs(surface, &dialogs, &self.click, self.timeouts.dialog(), poll).await?;

        let buttons_ref = &buttons;
        let ready = poll_until(budget, poll, || async move {
            match first_match(surface, buttons_ref).await? {
                Some(button) => Ok(surface.is_displayed(button).await?.then_some(())),
                None => Ok(None),
            }
        })
        .await?;
        if ready.is_none() {
            debug!("confirm button did not come back; continuing");
        }
        Ok(())
    }

    /// Leaves the current panel without confirming it.
    pub fn abandon(&mut self) {
        if self.state == TabState::Idle {
            return;
        }
        warn!(state = %self.state, "abandoning panel");
        self.state = TabState::Idle;
        self.history.push(TabState::Idle);
    }
}

/// Active when the link or its list item carries an `active` class, or the
/// link is `aria-selected`.
pub async fn is_tab_active(
    surface: &dyn UiSurface,
    tab: ElementHandle,
) -> Result<bool, InteractionError> {
    let class = surface.attribute(tab, "class").await?.unwrap_or_default();
    if class.split_whitespace().any(|c| c == "active") {
        return Ok(true);
    }
    if surface.attribute(tab, "aria-selected").await?.as_deref() == Some("true") {
        return Ok(true);
    }
    if let Some(item) = surface.parent(tab).await? {
        let class = surface.attribute(item, "class").await?.unwrap_or_default();
        return Ok(class.split_whitespace().any(|c| c == "active"));
    }
    Ok(false)
}
