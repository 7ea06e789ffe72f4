use std::collections::HashSet;

use async_trait::async_trait;
use hotwork_core_types::{Answer, Panel};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use super::dom::Dom;
use super::fixture::{self, container_id, FormFixture};
use crate::errors::InteractionError;
use crate::ports::{ClickMethod, ElementHandle, Rect, UiSurface};
use crate::query::Query;
use crate::selectors::{CONFIRM_LABEL, DIALOG_OK_LABEL};

const CONTAINERS: [&str; 4] = ["QPT", "AMB", "EPI", "APN1"];

/// Something the form observed, in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum FormEvent {
    TabOpened { label: String },
    Click { element: u64, method: ClickMethod },
    Confirmed { tab: Option<String> },
    DialogDismissed,
}

#[derive(Debug, Default)]
struct Faults {
    rejected: HashSet<ClickMethod>,
    stale_clicks: usize,
    always_stale: bool,
    blocked_tabs: HashSet<String>,
    session_lost: bool,
    lose_after_clicks: Option<usize>,
}

#[derive(Debug)]
struct FormState {
    dom: Dom,
    confirm_button: usize,
    message_box: usize,
    confirm_dialog: bool,
    events: Vec<FormEvent>,
    faults: Faults,
    clicks: usize,
}

/// In-memory permit form implementing [`UiSurface`].
///
/// Built from a [`FormFixture`], it behaves like the live record: one tab
/// container visible at a time, radios grouped by row, checkboxes that
/// toggle and an optional message box after each confirm. Faults can be
/// injected to exercise the fallback and recovery paths.
#[derive(Debug)]
pub struct MemoryForm {
    state: Mutex<FormState>,
}

impl MemoryForm {
    pub fn from_fixture(fixture: &FormFixture) -> Self {
        let built = fixture::build(fixture);
        Self {
            state: Mutex::new(FormState {
                dom: built.dom,
                confirm_button: built.confirm_button,
                message_box: built.message_box,
                confirm_dialog: fixture.confirm_dialog,
                events: Vec::new(),
                faults: Faults::default(),
                clicks: 0,
            }),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let fixture: FormFixture = serde_yaml::from_str(text)?;
        Ok(Self::from_fixture(&fixture))
    }

    /// Makes every click with `method` fail as not interactable.
    pub fn reject_method(&self, method: ClickMethod) {
        self.state.lock().faults.rejected.insert(method);
    }

    /// The next `count` clicks re-render the form and fail as stale.
    pub fn stale_next_clicks(&self, count: usize) {
        self.state.lock().faults.stale_clicks = count;
    }

    pub fn set_always_stale(&self, stale: bool) {
        self.state.lock().faults.always_stale = stale;
    }

    /// Clicks on the tab with this label are accepted but ignored.
    pub fn block_tab(&self, label: &str) {
        self.state.lock().faults.blocked_tabs.insert(label.to_string());
    }

    pub fn remove_confirm_button(&self) {
        let mut state = self.state.lock();
        let button = state.confirm_button;
        state.dom.set_hidden(button, true);
    }

    pub fn lose_session(&self) {
        self.state.lock().faults.session_lost = true;
    }

    /// The session drops once `count` clicks have been accepted.
    pub fn lose_session_after_clicks(&self, count: usize) {
        self.state.lock().faults.lose_after_clicks = Some(count);
    }

    /// Invalidates every handle handed out so far.
    pub fn rerender(&self) {
        self.state.lock().dom.rerender();
    }

    pub fn events(&self) -> Vec<FormEvent> {
        self.state.lock().events.clone()
    }

    /// Tab label active at each confirm, in order.
    pub fn confirmations(&self) -> Vec<Option<String>> {
        self.state
            .lock()
            .events
            .iter()
            .filter_map(|event| match event {
                FormEvent::Confirmed { tab } => Some(tab.clone()),
                _ => None,
            })
            .collect()
    }

    /// Tabs left for another tab with no confirm in between, as
    /// `(left, opened)` pairs in the order they happened.
    pub fn unconfirmed_tab_switches(&self) -> Vec<(String, String)> {
        let state = self.state.lock();
        let mut open: Option<&str> = None;
        let mut switches = Vec::new();
        for event in &state.events {
            match event {
                FormEvent::TabOpened { label } => {
                    if let Some(left) = open.filter(|left| *left != label.as_str()) {
                        switches.push((left.to_string(), label.clone()));
                    }
                    open = Some(label.as_str());
                }
                FormEvent::Confirmed { .. } => open = None,
                FormEvent::Click { .. } | FormEvent::DialogDismissed => {}
            }
        }
        switches
    }

    pub fn click_count(&self) -> usize {
        self.state.lock().clicks
    }

    pub fn active_tab(&self) -> Option<String> {
        let state = self.state.lock();
        active_tab(&state.dom)
    }

    /// Ordinal and selected answer of every row in a panel, visible or not.
    pub fn selections(&self, panel: Panel) -> Vec<(String, Option<Answer>)> {
        let state = self.state.lock();
        let dom = &state.dom;
        let Some(container) = dom.find_by_attr("id", container_id(panel)).first().copied() else {
            return Vec::new();
        };
        let mut rows = Vec::new();
        for id in dom.subtree(container) {
            let Some(node) = dom.node(id) else { continue };
            if node.attr("class") != Some("row") {
                continue;
            }
            let mut ordinal = String::new();
            let mut selected = None;
            for child in dom.subtree(id) {
                let Some(child_node) = dom.node(child) else { continue };
                if child_node.attr("class") == Some("ordem") {
                    ordinal = child_node.text.trim().to_string();
                }
                if child_node.is_input("radio") && child_node.checked {
                    selected = child_node.attr("data-option").and_then(Answer::parse);
                }
            }
            rows.push((ordinal, selected));
        }
        rows
    }

    /// Checklist items currently checked.
    pub fn checked_items(&self) -> Vec<String> {
        let state = self.state.lock();
        let dom = &state.dom;
        dom.subtree(Dom::ROOT)
            .into_iter()
            .filter_map(|id| dom.node(id))
            .filter(|node| node.is_input("checkbox") && node.checked)
            .filter_map(|node| node.attr("data-item").map(str::to_string))
            .collect()
    }

    fn with_node<T>(
        &self,
        handle: ElementHandle,
        read: impl FnOnce(&Dom, usize) -> T,
    ) -> Result<T, InteractionError> {
        let state = self.state.lock();
        let id = state.resolve(handle)?;
        Ok(read(&state.dom, id))
    }
}

impl FormState {
    fn check_session(&self) -> Result<(), InteractionError> {
        if self.faults.session_lost {
            return Err(InteractionError::SessionLost(
                "browser session closed".to_string(),
            ));
        }
        Ok(())
    }

    fn resolve(&self, handle: ElementHandle) -> Result<usize, InteractionError> {
        self.check_session()?;
        let id = usize::try_from(handle.id)
            .map_err(|_| InteractionError::StaleReference(format!("element {}", handle.id)))?;
        match self.dom.node(id) {
            Some(node) if node.generation == handle.generation => Ok(id),
            _ => Err(InteractionError::StaleReference(format!(
                "element {} no longer attached",
                handle.id
            ))),
        }
    }

    fn handle(&self, id: usize) -> ElementHandle {
        ElementHandle {
            id: id as u64,
            generation: self.dom.node(id).map_or(0, |node| node.generation),
        }
    }

    fn click(&mut self, handle: ElementHandle, method: ClickMethod) -> Result<(), InteractionError> {
        let id = self.resolve(handle)?;
        if !self.dom.is_visible(id) {
            return Err(InteractionError::NotInteractable(format!(
                "element {id} is hidden"
            )));
        }
        if self.faults.rejected.contains(&method) {
            return Err(InteractionError::NotInteractable(format!(
                "{} click intercepted",
                method.name()
            )));
        }
        if self.faults.always_stale || self.faults.stale_clicks > 0 {
            self.faults.stale_clicks = self.faults.stale_clicks.saturating_sub(1);
            self.dom.rerender();
            return Err(InteractionError::StaleReference(format!(
                "element {id} re-rendered during click"
            )));
        }
        if let Some(limit) = self.faults.lose_after_clicks {
            if self.clicks >= limit {
                self.faults.session_lost = true;
                return self.check_session();
            }
        }

        self.clicks += 1;
        self.events.push(FormEvent::Click {
            element: handle.id,
            method,
        });
        let doubles = self.dom.node(id).is_some_and(|node| node.tag == "label" || node.tag == "input");
        let times = if method == ClickMethod::PointerDouble && doubles { 2 } else { 1 };
        for _ in 0..times {
            self.activate(id);
        }
        Ok(())
    }

    fn activate(&mut self, id: usize) {
        let Some(node) = self.dom.node(id).cloned() else {
            return;
        };
        if node.tag == "label" {
            let target = node
                .attr("for")
                .and_then(|target| self.dom.find_by_attr("id", target).first().copied());
            if let Some(target) = target {
                if self.dom.node(target).is_some_and(|t| t.tag == "input") {
                    self.activate(target);
                }
            }
            return;
        }
        if node.is_input("radio") {
            let group = node.attr("name").map(str::to_string);
            if let Some(group) = group {
                for other in self.dom.find_by_attr("name", &group) {
                    if let Some(other) = self.dom.node_mut(other) {
                        other.checked = false;
                    }
                }
            }
            if let Some(radio) = self.dom.node_mut(id) {
                radio.checked = true;
            }
            return;
        }
        if node.is_input("checkbox") {
            if let Some(checkbox) = self.dom.node_mut(id) {
                checkbox.checked = !checkbox.checked;
            }
            return;
        }
        if node.tag == "a" && node.attr("role") == Some("tab") {
            self.open_tab(id, &node.text);
            return;
        }
        if node.tag == "button" {
            if id == self.confirm_button && node.text == CONFIRM_LABEL {
                let tab = active_tab(&self.dom);
                debug!(tab = ?tab, "form confirmed");
                self.events.push(FormEvent::Confirmed { tab });
                if self.confirm_dialog {
                    self.dom.set_hidden(self.message_box, false);
                }
            } else if node.text == DIALOG_OK_LABEL
                && self.dom.ancestors(id).any(|a| a == self.message_box)
            {
                self.dom.set_hidden(self.message_box, true);
                self.events.push(FormEvent::DialogDismissed);
            }
        }
    }

    fn open_tab(&mut self, link: usize, label: &str) {
        if self.faults.blocked_tabs.contains(label) {
            trace!(tab = label, "tab click ignored");
            return;
        }
        let Some(panel_id) = self
            .dom
            .node(link)
            .and_then(|node| node.attr("data-panel"))
            .map(str::to_string)
        else {
            return;
        };
        let was_active = self
            .dom
            .node(link)
            .is_some_and(|node| node.attr("aria-selected") == Some("true"));

        for other in self.dom.find_by_attr("role", "tab") {
            let selected = if other == link { "true" } else { "false" };
            self.dom.set_attr(other, "aria-selected", selected);
            if let Some(item) = self.dom.node(other).and_then(|node| node.parent) {
                let class = if other == link { "active" } else { "" };
                self.dom.set_attr(item, "class", class);
            }
        }
        for container in CONTAINERS {
            for id in self.dom.find_by_attr("id", container) {
                self.dom.set_hidden(id, container != panel_id);
            }
        }
        if !was_active {
            self.events.push(FormEvent::TabOpened {
                label: label.to_string(),
            });
        }
    }
}

fn active_tab(dom: &Dom) -> Option<String> {
    dom.find_by_attr("aria-selected", "true")
        .into_iter()
        .filter_map(|id| dom.node(id))
        .map(|node| node.text.clone())
        .next()
}

#[async_trait]
impl UiSurface for MemoryForm {
    async fn find_all(&self, query: &Query) -> Result<Vec<ElementHandle>, InteractionError> {
        let state = self.state.lock();
        state.check_session()?;
        Ok(state
            .dom
            .find(Dom::ROOT, query)
            .into_iter()
            .map(|id| state.handle(id))
            .collect())
    }

    async fn find_within(
        &self,
        scope: ElementHandle,
        query: &Query,
    ) -> Result<Vec<ElementHandle>, InteractionError> {
        let state = self.state.lock();
        let scope = state.resolve(scope)?;
        Ok(state
            .dom
            .find(scope, query)
            .into_iter()
            .map(|id| state.handle(id))
            .collect())
    }

    async fn parent(
        &self,
        element: ElementHandle,
    ) -> Result<Option<ElementHandle>, InteractionError> {
        let state = self.state.lock();
        let id = state.resolve(element)?;
        Ok(state
            .dom
            .node(id)
            .and_then(|node| node.parent)
            .map(|parent| state.handle(parent)))
    }

    async fn click(
        &self,
        element: ElementHandle,
        method: ClickMethod,
    ) -> Result<(), InteractionError> {
        self.state.lock().click(element, method)
    }

    async fn is_selected(&self, element: ElementHandle) -> Result<bool, InteractionError> {
        self.with_node(element, |dom, id| dom.node(id).is_some_and(|node| node.checked))
    }

    async fn is_displayed(&self, element: ElementHandle) -> Result<bool, InteractionError> {
        self.with_node(element, |dom, id| dom.is_visible(id))
    }

    async fn read_text(&self, element: ElementHandle) -> Result<String, InteractionError> {
        self.with_node(element, |dom, id| dom.text_of(id))
    }

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, InteractionError> {
        self.with_node(element, |dom, id| {
            dom.node(id)
                .and_then(|node| node.attr(name))
                .map(str::to_string)
        })
    }

    async fn scroll_into_view(&self, element: ElementHandle) -> Result<(), InteractionError> {
        self.with_node(element, |_, _| ())
    }

    async fn bounding_box(
        &self,
        element: ElementHandle,
    ) -> Result<Option<Rect>, InteractionError> {
        self.with_node(element, |dom, id| {
            dom.is_visible(id).then(|| Rect {
                x: 0.0,
                y: id as f64 * 24.0,
                width: 100.0,
                height: 20.0,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RowFixture;

    fn form() -> MemoryForm {
        MemoryForm::from_fixture(&FormFixture {
            questionnaire: vec![RowFixture::new("001", "Trabalho em altura?")],
            ..FormFixture::default()
        })
    }

    #[tokio::test]
    async fn radios_in_a_row_are_exclusive() {
        let form = form();
        let radios = form
            .find_all(&Query::tag("input").attr("type", "radio"))
            .await
            .unwrap();
        assert!(radios.is_empty(), "hidden panel must not expose radios");

        let tab = form
            .find_all(&Query::tag("a").text_exact("Questionário PT"))
            .await
            .unwrap()[0];
        form.click(tab, ClickMethod::Direct).await.unwrap();
        let radios = form
            .find_all(&Query::tag("input").attr("type", "radio"))
            .await
            .unwrap();
        assert_eq!(radios.len(), 3);

        form.click(radios[0], ClickMethod::PointerDouble).await.unwrap();
        form.click(radios[1], ClickMethod::Direct).await.unwrap();
        assert!(!form.is_selected(radios[0]).await.unwrap());
        assert!(form.is_selected(radios[1]).await.unwrap());
        assert_eq!(
            form.selections(Panel::Questionnaire),
            vec![("001".to_string(), Some(Answer::No))]
        );
    }

    #[test]
    fn leaving_a_tab_without_confirm_is_recorded() {
        let form = form();
        let open = |label: &str| {
            let tab = tokio_test::block_on(form.find_all(&Query::tag("a").text_exact(label)))
                .unwrap()[0];
            tokio_test::block_on(form.click(tab, ClickMethod::Direct)).unwrap();
        };
        open("APN-1");
        open("Questionário PT");
        assert_eq!(
            form.unconfirmed_tab_switches(),
            vec![("APN-1".to_string(), "Questionário PT".to_string())]
        );

        let confirm_query = Query::tag("button").text_exact("Confirmar");
        let confirm = tokio_test::block_on(form.find_all(&confirm_query)).unwrap()[0];
        tokio_test::block_on(form.click(confirm, ClickMethod::Direct)).unwrap();
        open("EPI");
        assert_eq!(form.unconfirmed_tab_switches().len(), 1);
    }

    #[test]
    fn rerender_invalidates_handles() {
        let form = form();
        let tab = tokio_test::block_on(form.find_all(&Query::tag("a").text_exact("APN-1")))
            .unwrap()[0];
        form.rerender();
        let err = tokio_test::block_on(form.read_text(tab)).unwrap_err();
        assert!(err.is_stale());
    }

    #[test]
    fn lost_session_fails_every_call() {
        let form = form();
        form.lose_session();
        let err = tokio_test::block_on(form.find_all(&Query::any())).unwrap_err();
        assert!(err.is_fatal());
    }
}
