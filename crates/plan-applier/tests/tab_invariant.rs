mod common;

use hotwork_core_types::Panel;
use hotwork_form_surface::{ClickMethod, MemoryForm, TabState};
use hotwork_plan_applier::ApplyReport;
use proptest::prelude::*;

use common::{fixture, prepare, rules, task};

const TAB_LABELS: [&str; 4] = ["Questionário PT", "Análise Ambiental", "EPI", "APN-1"];

#[derive(Clone, Debug)]
struct Faults {
    blocked_tab: Option<usize>,
    no_confirm: bool,
    stale_clicks: usize,
    reject_pointer: bool,
    confirm_dialog: bool,
    lose_after: Option<usize>,
}

fn faults() -> impl Strategy<Value = Faults> {
    (
        proptest::option::of(0..TAB_LABELS.len()),
        any::<bool>(),
        0usize..3,
        any::<bool>(),
        any::<bool>(),
        proptest::option::weighted(0.2, 1usize..30),
    )
        .prop_map(
            |(blocked_tab, no_confirm, stale_clicks, reject_pointer, confirm_dialog, lose_after)| {
                Faults {
                    blocked_tab,
                    no_confirm,
                    stale_clicks,
                    reject_pointer,
                    confirm_dialog,
                    lose_after,
                }
            },
        )
}

fn run(faults: &Faults) -> (MemoryForm, ApplyReport) {
    let mut fixture = fixture();
    fixture.confirm_dialog = faults.confirm_dialog;
    let form = MemoryForm::from_fixture(&fixture);
    if let Some(index) = faults.blocked_tab {
        form.block_tab(TAB_LABELS[index]);
    }
    if faults.no_confirm {
        form.remove_confirm_button();
    }
    if faults.reject_pointer {
        form.reject_method(ClickMethod::PointerDouble);
    }
    form.stale_next_clicks(faults.stale_clicks);
    if let Some(count) = faults.lose_after {
        form.lose_session_after_clicks(count);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap();
    let (plan, applier) = prepare(rules(), &task());
    let report = runtime.block_on(async {
        match applier.apply(&form, &plan).await {
            Ok(report) => report,
            Err(err) => err.partial().clone(),
        }
    });
    (form, report)
}

/// Tab labels of the panels the navigator left without confirming, in order.
fn abandoned_tabs(transitions: &[TabState]) -> Vec<&'static str> {
    transitions
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (
                TabState::Active(panel) | TabState::ContentLoaded(panel) | TabState::Confirming(panel),
                TabState::Idle,
            ) => Some(panel.tab_label()),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn form_never_leaves_a_tab_unconfirmed_unless_abandoned(faults in faults()) {
        let (form, report) = run(&faults);
        let abandoned = abandoned_tabs(&report.transitions);
        let mut remaining = abandoned.iter();
        for (left, opened) in form.unconfirmed_tab_switches() {
            prop_assert!(
                remaining.any(|tab| *tab == left),
                "left {} for {} without confirm; abandoned: {:?}", left, opened, abandoned
            );
        }
        prop_assert_eq!(report.transitions.first(), Some(&TabState::Idle));
    }

    #[test]
    fn panel_counters_balance_and_keep_order(faults in faults()) {
        let (_, report) = run(&faults);
        for panel in &report.panels {
            prop_assert_eq!(panel.succeeded + panel.failed, panel.total);
        }
        let order: Vec<Panel> = report.panels.iter().map(|panel| panel.panel).collect();
        let mut sorted = order.clone();
        sorted.sort_by_key(|panel| Panel::ORDER.iter().position(|p| p == panel));
        sorted.dedup();
        prop_assert_eq!(order, sorted);
    }
}

#[test]
fn clean_run_confirms_every_tab_before_the_next() {
    let (form, report) = run(&Faults {
        blocked_tab: None,
        no_confirm: false,
        stale_clicks: 0,
        reject_pointer: false,
        confirm_dialog: true,
        lose_after: None,
    });
    assert!(form.unconfirmed_tab_switches().is_empty());
    assert!(abandoned_tabs(&report.transitions).is_empty());
    assert_eq!(form.confirmations().len(), 5);
}
