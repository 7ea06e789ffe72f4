use std::path::Path;
use std::sync::Arc;

use hotwork_cli::{FormTask, TaskRunner};
use hotwork_core_types::TaskId;
use hotwork_form_surface::{ClickMethod, InteractionPolicy, MemoryForm, TabState};
use hotwork_rule_engine::RuleSet;
use proptest::prelude::*;

const TAB_LABELS: [&str; 4] = ["Questionário PT", "Análise Ambiental", "EPI", "APN-1"];

#[derive(Clone, Debug)]
struct Faults {
    blocked_tab: Option<usize>,
    no_confirm: bool,
    stale_clicks: usize,
    reject_pointer: bool,
    lose_after: Option<usize>,
}

fn faults() -> impl Strategy<Value = Faults> {
    (
        proptest::option::of(0..TAB_LABELS.len()),
        any::<bool>(),
        0usize..3,
        any::<bool>(),
        proptest::option::weighted(0.2, 1usize..40),
    )
        .prop_map(|(blocked_tab, no_confirm, stale_clicks, reject_pointer, lose_after)| Faults {
            blocked_tab,
            no_confirm,
            stale_clicks,
            reject_pointer,
            lose_after,
        })
}

fn demo_form() -> MemoryForm {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/forms/solda-altura.yaml");
    MemoryForm::from_yaml(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn runner() -> TaskRunner {
    let rules = RuleSet::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("config/rules.yaml"))
        .unwrap();
    TaskRunner::new(Arc::new(rules), InteractionPolicy::default()).unwrap()
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

fn run(faults: &Faults) -> (MemoryForm, Vec<TabState>) {
    let form = demo_form();
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
    let runner = runner();
    let outcome = runtime.block_on(async {
        let task = FormTask {
            id: TaskId::new("solda-altura"),
            surface: &form,
        };
        runner.run_task(&task).await
    });
    let transitions = outcome
        .report()
        .map(|report| report.transitions.clone())
        .unwrap_or_default();
    (form, transitions)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn task_run_never_leaves_a_tab_unconfirmed_unless_abandoned(faults in faults()) {
        let (form, transitions) = run(&faults);
        let abandoned = abandoned_tabs(&transitions);
        let mut remaining = abandoned.iter();
        for (left, opened) in form.unconfirmed_tab_switches() {
            prop_assert!(
                remaining.any(|tab| *tab == left),
                "left {} for {} without confirm; abandoned: {:?}", left, opened, abandoned
            );
        }
    }
}

#[test]
fn clean_task_run_confirms_each_tab_before_opening_the_next() {
    let (form, transitions) = run(&Faults {
        blocked_tab: None,
        no_confirm: false,
        stale_clicks: 0,
        reject_pointer: false,
        lose_after: None,
    });
    assert_eq!(form.unconfirmed_tab_switches(), Vec::<(String, String)>::new());
    assert!(abandoned_tabs(&transitions).is_empty());
    assert_eq!(form.confirmations().len(), 5);
}
