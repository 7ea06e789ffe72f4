use hotwork_core_types::Panel;
use hotwork_form_surface::memory::{FormEvent, FormFixture, MemoryForm, RowFixture};
use hotwork_form_surface::{InteractionError, InteractionPolicy, TabNavigator, TabState};

fn fixture(confirm_dialog: bool) -> FormFixture {
    FormFixture {
        questionnaire: vec![RowFixture::new("001", "Trabalho em altura?")],
        safety_analysis: vec![RowFixture::new("001", "Haverá trabalho a quente?")],
        confirm_dialog,
        ..FormFixture::default()
    }
}

#[tokio::test(start_paused = true)]
async fn opens_fills_and_confirms_a_panel() {
    let form = MemoryForm::from_fixture(&fixture(false));
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);

    nav.goto_panel(Panel::Questionnaire).await.unwrap();
    assert_eq!(nav.state(), TabState::ContentLoaded(Panel::Questionnaire));
    assert_eq!(form.active_tab().as_deref(), Some("Questionário PT"));

    nav.confirm().await.unwrap();
    assert_eq!(nav.state(), TabState::Confirmed(Panel::Questionnaire));
    assert_eq!(
        form.confirmations(),
        vec![Some("Questionário PT".to_string())]
    );
    assert_eq!(
        nav.history(),
        &[
            TabState::Idle,
            TabState::Navigating(Panel::Questionnaire),
            TabState::Active(Panel::Questionnaire),
            TabState::ContentLoaded(Panel::Questionnaire),
            TabState::Confirming(Panel::Questionnaire),
            TabState::Confirmed(Panel::Questionnaire),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn already_active_tab_is_not_clicked_again() {
    let form = MemoryForm::from_fixture(&fixture(false));
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);

    nav.goto_panel(Panel::SafetyAnalysis).await.unwrap();
    let clicks = form.click_count();
    nav.abandon();
    nav.goto_panel(Panel::SafetyAnalysis).await.unwrap();
    assert_eq!(form.click_count(), clicks);
    let opened = form
        .events()
        .into_iter()
        .filter(|event| matches!(event, FormEvent::TabOpened { .. }))
        .count();
    assert_eq!(opened, 1);
}

#[tokio::test(start_paused = true)]
async fn navigation_is_refused_mid_panel() {
    let form = MemoryForm::from_fixture(&fixture(false));
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);

    nav.goto_panel(Panel::Questionnaire).await.unwrap();
    let err = nav.goto_panel(Panel::SafetyAnalysis).await.unwrap_err();
    assert!(matches!(err, InteractionError::NavigationBlocked { .. }));
    assert_eq!(nav.state(), TabState::ContentLoaded(Panel::Questionnaire));
}

#[tokio::test(start_paused = true)]
async fn tab_that_never_activates_times_out() {
    let form = MemoryForm::from_fixture(&fixture(false));
    form.block_tab("APN-1");
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);

    let err = nav.goto_panel(Panel::SafetyAnalysis).await.unwrap_err();
    assert!(matches!(
        err,
        InteractionError::PanelLoadTimeout {
            panel: Panel::SafetyAnalysis,
            ..
        }
    ));
    assert_eq!(nav.state(), TabState::Idle);
    nav.goto_panel(Panel::Questionnaire).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn message_box_after_confirm_is_dismissed() {
    let form = MemoryForm::from_fixture(&fixture(true));
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);

    nav.goto_panel(Panel::Questionnaire).await.unwrap();
    nav.confirm().await.unwrap();
    assert!(form.events().contains(&FormEvent::DialogDismissed));

    nav.goto_panel(Panel::SafetyAnalysis).await.unwrap();
    assert_eq!(form.active_tab().as_deref(), Some("APN-1"));
}

#[tokio::test(start_paused = true)]
async fn missing_confirm_button_keeps_panel_confirming() {
    let form = MemoryForm::from_fixture(&fixture(false));
    form.remove_confirm_button();
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);

    nav.goto_panel(Panel::Questionnaire).await.unwrap();
    let err = nav.confirm().await.unwrap_err();
    assert!(matches!(err, InteractionError::ConfirmFailed { .. }));
    assert_eq!(nav.state(), TabState::Confirming(Panel::Questionnaire));
    assert!(nav.goto_panel(Panel::SafetyAnalysis).await.is_err());

    nav.abandon();
    nav.goto_panel(Panel::SafetyAnalysis).await.unwrap();
    assert!(form.confirmations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn lost_session_surfaces_as_fatal() {
    let form = MemoryForm::from_fixture(&fixture(false));
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);

    nav.goto_panel(Panel::Questionnaire).await.unwrap();
    form.lose_session();
    let err = nav.confirm().await.unwrap_err();
    assert!(err.is_fatal());
}
