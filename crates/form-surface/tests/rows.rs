use hotwork_core_types::{Answer, AnswerKey, Panel};
use hotwork_form_surface::memory::{FormEvent, FormFixture, MemoryForm, RowFixture, RowLayout};
use hotwork_form_surface::{
    ClickChain, ClickMethod, InteractionPolicy, MarkOutcome, OptionStrategy, RowFiller,
    RowTarget, TabNavigator,
};
use pretty_assertions::assert_eq;

fn rows() -> Vec<RowFixture> {
    vec![
        RowFixture::new("001", "Haverá trabalho em altura?"),
        RowFixture::new("002", "Haverá trabalho a quente?"),
        RowFixture::new("003", "Cinto de segurança tipo paraquedista"),
    ]
}

async fn open(form: &MemoryForm) {
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(form, &policy);
    nav.goto_panel(Panel::Questionnaire).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn answers_rows_by_ordinal_and_hint() {
    let form = MemoryForm::from_fixture(&FormFixture {
        questionnaire: rows(),
        ..FormFixture::default()
    });
    open(&form).await;

    let mut filler = RowFiller::load(&form, ClickChain::default()).await.unwrap();
    assert_eq!(filler.index().len(), 3);
    let outcome = filler
        .answer(&RowTarget::Ordinal("002".into()), Answer::Yes)
        .await
        .unwrap();
    assert_eq!(outcome, MarkOutcome::Marked(OptionStrategy::LabelFor));

    let key = AnswerKey::parse("PARAQUEDISTA").unwrap();
    filler
        .answer(&RowTarget::Key(key), Answer::NotApplicable)
        .await
        .unwrap();

    assert_eq!(
        form.selections(Panel::Questionnaire),
        vec![
            ("001".to_string(), None),
            ("002".to_string(), Some(Answer::Yes)),
            ("003".to_string(), Some(Answer::NotApplicable)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn selected_option_is_left_alone() {
    let mut fixture_rows = rows();
    fixture_rows[0].selected = Some(Answer::No);
    let form = MemoryForm::from_fixture(&FormFixture {
        questionnaire: fixture_rows,
        ..FormFixture::default()
    });
    open(&form).await;

    let clicks = form.click_count();
    let mut filler = RowFiller::load(&form, ClickChain::default()).await.unwrap();
    let outcome = filler
        .answer(&RowTarget::Ordinal("001".into()), Answer::No)
        .await
        .unwrap();
    assert_eq!(outcome, MarkOutcome::AlreadySelected);
    assert_eq!(form.click_count(), clicks);
}

#[tokio::test(start_paused = true)]
async fn stale_row_is_reindexed_and_retried_once() {
    let form = MemoryForm::from_fixture(&FormFixture {
        questionnaire: rows(),
        ..FormFixture::default()
    });
    open(&form).await;

    let mut filler = RowFiller::load(&form, ClickChain::default()).await.unwrap();
    form.stale_next_clicks(1);
    filler
        .answer(&RowTarget::Ordinal("001".into()), Answer::Yes)
        .await
        .unwrap();
    assert_eq!(
        form.selections(Panel::Questionnaire)[0],
        ("001".to_string(), Some(Answer::Yes))
    );
}

#[tokio::test(start_paused = true)]
async fn second_stale_failure_is_returned() {
    let form = MemoryForm::from_fixture(&FormFixture {
        questionnaire: rows(),
        ..FormFixture::default()
    });
    open(&form).await;

    let mut filler = RowFiller::load(&form, ClickChain::default()).await.unwrap();
    form.set_always_stale(true);
    let err = filler
        .answer(&RowTarget::Ordinal("001".into()), Answer::Yes)
        .await
        .unwrap_err();
    assert!(err.is_stale());
}

#[tokio::test(start_paused = true)]
async fn unbound_radios_fall_back_to_position() {
    let bare: Vec<RowFixture> = rows()
        .into_iter()
        .map(|row| RowFixture {
            label_for: false,
            values: false,
            ..row
        })
        .collect();
    let form = MemoryForm::from_fixture(&FormFixture {
        questionnaire: bare,
        layout: RowLayout::Table,
        ..FormFixture::default()
    });
    open(&form).await;

    let mut filler = RowFiller::load(&form, ClickChain::default()).await.unwrap();
    let outcome = filler
        .answer(&RowTarget::Ordinal("003".into()), Answer::NotApplicable)
        .await
        .unwrap();
    assert_eq!(outcome, MarkOutcome::Marked(OptionStrategy::RadioByPosition));
    filler
        .answer(&RowTarget::Position(0), Answer::No)
        .await
        .unwrap();
    assert_eq!(
        form.selections(Panel::Questionnaire),
        vec![
            ("001".to_string(), Some(Answer::No)),
            ("002".to_string(), None),
            ("003".to_string(), Some(Answer::NotApplicable)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_pointer_click_falls_back_to_direct() {
    let form = MemoryForm::from_fixture(&FormFixture {
        questionnaire: rows(),
        ..FormFixture::default()
    });
    open(&form).await;
    form.reject_method(ClickMethod::PointerDouble);

    let mut filler = RowFiller::load(&form, ClickChain::default()).await.unwrap();
    filler
        .answer(&RowTarget::Ordinal("002".into()), Answer::No)
        .await
        .unwrap();
    let last = form.events().into_iter().last();
    assert!(matches!(
        last,
        Some(FormEvent::Click {
            method: ClickMethod::Direct,
            ..
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn missing_row_is_reported() {
    let form = MemoryForm::from_fixture(&FormFixture {
        questionnaire: rows(),
        ..FormFixture::default()
    });
    open(&form).await;

    let mut filler = RowFiller::load(&form, ClickChain::default()).await.unwrap();
    let err = filler
        .answer(&RowTarget::Ordinal("042".into()), Answer::Yes)
        .await
        .unwrap_err();
    assert!(!err.is_fatal());
}
