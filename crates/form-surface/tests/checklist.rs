use std::collections::BTreeMap;

use hotwork_core_types::Panel;
use hotwork_form_surface::memory::{ChecklistLayout, FormFixture, MemoryForm};
use hotwork_form_surface::{
    check_item, CheckOutcome, ChecklistStrategy, ClickChain, InteractionError,
    InteractionPolicy, TabNavigator,
};

fn categories() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "Luvas".to_string(),
            vec!["LUVA ARAMIDA".to_string(), "LUVA DE RASPA".to_string()],
        ),
        ("Óculos".to_string(), vec!["ÓCULOS AMPLA VISÃO".to_string()]),
    ])
}

async fn open(layout: ChecklistLayout) -> MemoryForm {
    let form = MemoryForm::from_fixture(&FormFixture {
        ppe_categories: categories(),
        checklist_layout: layout,
        ..FormFixture::default()
    });
    let policy = InteractionPolicy::default();
    let mut nav = TabNavigator::new(&form, &policy);
    nav.goto_panel(Panel::PpeCategories).await.unwrap();
    form
}

#[tokio::test(start_paused = true)]
async fn each_layout_is_reached_by_its_strategy() {
    let cases = [
        (ChecklistLayout::Table, ChecklistStrategy::TableRow),
        (ChecklistLayout::LabelFor, ChecklistStrategy::LabelFor),
        (ChecklistLayout::LabelSibling, ChecklistStrategy::LabelSibling),
    ];
    for (layout, strategy) in cases {
        let form = open(layout).await;
        let outcome = check_item(&form, "luva de raspa", &ClickChain::single_activation())
            .await
            .unwrap();
        assert_eq!(outcome, CheckOutcome::Checked(strategy), "{layout:?}");
        assert_eq!(form.checked_items(), vec!["LUVA DE RASPA".to_string()]);
    }
}

#[tokio::test(start_paused = true)]
async fn checked_items_are_never_unchecked() {
    let form = open(ChecklistLayout::Table).await;
    let chain = ClickChain::single_activation();
    check_item(&form, "ÓCULOS AMPLA VISÃO", &chain).await.unwrap();
    let again = check_item(&form, "oculos ampla visao", &chain).await.unwrap();
    assert_eq!(again, CheckOutcome::AlreadyChecked);
    assert_eq!(form.checked_items(), vec!["ÓCULOS AMPLA VISÃO".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn unknown_item_is_not_found() {
    let form = open(ChecklistLayout::LabelFor).await;
    let err = check_item(&form, "AVENTAL", &ClickChain::single_activation())
        .await
        .unwrap_err();
    assert!(matches!(err, InteractionError::LocatorNotFound(_)));
}
