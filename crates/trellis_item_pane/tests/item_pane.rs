//! Integration tests for [`ItemPaneManager`].

use std::sync::Arc;

use trellis_item_pane::{
    DataChange, ItemPaneManager, RenderHook, RenderOutcome, SectionHeader, SectionOptions,
    SectionState,
};
use trellis_registry::{ContributorLifecycle, ItemId, OptionFilter};

fn section(pane_id: &str, plugin_id: &str) -> SectionOptions {
    SectionOptions::new(
        pane_id,
        plugin_id,
        SectionHeader::new(format!("{pane_id}-head"), "head.svg"),
        SectionHeader::new(format!("{pane_id}-sidenav"), "sidenav.svg"),
        RenderHook::sync(|_| Ok(())),
    )
}

fn manager() -> (ItemPaneManager, Arc<ContributorLifecycle>) {
    let lifecycle = Arc::new(ContributorLifecycle::new());
    (ItemPaneManager::new(Arc::clone(&lifecycle)), lifecycle)
}

#[tokio::test]
async fn sections_are_namespaced_and_versioned() {
    let (panes, _lifecycle) = manager();
    assert_eq!(panes.get_update_time(), 0);

    let ids = panes
        .register_sections(vec![section("citations", "p1"), section("citations", "p2")])
        .await
        .unwrap();

    assert_eq!(ids, vec!["p1-citations", "p2-citations"]);
    assert_eq!(panes.get_update_time(), 1);
    assert!(panes.is_custom_section("p1-citations"));
}

#[tokio::test]
async fn builtin_pane_id_is_rejected() {
    let (panes, _lifecycle) = manager();

    let err = panes.register_section(section("tags", "p1")).await.unwrap_err();

    assert!(err.is_validation());
    assert!(panes.get_custom_sections(None).is_empty());
}

#[tokio::test]
async fn invalid_header_rejects_whole_batch() {
    let (panes, _lifecycle) = manager();
    let mut broken = section("broken", "p1");
    broken.sidenav.l10n_id.clear();

    let result = panes
        .register_sections(vec![section("fine", "p1"), broken])
        .await;

    assert!(result.is_err());
    assert!(!panes.is_custom_section("p1-fine"));
    assert_eq!(panes.get_update_time(), 0);
}

#[tokio::test]
async fn unknown_pane_id_blocks_unregister() {
    let (panes, _lifecycle) = manager();
    panes.register_section(section("citations", "p1")).await.unwrap();

    let err = panes
        .unregister_sections(&["p1-citations", "p1-missing"])
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(panes.is_custom_section("p1-citations"));
}

#[tokio::test]
async fn sections_can_be_filtered_by_render_mode() {
    let (panes, _lifecycle) = manager();
    let deferred = SectionOptions::new(
        "deferred",
        "p1",
        SectionHeader::new("deferred-head", "head.svg"),
        SectionHeader::new("deferred-sidenav", "sidenav.svg"),
        RenderHook::asynchronous(|_| async { Ok::<(), trellis_registry::HookError>(()) }),
    );
    panes
        .register_sections(vec![section("inline", "p1"), deferred])
        .await
        .unwrap();

    let found = panes.get_custom_sections(Some(
        &OptionFilter::new().with("render_mode", "asynchronous"),
    ));

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].pane_id, "p1-deferred");
}

#[tokio::test]
async fn created_section_is_independent_of_registry() {
    let (panes, lifecycle) = manager();
    panes.register_section(section("citations", "p1")).await.unwrap();

    let mut controller = panes.create_section("p1-citations").unwrap();
    assert!(panes.create_section("p1-unknown").is_none());
    controller.init().unwrap();
    controller
        .data_change(DataChange::Item(Some(ItemId(1))))
        .unwrap();

    lifecycle.shutdown(&"p1".into()).await;
    assert!(!panes.is_custom_section("p1-citations"));

    assert_eq!(controller.pane_id(), "p1-citations");
    assert_eq!(
        controller.render(ItemId(1)).await.unwrap(),
        RenderOutcome::Rendered
    );
    controller.destroy().unwrap();
    assert_eq!(controller.state(), SectionState::Destroyed);
}
