//! Integration tests for [`ContributionRegistry`].

mod common;

use std::sync::Arc;

use std::time::Duration;

use common::{BrokenView, CountingView, Entry, HangingView, TestItem, new_registry};
use parking_lot::Mutex;
use trellis_registry::{OptionFilter, RegistryError};

// ─────────────────────────────────────────────────────────────────────
// 1. Registration
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_namespaces_keys() {
    let (registry, _lifecycle) = new_registry();

    let key = registry.register_one(Entry::new("color", "p1")).await.unwrap();
    assert_eq!(key, "p1-color");

    let key = registry.register_one(Entry::new("color", "p2")).await.unwrap();
    assert_eq!(key, "p2-color");

    assert!(registry.is_registered("p1-color"));
    assert!(registry.is_registered("p2-color"));
    assert!(!registry.is_registered("color"));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn register_batch_returns_keys_in_order() {
    let (registry, _lifecycle) = new_registry();

    let keys = registry
        .register(vec![Entry::new("a", "p1"), Entry::new("b", "p1")])
        .await
        .unwrap();

    assert_eq!(keys, vec!["p1-a", "p1-b"]);
    assert_eq!(registry.keys(), keys);
    assert_eq!(registry.version(), 1);
}

#[tokio::test]
async fn batch_with_duplicate_is_rejected_atomically() {
    let (registry, _lifecycle) = new_registry();
    let before = registry.version();

    let err = registry
        .register(vec![Entry::new("a", "p1"), Entry::new("a", "p1")])
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(registry.is_empty());
    assert_eq!(registry.version(), before);
}

#[tokio::test]
async fn batch_with_colliding_namespaced_keys_is_rejected() {
    let (registry, _lifecycle) = new_registry();

    let sanitized = registry
        .register(vec![Entry::new("a.b", "p1"), Entry::new("a-b", "p1")])
        .await
        .unwrap_err();
    let hyphenated = registry
        .register(vec![Entry::new("x-y", "p1"), Entry::new("y", "p1-x")])
        .await
        .unwrap_err();

    assert!(sanitized.is_validation());
    assert!(hyphenated.is_validation());
    assert!(registry.is_empty());
    assert_eq!(registry.version(), 0);
}

#[tokio::test]
async fn batch_with_invalid_entry_commits_nothing() {
    let (registry, _lifecycle) = new_registry();

    let err = registry
        .register(vec![Entry::new("a", "p1"), Entry::new("b", "p1").without_label()])
        .await
        .unwrap_err();

    assert!(matches!(err, RegistryError::Validation { .. }));
    assert!(!registry.is_registered("p1-a"));
    assert_eq!(registry.version(), 0);
}

#[tokio::test]
async fn reserved_key_is_rejected() {
    let (registry, _lifecycle) = new_registry();

    let err = registry.register_one(Entry::new("title", "p1")).await.unwrap_err();

    assert!(err.to_string().contains("built-in"), "got: {err}");
    assert!(registry.is_empty());
    assert_eq!(registry.version(), 0);
}

#[tokio::test]
async fn already_registered_key_is_rejected() {
    let (registry, _lifecycle) = new_registry();
    registry.register_one(Entry::new("a", "p1")).await.unwrap();

    let err = registry
        .register(vec![Entry::new("b", "p1"), Entry::new("a", "p1")])
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert!(!registry.is_registered("p1-b"));
    assert_eq!(registry.version(), 1);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let (registry, _lifecycle) = new_registry();
    let err = registry.register(Vec::new()).await.unwrap_err();
    assert!(matches!(err, RegistryError::EmptyBatch { .. }));
}

// ─────────────────────────────────────────────────────────────────────
// 2. Unregistration
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unregister_removes_listed_keys() {
    let (registry, _lifecycle) = new_registry();
    registry
        .register(vec![Entry::new("a", "p1"), Entry::new("b", "p1")])
        .await
        .unwrap();

    registry.unregister(&["p1-a"]).await.unwrap();

    assert!(!registry.is_registered("p1-a"));
    assert!(registry.is_registered("p1-b"));
    assert_eq!(registry.version(), 2);
}

#[tokio::test]
async fn unregister_is_all_or_nothing() {
    let (registry, _lifecycle) = new_registry();
    registry.register_one(Entry::new("color", "p1")).await.unwrap();

    let err = registry
        .unregister(&["p1-color", "nonexistent"])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RegistryError::not_found("TestManager", "nonexistent")
    );
    assert!(registry.is_registered("p1-color"));
    assert_eq!(registry.version(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// 3. Queries
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_with_wildcard_field() {
    let (registry, _lifecycle) = new_registry();
    registry
        .register(vec![Entry::new("a", "p1"), Entry::new("b", "p1")])
        .await
        .unwrap();
    registry.register_one(Entry::new("c", "p2")).await.unwrap();

    let rows = registry.query(
        &OptionFilter::new()
            .with("plugin_id", "p1")
            .with_wildcard("label"),
    );

    let keys: Vec<&str> = rows.iter().map(|row| row.data_key.as_str()).collect();
    assert_eq!(keys, vec!["p1-a", "p1-b"]);
}

#[tokio::test]
async fn query_returns_independent_copies() {
    let (registry, _lifecycle) = new_registry();
    registry.register_one(Entry::new("a", "p1")).await.unwrap();

    let mut rows = registry.entries();
    rows[0].label = Some("mutated".into());

    let stored = registry.get("p1-a").unwrap();
    assert_eq!(stored.label.as_deref(), Some("Label a"));
}

#[tokio::test]
async fn caller_copy_is_not_shared_with_registry() {
    let (registry, _lifecycle) = new_registry();
    let mut entry = Entry::new("a", "p1");
    registry.register_one(entry.clone()).await.unwrap();

    entry.label = Some("changed".into());

    assert_eq!(
        registry.get("p1-a").unwrap().label.as_deref(),
        Some("Label a")
    );
}

#[tokio::test]
async fn get_data_uses_provider_or_fallback() {
    let (registry, _lifecycle) = new_registry();
    registry
        .register(vec![
            Entry::new("a", "p1").with_provider("value"),
            Entry::new("b", "p1"),
        ])
        .await
        .unwrap();

    let item = TestItem(7);
    assert_eq!(registry.get_data(&item, "p1-a"), "value:7:p1-a");
    assert_eq!(registry.get_data(&item, "p1-b"), "");
    assert_eq!(registry.get_data(&item, "missing"), "");
}

#[tokio::test]
async fn set_data_dispatches_to_setter() {
    let (registry, _lifecycle) = new_registry();
    let sink = Arc::new(Mutex::new(Vec::new()));
    registry
        .register(vec![
            Entry::new("a", "p1").with_setter(Arc::clone(&sink)),
            Entry::new("b", "p1"),
        ])
        .await
        .unwrap();

    let item = TestItem(1);
    assert!(registry.set_data(&item, "p1-a", "red"));
    assert!(!registry.set_data(&item, "p1-b", "blue"));
    assert_eq!(*sink.lock(), vec!["p1-a=red".to_string()]);
}

// ─────────────────────────────────────────────────────────────────────
// 4. Contributor cleanup
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn contributor_shutdown_removes_only_its_entries() {
    let (registry, lifecycle) = new_registry();
    registry
        .register(vec![
            Entry::new("a", "p1"),
            Entry::new("b", "p1"),
            Entry::new("c", "p1"),
        ])
        .await
        .unwrap();
    registry.register_one(Entry::new("a", "p2")).await.unwrap();
    let before = registry.version();

    lifecycle.shutdown(&"p1".into()).await;

    assert_eq!(registry.keys(), vec!["p2-a"]);
    assert_eq!(registry.version(), before + 1);
}

#[tokio::test]
async fn shutdown_of_unknown_contributor_changes_nothing() {
    let (registry, lifecycle) = new_registry();
    registry.register_one(Entry::new("a", "p1")).await.unwrap();

    lifecycle.shutdown(&"p9".into()).await;

    assert_eq!(registry.version(), 1);
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn shutdown_observer_installed_once() {
    let (registry, lifecycle) = new_registry();
    assert!(!registry.observes_shutdown());
    assert_eq!(lifecycle.observer_count(), 0);

    registry.register_one(Entry::new("a", "p1")).await.unwrap();
    registry.register_one(Entry::new("b", "p1")).await.unwrap();

    assert!(registry.observes_shutdown());
    assert_eq!(lifecycle.observer_count(), 1);
}

#[tokio::test]
async fn failed_registration_does_not_install_observer() {
    let (registry, lifecycle) = new_registry();
    let _ = registry.register_one(Entry::new("title", "p1")).await;
    assert!(!registry.observes_shutdown());
    assert_eq!(lifecycle.observer_count(), 0);
}

// ─────────────────────────────────────────────────────────────────────
// 5. View notification
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn mutations_refresh_live_views() {
    let (registry, lifecycle) = new_registry();
    let view = Arc::new(CountingView::default());
    registry.notifier().attach(&view);

    registry.register_one(Entry::new("a", "p1")).await.unwrap();
    registry.notifier().settled().await;
    assert_eq!(view.count(), 1);

    registry.unregister(&["p1-a"]).await.unwrap();
    registry.notifier().settled().await;
    assert_eq!(view.count(), 2);

    registry.register_one(Entry::new("b", "p1")).await.unwrap();
    lifecycle.shutdown(&"p1".into()).await;
    registry.notifier().settled().await;
    assert_eq!(view.count(), 4);
}

#[tokio::test]
async fn rejected_mutations_do_not_refresh_views() {
    let (registry, _lifecycle) = new_registry();
    let view = Arc::new(CountingView::default());
    registry.notifier().attach(&view);

    let _ = registry.register_one(Entry::new("title", "p1")).await;
    let _ = registry.unregister(&["missing"]).await;

    assert_eq!(registry.notifier().in_flight(), 0);
    assert_eq!(view.count(), 0);
}

#[tokio::test]
async fn broken_view_does_not_affect_registration() {
    let (registry, _lifecycle) = new_registry();
    let broken = Arc::new(BrokenView);
    let healthy = Arc::new(CountingView::default());
    registry.notifier().attach(&broken);
    registry.notifier().attach(&healthy);

    let key = registry.register_one(Entry::new("a", "p1")).await;
    registry.notifier().settled().await;

    assert_eq!(key.unwrap(), "p1-a");
    assert_eq!(healthy.count(), 1);
}

#[tokio::test]
async fn register_does_not_wait_for_views() {
    let (registry, lifecycle) = new_registry();
    let hanging = Arc::new(HangingView);
    registry.notifier().attach(&hanging);

    let registered =
        tokio::time::timeout(Duration::from_millis(500), registry.register_one(Entry::new("a", "p1")))
            .await;
    assert_eq!(registered.unwrap().unwrap(), "p1-a");
    assert!(registry.is_registered("p1-a"));

    let removed = tokio::time::timeout(Duration::from_millis(500), lifecycle.shutdown(&"p1".into()))
        .await;
    assert!(removed.is_ok());
    assert!(!registry.is_registered("p1-a"));
    assert_eq!(registry.version(), 2);
}
