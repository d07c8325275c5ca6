//! Integration tests for [`SectionController`].

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use trellis_item_pane::{
    DataChange, RenderHook, RenderMode, RenderOutcome, SectionButton, SectionController,
    SectionError, SectionHeader, SectionOptions, SectionState, TabType, ToggleEvent, ViewMode,
};
use trellis_registry::{HookError, ItemId};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Counters {
    render: AtomicUsize,
    secondary: AtomicUsize,
}

impl Counters {
    fn renders(&self) -> usize {
        self.render.load(Ordering::SeqCst)
    }

    fn secondaries(&self) -> usize {
        self.secondary.load(Ordering::SeqCst)
    }
}

fn counting_section(counters: &Arc<Counters>) -> SectionOptions {
    let primary = Arc::clone(counters);
    let secondary = Arc::clone(counters);
    SectionOptions::new(
        "p1-notes",
        "p1",
        SectionHeader::new("p1-notes-head", "head.svg"),
        SectionHeader::new("p1-notes-sidenav", "sidenav.svg"),
        RenderHook::sync(move |_| {
            primary.render.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    )
    .with_secondary_render(RenderHook::asynchronous(move |_| {
        let secondary = Arc::clone(&secondary);
        async move {
            secondary.secondary.fetch_add(1, Ordering::SeqCst);
            Ok::<(), HookError>(())
        }
    }))
}

fn initialized(options: SectionOptions) -> SectionController {
    let mut section = SectionController::new(options);
    section.init().unwrap();
    section
}

// ─────────────────────────────────────────────────────────────────────
// 1. Rendering
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn render_is_idempotent_per_item() {
    let counters = Arc::new(Counters::default());
    let mut section = initialized(counting_section(&counters));

    assert_eq!(section.render(ItemId(5)).await.unwrap(), RenderOutcome::Rendered);
    assert_eq!(section.render(ItemId(5)).await.unwrap(), RenderOutcome::Skipped);
    assert_eq!(counters.renders(), 1);

    assert_eq!(section.render(ItemId(6)).await.unwrap(), RenderOutcome::Rendered);
    assert_eq!(counters.renders(), 2);
}

#[tokio::test]
async fn secondary_render_requires_primary_render() {
    let counters = Arc::new(Counters::default());
    let mut section = initialized(counting_section(&counters));

    let outcome = section.secondary_render(ItemId(5)).await.unwrap();
    assert_eq!(outcome, RenderOutcome::Skipped);

    section.render(ItemId(5)).await.unwrap();
    assert!(section.secondary_render(ItemId(5)).await.unwrap().is_rendered());
    assert_eq!(
        section.secondary_render(ItemId(5)).await.unwrap(),
        RenderOutcome::Skipped
    );
    assert_eq!(counters.secondaries(), 1);
    assert_eq!(section.runtime().secondary_rendered_item, Some(ItemId(5)));
}

#[tokio::test]
async fn failed_render_reopens_the_gate() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let options = SectionOptions::new(
        "p1-flaky",
        "p1",
        SectionHeader::new("head", "head.svg"),
        SectionHeader::new("sidenav", "sidenav.svg"),
        RenderHook::sync(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(HookError::new("first render fails"))
            } else {
                Ok(())
            }
        }),
    );
    let mut section = initialized(options);

    let first = section.render(ItemId(1)).await.unwrap();
    assert_eq!(first, RenderOutcome::Failed(HookError::new("first render fails")));
    assert_eq!(section.runtime().rendered_item, None);

    assert!(section.render(ItemId(1)).await.unwrap().is_rendered());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn panicking_render_is_contained() {
    let options = SectionOptions::new(
        "p1-broken",
        "p1",
        SectionHeader::new("head", "head.svg"),
        SectionHeader::new("sidenav", "sidenav.svg"),
        RenderHook::sync(|_| panic!("render exploded")),
    );
    let mut section = initialized(options);

    let outcome = section.render(ItemId(1)).await.unwrap();
    assert!(matches!(outcome, RenderOutcome::Failed(_)));
    assert_eq!(section.state(), SectionState::Initialized);
}

#[tokio::test]
async fn init_binds_declared_render_mode() {
    let counters = Arc::new(Counters::default());
    let mut section = SectionController::new(counting_section(&counters));
    assert_eq!(section.render_mode(), None);

    section.init().unwrap();
    assert_eq!(section.render_mode(), Some(RenderMode::Synchronous));
    assert_eq!(
        section.init(),
        Err(SectionError::AlreadyInitialized {
            pane_id: "p1-notes".into()
        })
    );
}

// ─────────────────────────────────────────────────────────────────────
// 2. Data changes and toggling
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn data_change_veto_keeps_previous_value() {
    let options = counting_section(&Arc::new(Counters::default()))
        .on_data_change(|_, change| !matches!(change, DataChange::Mode(ViewMode::Edit)));
    let mut section = initialized(options);

    assert!(!section.data_change(DataChange::Mode(ViewMode::Edit)).unwrap());
    assert_eq!(section.data().mode, ViewMode::View);

    assert!(section.data_change(DataChange::InTrash(true)).unwrap());
    assert!(section.data().in_trash);
}

#[tokio::test]
async fn data_change_without_hook_is_applied() {
    let mut section = SectionController::new(counting_section(&Arc::new(Counters::default())));

    assert!(section.data_change(DataChange::Item(Some(ItemId(9)))).unwrap());
    assert!(section.data_change(DataChange::TabType(TabType::Reader)).unwrap());

    let data = section.data();
    assert_eq!(data.item, Some(ItemId(9)));
    assert_eq!(data.tab_type, TabType::Reader);
}

#[tokio::test]
async fn data_change_hook_can_disable_section() {
    let options = counting_section(&Arc::new(Counters::default())).on_data_change(|section, change| {
        if let DataChange::TabType(tab_type) = change {
            section.set_enabled(*tab_type == TabType::Reader);
        }
        true
    });
    let mut section = initialized(options);

    section.data_change(DataChange::TabType(TabType::Library)).unwrap();
    assert!(!section.context().is_enabled());
    section.data_change(DataChange::TabType(TabType::Reader)).unwrap();
    assert!(section.context().is_enabled());
}

#[tokio::test]
async fn expanding_renders_bound_item_once() {
    let counters = Arc::new(Counters::default());
    let toggles = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&toggles);
    let options = counting_section(&counters).on_toggle(move |_, event| seen.lock().push(event.open));
    let mut section = initialized(options);
    section.data_change(DataChange::Item(Some(ItemId(3)))).unwrap();

    section.toggle(ToggleEvent { open: true }).await.unwrap();
    section.toggle(ToggleEvent { open: false }).await.unwrap();
    section.toggle(ToggleEvent { open: true }).await.unwrap();

    assert_eq!(counters.renders(), 1);
    assert_eq!(counters.secondaries(), 1);
    assert_eq!(*toggles.lock(), vec![true, false, true]);
}

#[tokio::test]
async fn section_buttons_dispatch_clicks() {
    let clicks = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&clicks);
    let options = counting_section(&Arc::new(Counters::default())).with_button(SectionButton::new(
        "open-note",
        move |section, event| sink.lock().push(format!("{}:{}", section.pane_id(), event.button_type)),
    ));
    let section = initialized(options);

    assert!(section.click_button("open-note").unwrap());
    assert!(!section.click_button("unknown").unwrap());
    assert_eq!(*clicks.lock(), vec!["p1-notes:open-note".to_string()]);
}

// ─────────────────────────────────────────────────────────────────────
// 3. Refresh
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_during_init_is_ignored() {
    let results = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&results);
    let options = counting_section(&Arc::new(Counters::default()))
        .on_init(move |init| sink.lock().push(init.refresh.refresh()));
    let section = initialized(options);

    assert_eq!(*results.lock(), vec![false]);
    assert!(!section.refresh_requested());
}

#[tokio::test]
async fn refresh_rerenders_bound_item() {
    let counters = Arc::new(Counters::default());
    let mut section = initialized(counting_section(&counters));
    section.data_change(DataChange::Item(Some(ItemId(2)))).unwrap();
    section.render(ItemId(2)).await.unwrap();

    let handle = section.refresh_handle();
    assert!(handle.refresh());
    tokio::time::timeout(Duration::from_secs(1), section.refresh_notified())
        .await
        .unwrap();

    assert!(section.apply_refresh().await.unwrap());
    assert!(!section.apply_refresh().await.unwrap());
    assert_eq!(counters.renders(), 2);
    assert_eq!(counters.secondaries(), 1);
}

// ─────────────────────────────────────────────────────────────────────
// 4. Destroy
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn destroy_releases_hooks_and_rejects_further_calls() {
    let destroyed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&destroyed);
    let options = counting_section(&Arc::new(Counters::default()))
        .with_button(SectionButton::new("open-note", |_, _| {}))
        .on_destroy(move |context| sink.lock().push(context.pane_id.clone()));
    let mut section = initialized(options);
    let handle = section.refresh_handle();
    assert_eq!(section.listener_types(), vec!["open-note".to_string()]);

    section.destroy().unwrap();

    assert_eq!(*destroyed.lock(), vec!["p1-notes".to_string()]);
    assert_eq!(section.state(), SectionState::Destroyed);
    assert!(section.listener_types().is_empty());
    assert!(!handle.refresh());

    let destroyed_error = SectionError::Destroyed {
        pane_id: "p1-notes".into(),
    };
    assert_eq!(section.render(ItemId(1)).await, Err(destroyed_error.clone()));
    assert_eq!(section.click_button("open-note"), Err(destroyed_error.clone()));
    assert_eq!(
        section.data_change(DataChange::InTrash(true)),
        Err(destroyed_error.clone())
    );
    assert_eq!(section.destroy(), Err(destroyed_error));
}

#[tokio::test]
async fn render_before_init_is_rejected() {
    let mut section = SectionController::new(counting_section(&Arc::new(Counters::default())));

    assert_eq!(
        section.render(ItemId(1)).await,
        Err(SectionError::NotInitialized {
            pane_id: "p1-notes".into()
        })
    );
    assert!(!section.refresh_handle().refresh());
}

// ─────────────────────────────────────────────────────────────────────
// 5. Hook panics
// ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn panicking_init_hook_still_initializes() {
    let counters = Arc::new(Counters::default());
    let options = counting_section(&counters)
        .with_button(SectionButton::new("open-note", |_, _| {}))
        .on_init(|_| panic!("init exploded"));
    let mut section = SectionController::new(options);

    section.init().unwrap();

    assert_eq!(section.state(), SectionState::Initialized);
    assert_eq!(section.listener_types(), vec!["open-note".to_string()]);
    assert!(section.render(ItemId(1)).await.unwrap().is_rendered());
}

#[tokio::test]
async fn panicking_destroy_hook_completes_teardown() {
    let options = counting_section(&Arc::new(Counters::default()))
        .with_button(SectionButton::new("open-note", |_, _| {}))
        .on_destroy(|_| panic!("destroy exploded"));
    let mut section = initialized(options);
    let handle = section.refresh_handle();

    section.destroy().unwrap();

    assert_eq!(section.state(), SectionState::Destroyed);
    assert!(section.listener_types().is_empty());
    assert!(!handle.refresh());
    assert_eq!(
        section.destroy(),
        Err(SectionError::Destroyed {
            pane_id: "p1-notes".into()
        })
    );
}

#[tokio::test]
async fn panicking_data_change_hook_rejects_change() {
    let options = counting_section(&Arc::new(Counters::default())).on_data_change(|_, change| {
        if matches!(change, DataChange::InTrash(_)) {
            panic!("data change exploded");
        }
        true
    });
    let mut section = initialized(options);

    assert!(!section.data_change(DataChange::InTrash(true)).unwrap());
    assert!(!section.data().in_trash);

    assert!(section.data_change(DataChange::Item(Some(ItemId(4)))).unwrap());
    assert_eq!(section.data().item, Some(ItemId(4)));
}

#[tokio::test]
async fn panicking_toggle_hook_still_renders() {
    let counters = Arc::new(Counters::default());
    let options = counting_section(&counters).on_toggle(|_, _| panic!("toggle exploded"));
    let mut section = initialized(options);
    section.data_change(DataChange::Item(Some(ItemId(3)))).unwrap();

    section.toggle(ToggleEvent { open: true }).await.unwrap();

    assert_eq!(counters.renders(), 1);
    assert_eq!(counters.secondaries(), 1);
}

#[tokio::test]
async fn panicking_button_listener_is_contained() {
    let options = counting_section(&Arc::new(Counters::default()))
        .with_button(SectionButton::new("open-note", |_, _| panic!("click exploded")));
    let mut section = initialized(options);

    assert!(section.click_button("open-note").unwrap());
    assert!(section.click_button("open-note").unwrap());
    section.destroy().unwrap();
    assert_eq!(section.state(), SectionState::Destroyed);
}
