//! Arguments handed to section hooks.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use trellis_registry::ItemId;

// ─────────────────────────────────────────────────────────────────────────────
// Section data
// ─────────────────────────────────────────────────────────────────────────────

/// Display mode of the item pane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Read-only.
    #[default]
    View,
    /// Fields are editable.
    Edit,
}

/// Kind of tab the item pane is shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabType {
    /// The library tab.
    #[default]
    Library,
    /// A reader tab.
    Reader,
}

/// Input data bound to a section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionData {
    /// The active item.
    pub item: Option<ItemId>,
    /// Display mode.
    pub mode: ViewMode,
    /// Whether the active item is in the trash.
    pub in_trash: bool,
    /// Kind of the enclosing tab.
    pub tab_type: TabType,
}

/// An incoming change of one [`SectionData`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum DataChange {
    /// The active item changed.
    Item(Option<ItemId>),
    /// The display mode changed.
    Mode(ViewMode),
    /// The trash state changed.
    InTrash(bool),
    /// The tab type changed.
    TabType(TabType),
}

impl DataChange {
    pub(crate) fn apply(self, data: &mut SectionData) {
        match self {
            Self::Item(item) => data.item = item,
            Self::Mode(mode) => data.mode = mode,
            Self::InTrash(in_trash) => data.in_trash = in_trash,
            Self::TabType(tab_type) => data.tab_type = tab_type,
        }
    }
}

/// Expand/collapse event of the section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleEvent {
    /// True when the section was expanded.
    pub open: bool,
}

/// Click event of a section button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEvent {
    /// The clicked button type.
    pub button_type: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// SectionContext
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct SectionShared {
    data: RwLock<SectionData>,
    enabled: AtomicBool,
    l10n_args: RwLock<Option<String>>,
}

/// Handle passed to render, data change, toggle and button hooks.
///
/// Clones share the same section state.
#[derive(Debug, Clone)]
pub struct SectionContext {
    pane_id: Arc<str>,
    shared: Arc<SectionShared>,
}

impl SectionContext {
    pub(crate) fn new(pane_id: &str) -> Self {
        let shared = SectionShared {
            enabled: AtomicBool::new(true),
            ..SectionShared::default()
        };
        Self {
            pane_id: Arc::from(pane_id),
            shared: Arc::new(shared),
        }
    }

    /// Returns the namespaced pane id.
    #[must_use]
    pub fn pane_id(&self) -> &str {
        &self.pane_id
    }

    /// Returns a copy of the bound data.
    #[must_use]
    pub fn get_data(&self) -> SectionData {
        self.shared.data.read().clone()
    }

    pub(crate) fn set_data(&self, data: SectionData) {
        *self.shared.data.write() = data;
    }

    /// Enables or disables the section.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::Release);
    }

    /// Returns true if the section is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::Acquire)
    }

    /// Sets the localization arguments of the section header.
    pub fn set_l10n_args(&self, args: impl Into<String>) {
        *self.shared.l10n_args.write() = Some(args.into());
    }

    /// Returns the localization arguments of the section header.
    #[must_use]
    pub fn l10n_args(&self) -> Option<String> {
        self.shared.l10n_args.read().clone()
    }
}

/// Arguments of the init hook: the section context plus a refresh handle.
#[derive(Debug, Clone)]
pub struct InitContext {
    /// Section handle.
    pub section: SectionContext,
    /// Requests a re-render once the section is initialized.
    pub refresh: RefreshHandle,
}

/// Arguments of the destroy hook. Carries no data accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestroyContext {
    /// Namespaced pane id.
    pub pane_id: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Refresh
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) const STATE_UNINITIALIZED: u8 = 0;
pub(crate) const STATE_INITIALIZED: u8 = 1;
pub(crate) const STATE_DESTROYED: u8 = 2;

/// Shared between a controller and its refresh handles.
#[derive(Debug, Default)]
pub(crate) struct RefreshSignal {
    state: AtomicU8,
    pending: AtomicBool,
    notify: Notify,
}

impl RefreshSignal {
    pub(crate) fn set_state(&self, state: u8) {
        self.state.store(state, Ordering::Release);
        if state == STATE_DESTROYED {
            self.pending.store(false, Ordering::Release);
            self.notify.notify_waiters();
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn take_pending(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub(crate) async fn wait(&self) {
        let notified = self.notify.notified();
        if self.is_pending() || self.state.load(Ordering::Acquire) == STATE_DESTROYED {
            return;
        }
        notified.await;
    }
}

/// Lets a contributor ask its section to re-render.
///
/// Only takes effect while the section is initialized; before `init` has
/// finished and after `destroy` it does nothing.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    signal: Weak<RefreshSignal>,
}

impl RefreshHandle {
    pub(crate) fn new(signal: &Arc<RefreshSignal>) -> Self {
        Self {
            signal: Arc::downgrade(signal),
        }
    }

    /// Requests a re-render. Returns false if the request was ignored.
    pub fn refresh(&self) -> bool {
        let Some(signal) = self.signal.upgrade() else {
            return false;
        };
        if signal.state.load(Ordering::Acquire) != STATE_INITIALIZED {
            return false;
        }
        signal.pending.store(true, Ordering::Release);
        signal.notify.notify_one();
        true
    }
}
