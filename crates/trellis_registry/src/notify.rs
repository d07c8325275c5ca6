//! Live view notification.
//!
//! Views that render registry contents attach themselves to the registry's
//! [`ViewNotifier`]. After every committed mutation the registry calls
//! [`ViewNotifier::spawn_notify`], which asks each live view to refresh on a
//! detached task. The mutating caller never waits for a view; use
//! [`ViewNotifier::settled`] to wait until detached rounds have finished.
//!
//! # Error Isolation
//!
//! Each view is refreshed on its own. A view that returns an error or panics
//! is logged and skipped; the remaining views are still refreshed and the
//! caller never sees the failure.
//!
//! # Lifetime
//!
//! The notifier only holds [`Weak`] references. A view that has been dropped
//! is pruned on the next notification, so views do not need to detach
//! explicitly when they are torn down.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use trellis_registry::{HookError, RefreshTarget, ViewNotifier};
//!
//! struct ItemBoxView;
//!
//! #[async_trait]
//! impl RefreshTarget for ItemBoxView {
//!     async fn refresh(&self) -> Result<(), HookError> {
//!         Ok(())
//!     }
//! }
//!
//! let notifier = ViewNotifier::new("itembox");
//! let view = Arc::new(ItemBoxView);
//! let id = notifier.attach(&view);
//! assert_eq!(notifier.live_views(), 1);
//! assert!(notifier.detach(&id));
//! ```

use core::fmt;
use core::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::Notify;

use crate::error::HookError;

// ─────────────────────────────────────────────────────────────────────────────
// RefreshTarget
// ─────────────────────────────────────────────────────────────────────────────

/// A live view that re-queries its registry and re-renders on request.
#[async_trait]
pub trait RefreshTarget: Send + Sync + 'static {
    /// Re-queries the registry and re-renders.
    async fn refresh(&self) -> Result<(), HookError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewId
// ─────────────────────────────────────────────────────────────────────────────

/// Handle identifying an attached view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewId(Arc<str>);

impl ViewId {
    fn new() -> Self {
        Self(nanoid::nanoid!().into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view_{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// RefreshReport
// ─────────────────────────────────────────────────────────────────────────────

/// Summary of one notification round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Views that refreshed successfully.
    pub refreshed: usize,
    /// Views whose refresh failed or panicked.
    pub failed: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewNotifier
// ─────────────────────────────────────────────────────────────────────────────

struct ViewSlot {
    id: ViewId,
    view: Weak<dyn RefreshTarget>,
}

/// Signals live views of one kind to refresh.
pub struct ViewNotifier {
    kind: String,
    views: RwLock<Vec<ViewSlot>>,
    in_flight: AtomicUsize,
    idle: Notify,
}

impl fmt::Debug for ViewNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewNotifier")
            .field("kind", &self.kind)
            .field("live_views", &self.live_views())
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl ViewNotifier {
    /// Creates a notifier for views of `kind` (e.g. `"itembox"`).
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            views: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    /// Returns the view kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Attaches a live view. The notifier keeps only a weak reference.
    pub fn attach<V: RefreshTarget>(&self, view: &Arc<V>) -> ViewId {
        let id = ViewId::new();
        let weak: Weak<dyn RefreshTarget> = Arc::downgrade(view) as Weak<dyn RefreshTarget>;
        self.views.write().push(ViewSlot {
            id: id.clone(),
            view: weak,
        });
        tracing::debug!(kind = %self.kind, view = %id, "view attached");
        id
    }

    /// Detaches a view. Returns false if it was not attached.
    pub fn detach(&self, id: &ViewId) -> bool {
        let mut views = self.views.write();
        let before = views.len();
        views.retain(|slot| &slot.id != id);
        before != views.len()
    }

    /// Returns the number of attached views that are still alive.
    #[must_use]
    pub fn live_views(&self) -> usize {
        self.views
            .read()
            .iter()
            .filter(|slot| slot.view.strong_count() > 0)
            .count()
    }

    /// Asks every live view to refresh and waits for all of them.
    pub async fn notify(&self) {
        self.refresh_views().await;
    }

    /// Refreshes every live view on a detached tokio task.
    ///
    /// Returns false, without refreshing anything, when called outside a
    /// tokio runtime.
    pub fn spawn_notify(self: &Arc<Self>) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return false;
        };
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let notifier = Arc::clone(self);
        handle.spawn(async move {
            notifier.refresh_views().await;
            if notifier.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
                notifier.idle.notify_waiters();
            }
        });
        true
    }

    /// Returns the number of detached notification rounds still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Waits until every detached notification round has finished.
    ///
    /// Never returns while a view's refresh hangs.
    pub async fn settled(&self) {
        loop {
            let mut idle = core::pin::pin!(self.idle.notified());
            idle.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Refreshes every live view in attach order and reports the outcome.
    ///
    /// Dropped views are pruned. The view list lock is released before any
    /// view is awaited.
    pub async fn refresh_views(&self) -> RefreshReport {
        let targets: Vec<(ViewId, Arc<dyn RefreshTarget>)> = {
            let mut views = self.views.write();
            views.retain(|slot| slot.view.strong_count() > 0);
            views
                .iter()
                .filter_map(|slot| slot.view.upgrade().map(|view| (slot.id.clone(), view)))
                .collect()
        };

        let mut report = RefreshReport::default();
        for (id, view) in targets {
            match AssertUnwindSafe(view.refresh()).catch_unwind().await {
                Ok(Ok(())) => report.refreshed += 1,
                Ok(Err(error)) => {
                    report.failed += 1;
                    tracing::error!(kind = %self.kind, view = %id, %error, "view refresh failed");
                }
                Err(_) => {
                    report.failed += 1;
                    tracing::error!(kind = %self.kind, view = %id, "view refresh panicked");
                }
            }
        }

        tracing::debug!(
            kind = %self.kind,
            refreshed = report.refreshed,
            failed = report.failed,
            "views notified"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingView {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl RefreshTarget for CountingView {
        async fn refresh(&self) -> Result<(), HookError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingView;

    #[async_trait]
    impl RefreshTarget for FailingView {
        async fn refresh(&self) -> Result<(), HookError> {
            Err(HookError::new("render exploded"))
        }
    }

    struct PanickingView;

    #[async_trait]
    impl RefreshTarget for PanickingView {
        async fn refresh(&self) -> Result<(), HookError> {
            panic!("render panicked");
        }
    }

    #[tokio::test]
    async fn refreshes_every_live_view() {
        let notifier = ViewNotifier::new("itembox");
        let a = Arc::new(CountingView::default());
        let b = Arc::new(CountingView::default());
        notifier.attach(&a);
        notifier.attach(&b);

        notifier.notify().await;

        assert_eq!(a.refreshes.load(Ordering::SeqCst), 1);
        assert_eq!(b.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_views_do_not_stop_others() {
        let notifier = ViewNotifier::new("itempane");
        let failing = Arc::new(FailingView);
        let panicking = Arc::new(PanickingView);
        let healthy = Arc::new(CountingView::default());
        notifier.attach(&failing);
        notifier.attach(&panicking);
        notifier.attach(&healthy);

        let report = notifier.refresh_views().await;

        assert_eq!(report, RefreshReport { refreshed: 1, failed: 2 });
        assert_eq!(healthy.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropped_views_are_pruned() {
        let notifier = ViewNotifier::new("itemtree");
        let kept = Arc::new(CountingView::default());
        notifier.attach(&kept);
        {
            let dropped = Arc::new(CountingView::default());
            notifier.attach(&dropped);
            assert_eq!(notifier.live_views(), 2);
        }
        assert_eq!(notifier.live_views(), 1);

        let report = notifier.refresh_views().await;
        assert_eq!(report.refreshed, 1);
    }

    #[tokio::test]
    async fn spawned_round_is_awaited_by_settled() {
        let notifier = Arc::new(ViewNotifier::new("itembox"));
        let view = Arc::new(CountingView::default());
        notifier.attach(&view);

        assert!(notifier.spawn_notify());
        assert!(notifier.spawn_notify());
        notifier.settled().await;

        assert_eq!(view.refreshes.load(Ordering::SeqCst), 2);
        assert_eq!(notifier.in_flight(), 0);
    }

    #[test]
    fn spawn_outside_runtime_is_refused() {
        let notifier = Arc::new(ViewNotifier::new("itembox"));
        assert!(!notifier.spawn_notify());
        assert_eq!(notifier.in_flight(), 0);
    }

    #[test]
    fn detach_unknown_view_returns_false() {
        let notifier = ViewNotifier::new("itembox");
        let view = Arc::new(CountingView::default());
        let id = notifier.attach(&view);
        assert!(notifier.detach(&id));
        assert!(!notifier.detach(&id));
        assert_eq!(notifier.live_views(), 0);
    }
}
