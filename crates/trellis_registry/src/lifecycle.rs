//! Contributor lifecycle events.
//!
//! The host owns one [`ContributorLifecycle`] and fires
//! [`shutdown`](ContributorLifecycle::shutdown) when a contributor is disabled
//! or removed. Registries subscribe as [`ShutdownObserver`]s the first time
//! something is registered, and bulk-remove everything the contributor owned.

use core::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::namespace::ContributorId;

/// Receives contributor shutdown events.
#[async_trait]
pub trait ShutdownObserver: Send + Sync + 'static {
    /// Called when `contributor` shuts down.
    async fn on_contributor_shutdown(&self, contributor: &ContributorId);
}

struct ObserverEntry {
    name: String,
    observer: Weak<dyn ShutdownObserver>,
}

/// Subscription point for contributor shutdown.
///
/// Observers are held weakly; a dropped registry simply stops receiving
/// events. Observers are invoked sequentially in subscription order and the
/// observer list lock is not held while they run.
#[derive(Default)]
pub struct ContributorLifecycle {
    observers: RwLock<Vec<ObserverEntry>>,
}

impl fmt::Debug for ContributorLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .observers
            .read()
            .iter()
            .map(|entry| entry.name.clone())
            .collect();
        f.debug_struct("ContributorLifecycle")
            .field("observers", &names)
            .finish()
    }
}

impl ContributorLifecycle {
    /// Creates a lifecycle hub with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `observer` under `name`.
    ///
    /// Returns false if an observer with that name is already subscribed.
    pub fn subscribe(&self, name: impl Into<String>, observer: Weak<dyn ShutdownObserver>) -> bool {
        let name = name.into();
        let mut observers = self.observers.write();
        if observers.iter().any(|entry| entry.name == name) {
            return false;
        }
        tracing::debug!(observer = %name, "shutdown observer subscribed");
        observers.push(ObserverEntry { name, observer });
        true
    }

    /// Returns true if an observer named `name` is subscribed.
    #[must_use]
    pub fn is_subscribed(&self, name: &str) -> bool {
        self.observers.read().iter().any(|entry| entry.name == name)
    }

    /// Returns the number of subscribed observers that are still alive.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers
            .read()
            .iter()
            .filter(|entry| entry.observer.strong_count() > 0)
            .count()
    }

    /// Notifies every observer that `contributor` shut down.
    ///
    /// Returns the number of observers notified.
    pub async fn shutdown(&self, contributor: &ContributorId) -> usize {
        let observers: Vec<Arc<dyn ShutdownObserver>> = {
            let mut entries = self.observers.write();
            entries.retain(|entry| entry.observer.strong_count() > 0);
            entries
                .iter()
                .filter_map(|entry| entry.observer.upgrade())
                .collect()
        };

        tracing::debug!(%contributor, observers = observers.len(), "contributor shutdown");
        for observer in &observers {
            observer.on_contributor_shutdown(contributor).await;
        }
        observers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ShutdownObserver for Recorder {
        async fn on_contributor_shutdown(&self, contributor: &ContributorId) {
            self.seen.lock().push(contributor.to_string());
        }
    }

    #[tokio::test]
    async fn observers_receive_shutdown() {
        let lifecycle = ContributorLifecycle::new();
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn ShutdownObserver> = Arc::downgrade(&recorder) as Weak<dyn ShutdownObserver>;
        assert!(lifecycle.subscribe("recorder", weak));

        let notified = lifecycle.shutdown(&"p1".into()).await;

        assert_eq!(notified, 1);
        assert_eq!(*recorder.seen.lock(), vec!["p1".to_string()]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let lifecycle = ContributorLifecycle::new();
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn ShutdownObserver> = Arc::downgrade(&recorder) as Weak<dyn ShutdownObserver>;
        assert!(lifecycle.subscribe("recorder", weak.clone()));
        assert!(!lifecycle.subscribe("recorder", weak));
        assert!(lifecycle.is_subscribed("recorder"));
        assert_eq!(lifecycle.observer_count(), 1);
    }

    #[tokio::test]
    async fn dropped_observers_are_skipped() {
        let lifecycle = ContributorLifecycle::new();
        {
            let recorder = Arc::new(Recorder::default());
            let weak: Weak<dyn ShutdownObserver> =
                Arc::downgrade(&recorder) as Weak<dyn ShutdownObserver>;
            lifecycle.subscribe("gone", weak);
        }
        assert_eq!(lifecycle.shutdown(&"p1".into()).await, 0);
    }
}
