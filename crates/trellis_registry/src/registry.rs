//! The generic contribution registry.
//!
//! A [`ContributionRegistry`] stores the options contributed for one registry
//! kind, keyed by namespaced key, in registration order.
//!
//! # Mutation Protocol
//!
//! 1. The whole batch is validated ([`OptionValidator`]).
//! 2. Every key is namespaced with its contributor id.
//! 3. All entries are inserted and the version is bumped once.
//! 4. The registry subscribes to contributor shutdown (first success only).
//! 5. Live views are notified on a detached task.
//!
//! Steps 1-3 run under a single write lock, so a batch is committed entirely
//! or not at all. Notification starts only after the lock is released, and
//! the mutating caller does not wait for it.
//!
//! # Example
//!
//! ```ignore
//! let lifecycle = Arc::new(ContributorLifecycle::new());
//! let registry = ContributionRegistry::<RowOptions>::new(config, Arc::clone(&lifecycle));
//!
//! let keys = registry.register(vec![row]).await?;
//! assert_eq!(keys, vec!["p1-color"]);
//!
//! lifecycle.shutdown(&"p1".into()).await;
//! assert!(!registry.is_registered("p1-color"));
//! ```

use core::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::item::Item;
use crate::lifecycle::{ContributorLifecycle, ShutdownObserver};
use crate::namespace::ContributorId;
use crate::notify::ViewNotifier;
use crate::option::{Contribution, DATA_PROVIDER_FIELD, OptionFilter};
use crate::validate::OptionValidator;

/// Store of registered options of one kind.
pub struct ContributionRegistry<C: Contribution> {
    config: RegistryConfig,
    instance: String,
    entries: RwLock<IndexMap<String, C>>,
    version: AtomicU64,
    notifier: Arc<ViewNotifier>,
    lifecycle: Arc<ContributorLifecycle>,
    observer_installed: AtomicBool,
    this: Weak<Self>,
}

impl<C: Contribution> fmt::Debug for ContributionRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContributionRegistry")
            .field("api", &self.config.api_name())
            .field("keys", &self.keys())
            .field("version", &self.version())
            .finish()
    }
}

impl<C: Contribution> ContributionRegistry<C> {
    /// Creates an empty registry bound to the host's contributor lifecycle.
    #[must_use]
    pub fn new(config: RegistryConfig, lifecycle: Arc<ContributorLifecycle>) -> Arc<Self> {
        let instance = format!("{}#{}", config.api_name(), nanoid::nanoid!(8));
        let notifier = Arc::new(ViewNotifier::new(config.notify_kind()));
        Arc::new_cyclic(|this| Self {
            config,
            instance,
            entries: RwLock::new(IndexMap::new()),
            version: AtomicU64::new(0),
            notifier,
            lifecycle,
            observer_installed: AtomicBool::new(false),
            this: this.clone(),
        })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the API name used in logs and errors.
    #[must_use]
    pub fn api_name(&self) -> &str {
        self.config.api_name()
    }

    /// Returns the notifier live views attach to.
    #[must_use]
    pub fn notifier(&self) -> &ViewNotifier {
        &self.notifier
    }

    /// Returns the current version.
    ///
    /// Bumped once per committed register, unregister or contributor cleanup.
    /// Never decreases.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Returns true once the shutdown observer has been installed.
    #[must_use]
    pub fn observes_shutdown(&self) -> bool {
        self.observer_installed.load(Ordering::Acquire)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Registers a batch of options.
    ///
    /// Returns the namespaced keys in batch order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] if any entry is invalid; in that
    /// case nothing is inserted and the version is unchanged.
    pub async fn register(&self, batch: Vec<C>) -> Result<Vec<String>, RegistryError> {
        let keys = self.commit_insert(batch)?;
        self.install_shutdown_observer();
        self.notify_views().await;
        Ok(keys)
    }

    /// Registers a single option and returns its namespaced key.
    ///
    /// # Errors
    ///
    /// See [`register`](Self::register).
    pub async fn register_one(&self, option: C) -> Result<String, RegistryError> {
        let mut keys = self.register(vec![option]).await?;
        keys.pop()
            .ok_or_else(|| RegistryError::EmptyBatch {
                api: self.api_name().to_string(),
            })
    }

    /// Unregisters every listed key.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for the first unknown key; in that
    /// case nothing is removed and the version is unchanged.
    pub async fn unregister<K: AsRef<str>>(&self, keys: &[K]) -> Result<(), RegistryError> {
        self.commit_remove(keys)?;
        self.notify_views().await;
        Ok(())
    }

    /// Asks live views to refresh without mutating the registry and waits
    /// for them.
    pub async fn refresh(&self) {
        self.notifier.notify().await;
    }

    async fn notify_views(&self) {
        if !self.notifier.spawn_notify() {
            // no runtime to detach onto
            self.notifier.notify().await;
        }
    }

    fn commit_insert(&self, mut batch: Vec<C>) -> Result<Vec<String>, RegistryError> {
        if batch.is_empty() {
            return Err(RegistryError::EmptyBatch {
                api: self.api_name().to_string(),
            });
        }
        for option in &mut batch {
            option.prepare();
        }

        let mut entries = self.entries.write();
        let keys = OptionValidator::new(&self.config)
            .validate(&batch, |key| entries.contains_key(key))
            .map_err(|reason| {
                tracing::warn!(api = self.api_name(), %reason, "registration rejected");
                RegistryError::validation(self.api_name(), reason)
            })?;

        for (mut option, key) in batch.into_iter().zip(keys.iter().cloned()) {
            option.set_key(key.clone());
            entries.insert(key, option);
        }
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        drop(entries);

        tracing::debug!(api = self.api_name(), ?keys, version, "registered");
        Ok(keys)
    }

    fn commit_remove<K: AsRef<str>>(&self, keys: &[K]) -> Result<(), RegistryError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut entries = self.entries.write();
        if let Some(missing) = keys.iter().find(|key| !entries.contains_key(key.as_ref())) {
            let missing = missing.as_ref();
            tracing::warn!(api = self.api_name(), key = missing, "unregister of unknown key");
            return Err(RegistryError::not_found(self.api_name(), missing));
        }
        for key in keys {
            entries.shift_remove(key.as_ref());
        }
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        drop(entries);

        tracing::debug!(api = self.api_name(), removed = keys.len(), version, "unregistered");
        Ok(())
    }

    fn install_shutdown_observer(&self) {
        if self
            .observer_installed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let observer: Weak<dyn ShutdownObserver> = self.this.clone() as Weak<dyn ShutdownObserver>;
        self.lifecycle.subscribe(self.instance.clone(), observer);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────

    /// Returns a copy of every entry, in registration order.
    #[must_use]
    pub fn entries(&self) -> Vec<C> {
        self.entries.read().values().cloned().collect()
    }

    /// Returns a copy of every entry that matches `filter`.
    #[must_use]
    pub fn query(&self, filter: &OptionFilter) -> Vec<C> {
        self.entries
            .read()
            .values()
            .filter(|option| filter.matches(*option))
            .cloned()
            .collect()
    }

    /// Returns a copy of the entry registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<C> {
        self.entries.read().get(key).cloned()
    }

    /// Returns true if `key` is registered.
    #[must_use]
    pub fn is_registered(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Returns every registered key, in registration order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the keys owned by `contributor`.
    #[must_use]
    pub fn keys_owned_by(&self, contributor: &ContributorId) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .filter(|(_, option)| option.contributor_id() == contributor)
            .map(|(key, _)| key.clone())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Data dispatch
    // ─────────────────────────────────────────────────────────────────────

    /// Returns the entry's data for `item`.
    ///
    /// Falls back to the schema's declared fallback for the data provider,
    /// or the empty string, when the key is unknown or has no provider.
    #[must_use]
    pub fn get_data(&self, item: &dyn Item, key: &str) -> String {
        let option = self.get(key);
        option
            .and_then(|option| option.provide_data(item, key))
            .unwrap_or_else(|| {
                self.config
                    .schema()
                    .fallback(DATA_PROVIDER_FIELD)
                    .and_then(|value| value.as_str())
                    .unwrap_or_default()
                    .to_string()
            })
    }

    /// Stores `value` through the entry's data setter.
    ///
    /// Returns false if the key is unknown or has no setter.
    pub fn set_data(&self, item: &dyn Item, key: &str, value: &str) -> bool {
        self.get(key)
            .is_some_and(|option| option.store_data(item, key, value))
    }
}

#[async_trait]
impl<C: Contribution> ShutdownObserver for ContributionRegistry<C> {
    async fn on_contributor_shutdown(&self, contributor: &ContributorId) {
        let keys = self.keys_owned_by(contributor);
        if keys.is_empty() {
            return;
        }
        match self.unregister(keys.as_slice()).await {
            Ok(()) => tracing::debug!(
                api = self.api_name(),
                %contributor,
                removed = keys.len(),
                "entries unregistered due to contributor shutdown"
            ),
            Err(error) => tracing::warn!(
                api = self.api_name(),
                %contributor,
                %error,
                "contributor cleanup failed"
            ),
        }
    }
}
