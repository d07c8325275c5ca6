//! Contributor host.
//!
//! A [`Contributor`] is a plugin as the registries see it: an id, a startup
//! that registers rows, sections and columns, and an optional shutdown. The
//! [`Host`] starts contributors in the order they were added and shuts them
//! down in reverse, dispatching the lifecycle shutdown event so every registry
//! drops the contributor's entries.
//!
//! ```ignore
//! let mut host = Host::new(Registries::new());
//! host.add_contributor(CitationsPlugin)?;
//! host.start().await?;
//! // ...
//! host.shutdown_all().await;
//! ```

use async_trait::async_trait;
use indexmap::{IndexMap, IndexSet};
use trellis_registry::{ContributorId, RegistryError};

use crate::error::HostError;
use crate::registries::Registries;

// ─────────────────────────────────────────────────────────────────────────────
// Contributor
// ─────────────────────────────────────────────────────────────────────────────

/// A plugin that contributes to the registries.
#[async_trait]
pub trait Contributor: Send + Sync + 'static {
    /// Identifier used to namespace this contributor's keys.
    fn id(&self) -> ContributorId;

    /// Registers this contributor's rows, sections and columns.
    ///
    /// # Errors
    ///
    /// Returns the first registry rejection. Entries registered before the
    /// failure are removed by the host.
    async fn startup(&self, registries: &Registries) -> Result<(), RegistryError>;

    /// Called before the contributor's entries are removed.
    async fn shutdown(&self, _registries: &Registries) {}
}

// ─────────────────────────────────────────────────────────────────────────────
// Host
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the registries and drives contributor startup and shutdown.
pub struct Host {
    registries: Registries,
    contributors: IndexMap<ContributorId, Box<dyn Contributor>>,
    running: IndexSet<ContributorId>,
}

impl core::fmt::Debug for Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Host")
            .field("registries", &self.registries)
            .field("contributors", &self.contributors.keys().collect::<Vec<_>>())
            .field("running", &self.running)
            .finish()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new(Registries::new())
    }
}

impl Host {
    /// Creates a host around `registries`.
    #[must_use]
    pub fn new(registries: Registries) -> Self {
        Self {
            registries,
            contributors: IndexMap::new(),
            running: IndexSet::new(),
        }
    }

    /// Returns the registries.
    #[must_use]
    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Adds a contributor. It is started by the next [`Host::start`].
    ///
    /// # Errors
    ///
    /// Returns [`HostError::DuplicateContributor`] if the id is taken.
    pub fn add_contributor<C: Contributor>(&mut self, contributor: C) -> Result<(), HostError> {
        let id = contributor.id();
        if self.contributors.contains_key(&id) {
            return Err(HostError::DuplicateContributor { id });
        }
        tracing::debug!(contributor = %id, "contributor added");
        self.contributors.insert(id, Box::new(contributor));
        Ok(())
    }

    /// Returns true if the contributor was started and not yet shut down.
    #[must_use]
    pub fn is_running(&self, id: &ContributorId) -> bool {
        self.running.contains(id)
    }

    /// Returns the ids of running contributors in start order.
    #[must_use]
    pub fn running(&self) -> Vec<ContributorId> {
        self.running.iter().cloned().collect()
    }

    /// Starts every contributor that is not running, in the order added.
    ///
    /// Stops at the first failure. The failing contributor's partial
    /// registrations are removed; contributors started before it keep
    /// running.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Startup`] with the registry rejection.
    pub async fn start(&mut self) -> Result<(), HostError> {
        for (id, contributor) in &self.contributors {
            if self.running.contains(id) {
                continue;
            }
            match contributor.startup(&self.registries).await {
                Ok(()) => {
                    tracing::info!(contributor = %id, "contributor started");
                    self.running.insert(id.clone());
                }
                Err(source) => {
                    tracing::error!(contributor = %id, error = %source, "contributor failed to start");
                    self.registries.lifecycle().shutdown(id).await;
                    return Err(HostError::Startup {
                        id: id.clone(),
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// Shuts one contributor down and removes its entries from every registry.
    ///
    /// Returns false if the contributor was not running.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::UnknownContributor`] for an id never added.
    pub async fn shutdown(&mut self, id: &ContributorId) -> Result<bool, HostError> {
        let Some(contributor) = self.contributors.get(id) else {
            return Err(HostError::UnknownContributor { id: id.clone() });
        };
        if !self.running.shift_remove(id) {
            return Ok(false);
        }
        contributor.shutdown(&self.registries).await;
        let observers = self.registries.lifecycle().shutdown(id).await;
        tracing::info!(contributor = %id, observers, "contributor shut down");
        Ok(true)
    }

    /// Shuts every running contributor down, last started first.
    pub async fn shutdown_all(&mut self) {
        while let Some(id) = self.running.last().cloned() {
            if let Err(error) = self.shutdown(&id).await {
                // running ids are always added contributors
                tracing::warn!(contributor = %id, %error, "shutdown skipped");
                self.running.shift_remove(&id);
            }
        }
    }
}
