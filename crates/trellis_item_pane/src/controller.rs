//! Per-instance render lifecycle of a custom section.
//!
//! A [`SectionController`] owns a copy of one registered [`SectionOptions`]
//! and drives its hooks for a single live section:
//!
//! ```text
//! Uninitialized ──init──▶ Initialized ──destroy──▶ Destroyed
//!       └───────────────────destroy───────────────────▲
//! ```
//!
//! Every method takes `&mut self`, so hooks of one section never run
//! concurrently. Render and secondary render are gated per item: asking to
//! render the item that was rendered last is a no-op.
//!
//! Hook panics are caught and logged. A panicking render hook fails the
//! render, a panicking data change hook rejects the change, and every other
//! hook panic is ignored so the lifecycle transition still completes.
//!
//! # Example
//!
//! ```ignore
//! let mut section = panes.create_section("p1-citations").expect("registered");
//! section.init()?;
//! section.data_change(DataChange::Item(Some(ItemId(5))))?;
//! assert_eq!(section.render(ItemId(5)).await?, RenderOutcome::Rendered);
//! assert_eq!(section.render(ItemId(5)).await?, RenderOutcome::Skipped);
//! section.destroy()?;
//! ```

use core::fmt;
use core::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use indexmap::IndexMap;
use trellis_registry::{HookError, HookResult, ItemId};

use crate::context::{
    ButtonEvent, DataChange, DestroyContext, InitContext, RefreshHandle, RefreshSignal,
    STATE_DESTROYED, STATE_INITIALIZED, SectionContext, SectionData, ToggleEvent,
};
use crate::error::SectionError;
use crate::section::{ButtonHook, RenderHook, RenderMode, SectionOptions};

/// Lifecycle state of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionState {
    /// Created, `init` not yet called.
    Uninitialized,
    /// Hooks are wired.
    Initialized,
    /// Torn down. Terminal.
    Destroyed,
}

/// Per-item render bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionRuntimeState {
    /// Item most recently passed to a primary render.
    pub rendered_item: Option<ItemId>,
    /// Item most recently passed to a secondary render.
    pub secondary_rendered_item: Option<ItemId>,
}

/// Result of a render or secondary render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The hook ran and succeeded.
    Rendered,
    /// The item was already rendered, or there is nothing to render.
    Skipped,
    /// The hook failed. The failure was logged and the gate reopened.
    Failed(HookError),
}

impl RenderOutcome {
    /// Returns true if the hook ran and succeeded.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Primary,
    Secondary,
}

/// Render lifecycle of one live custom section.
pub struct SectionController {
    pane_id: String,
    options: Option<SectionOptions>,
    state: SectionState,
    render_mode: Option<RenderMode>,
    runtime: SectionRuntimeState,
    context: SectionContext,
    signal: Arc<RefreshSignal>,
    listeners: IndexMap<String, ButtonHook>,
}

impl fmt::Debug for SectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionController")
            .field("pane_id", &self.pane_id)
            .field("state", &self.state)
            .field("render_mode", &self.render_mode)
            .field("runtime", &self.runtime)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SectionController {
    /// Creates an uninitialized controller over `options`.
    #[must_use]
    pub fn new(options: SectionOptions) -> Self {
        let pane_id = options.pane_id.clone();
        Self {
            context: SectionContext::new(&pane_id),
            pane_id,
            options: Some(options),
            state: SectionState::Uninitialized,
            render_mode: None,
            runtime: SectionRuntimeState::default(),
            signal: Arc::new(RefreshSignal::default()),
            listeners: IndexMap::new(),
        }
    }

    /// Returns the namespaced pane id.
    #[must_use]
    pub fn pane_id(&self) -> &str {
        &self.pane_id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> SectionState {
        self.state
    }

    /// Returns the render mode bound by `init`.
    #[must_use]
    pub fn render_mode(&self) -> Option<RenderMode> {
        self.render_mode
    }

    /// Returns the render bookkeeping.
    #[must_use]
    pub fn runtime(&self) -> SectionRuntimeState {
        self.runtime
    }

    /// Returns the context shared with hooks.
    #[must_use]
    pub fn context(&self) -> &SectionContext {
        &self.context
    }

    /// Returns a copy of the bound data.
    #[must_use]
    pub fn data(&self) -> SectionData {
        self.context.get_data()
    }

    /// Returns a handle that requests a re-render.
    #[must_use]
    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle::new(&self.signal)
    }

    /// Returns the button types with a bound click listener.
    #[must_use]
    pub fn listener_types(&self) -> Vec<String> {
        self.listeners.keys().cloned().collect()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Wires hooks and runs the init hook.
    ///
    /// A refresh requested from inside the init hook is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError::AlreadyInitialized`] on a second call and
    /// [`SectionError::Destroyed`] after `destroy`.
    pub fn init(&mut self) -> Result<(), SectionError> {
        match self.state {
            SectionState::Uninitialized => {}
            SectionState::Initialized => {
                return Err(SectionError::AlreadyInitialized {
                    pane_id: self.pane_id.clone(),
                });
            }
            SectionState::Destroyed => return Err(self.destroyed()),
        }
        let Some(options) = self.options.as_ref() else {
            return Err(self.destroyed());
        };

        self.render_mode = Some(options.render_mode());
        self.listeners = options
            .section_buttons
            .iter()
            .map(|button| (button.button_type.clone(), Arc::clone(&button.on_click)))
            .collect();

        if let Some(on_init) = &options.on_init {
            let init = InitContext {
                section: self.context.clone(),
                refresh: RefreshHandle::new(&self.signal),
            };
            contain(&self.pane_id, "init", || on_init(&init));
        }

        self.state = SectionState::Initialized;
        self.signal.set_state(STATE_INITIALIZED);
        tracing::debug!(pane = %self.pane_id, mode = ?self.render_mode, "section initialized");
        Ok(())
    }

    /// Tears the section down: drops listeners, runs the destroy hook and
    /// releases every hook reference.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError::Destroyed`] if already destroyed.
    pub fn destroy(&mut self) -> Result<(), SectionError> {
        if self.state == SectionState::Destroyed {
            return Err(self.destroyed());
        }
        self.listeners.clear();
        self.signal.set_state(STATE_DESTROYED);
        self.state = SectionState::Destroyed;

        if let Some(on_destroy) = self.options.take().and_then(|options| options.on_destroy) {
            let context = DestroyContext {
                pane_id: self.pane_id.clone(),
            };
            contain(&self.pane_id, "destroy", || on_destroy(&context));
        }
        tracing::debug!(pane = %self.pane_id, "section destroyed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────

    /// Runs the primary render hook for `item` unless it was rendered last.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError`] if the section is not initialized.
    pub async fn render(&mut self, item: ItemId) -> Result<RenderOutcome, SectionError> {
        self.ensure_initialized()?;
        if self.runtime.rendered_item == Some(item) {
            return Ok(RenderOutcome::Skipped);
        }
        self.runtime.rendered_item = Some(item);

        let hook = self.options.as_ref().map(|options| options.on_render.clone());
        Ok(self.dispatch(Pass::Primary, hook).await)
    }

    /// Runs the secondary render hook for `item`.
    ///
    /// Skipped if there is no secondary hook, if `item` has not been
    /// primary-rendered, or if it was secondary-rendered last.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError`] if the section is not initialized.
    pub async fn secondary_render(&mut self, item: ItemId) -> Result<RenderOutcome, SectionError> {
        self.ensure_initialized()?;
        let hook = self
            .options
            .as_ref()
            .and_then(|options| options.on_secondary_render.clone());
        if hook.is_none()
            || self.runtime.rendered_item != Some(item)
            || self.runtime.secondary_rendered_item == Some(item)
        {
            return Ok(RenderOutcome::Skipped);
        }
        self.runtime.secondary_rendered_item = Some(item);
        Ok(self.dispatch(Pass::Secondary, hook).await)
    }

    async fn dispatch(&mut self, pass: Pass, hook: Option<RenderHook>) -> RenderOutcome {
        let Some(hook) = hook else {
            return RenderOutcome::Skipped;
        };
        let result = match &hook {
            RenderHook::Sync(render) => {
                let context = &self.context;
                std::panic::catch_unwind(AssertUnwindSafe(|| render(context)))
                    .unwrap_or_else(|_| Err(HookError::new("render hook panicked")))
            }
            RenderHook::Async(render) => AssertUnwindSafe(render(self.context.clone()))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(HookError::new("render hook panicked"))),
        };
        self.finish(pass, result)
    }

    fn finish(&mut self, pass: Pass, result: HookResult) -> RenderOutcome {
        match result {
            Ok(()) => RenderOutcome::Rendered,
            Err(error) => {
                match pass {
                    Pass::Primary => {
                        self.runtime.rendered_item = None;
                        self.runtime.secondary_rendered_item = None;
                    }
                    Pass::Secondary => self.runtime.secondary_rendered_item = None,
                }
                tracing::error!(pane = %self.pane_id, ?pass, %error, "section render failed");
                RenderOutcome::Failed(error)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Events
    // ─────────────────────────────────────────────────────────────────────

    /// Offers a data change to the data change hook and applies it unless
    /// the hook returns false or panics.
    ///
    /// Allowed before `init` so the host can bind data first. Returns true if
    /// the change was applied.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError::Destroyed`] after `destroy`.
    pub fn data_change(&mut self, change: DataChange) -> Result<bool, SectionError> {
        if self.state == SectionState::Destroyed {
            return Err(self.destroyed());
        }
        let accepted = self
            .options
            .as_ref()
            .and_then(|options| options.on_data_change.as_ref())
            .is_none_or(|hook| {
                contain(&self.pane_id, "data change", || hook(&self.context, &change))
                    .unwrap_or(false)
            });
        if !accepted {
            tracing::debug!(pane = %self.pane_id, ?change, "data change rejected by section");
            return Ok(false);
        }

        let mut data = self.context.get_data();
        change.apply(&mut data);
        self.context.set_data(data);
        Ok(true)
    }

    /// Handles expand/collapse of the section.
    ///
    /// On expand, renders and then secondary-renders the bound item if it
    /// has not been rendered yet.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError`] if the section is not initialized.
    pub async fn toggle(&mut self, event: ToggleEvent) -> Result<(), SectionError> {
        self.ensure_initialized()?;
        if let Some(on_toggle) = self.options.as_ref().and_then(|options| options.on_toggle.as_ref()) {
            contain(&self.pane_id, "toggle", || on_toggle(&self.context, &event));
        }
        if !event.open {
            return Ok(());
        }
        let Some(item) = self.context.get_data().item else {
            return Ok(());
        };
        if self.runtime.rendered_item != Some(item) {
            self.render(item).await?;
            self.secondary_render(item).await?;
        }
        Ok(())
    }

    /// Dispatches a click on the section button of `button_type`.
    ///
    /// Returns false if no such button is bound. A panicking listener still
    /// counts as dispatched.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError`] if the section is not initialized.
    pub fn click_button(&self, button_type: &str) -> Result<bool, SectionError> {
        self.ensure_initialized()?;
        let Some(listener) = self.listeners.get(button_type) else {
            return Ok(false);
        };
        let event = ButtonEvent {
            button_type: button_type.to_string(),
        };
        contain(&self.pane_id, "button", || listener(&self.context, &event));
        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Refresh
    // ─────────────────────────────────────────────────────────────────────

    /// Returns true if a refresh was requested and not yet applied.
    #[must_use]
    pub fn refresh_requested(&self) -> bool {
        self.signal.is_pending()
    }

    /// Waits until a refresh is requested or the section is destroyed.
    pub async fn refresh_notified(&self) {
        self.signal.wait().await;
    }

    /// Applies a pending refresh by re-rendering the bound item.
    ///
    /// Returns false if no refresh was pending or no item is bound.
    ///
    /// # Errors
    ///
    /// Returns [`SectionError`] if the section is not initialized.
    pub async fn apply_refresh(&mut self) -> Result<bool, SectionError> {
        self.ensure_initialized()?;
        if !self.signal.take_pending() {
            return Ok(false);
        }
        let Some(item) = self.context.get_data().item else {
            return Ok(false);
        };
        self.runtime = SectionRuntimeState::default();
        self.render(item).await?;
        self.secondary_render(item).await?;
        Ok(true)
    }

    fn ensure_initialized(&self) -> Result<(), SectionError> {
        match self.state {
            SectionState::Initialized => Ok(()),
            SectionState::Uninitialized => Err(SectionError::NotInitialized {
                pane_id: self.pane_id.clone(),
            }),
            SectionState::Destroyed => Err(self.destroyed()),
        }
    }

    fn destroyed(&self) -> SectionError {
        SectionError::Destroyed {
            pane_id: self.pane_id.clone(),
        }
    }
}

/// Runs a synchronous hook, turning a panic into `None`.
fn contain<R>(pane_id: &str, hook: &'static str, run: impl FnOnce() -> R) -> Option<R> {
    match std::panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::error!(pane = %pane_id, hook, "section hook panicked");
            None
        }
    }
}
