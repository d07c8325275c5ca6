//! Section options contributed to the item pane.

use core::fmt;
use core::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use trellis_registry::schema::{FieldKind, FieldRule, OptionSchema};
use trellis_registry::{Contribution, ContributorId, FieldValue, HookResult};

use crate::context::{
    ButtonEvent, DataChange, DestroyContext, InitContext, SectionContext, ToggleEvent,
};

// ─────────────────────────────────────────────────────────────────────────────
// Hooks
// ─────────────────────────────────────────────────────────────────────────────

/// Synchronous render hook.
pub type SyncRender = Arc<dyn Fn(&SectionContext) -> HookResult + Send + Sync>;

/// Asynchronous render hook.
pub type AsyncRender = Arc<dyn Fn(SectionContext) -> BoxFuture<'static, HookResult> + Send + Sync>;

/// Called once when the section is initialized.
pub type InitHook = Arc<dyn Fn(&InitContext) + Send + Sync>;

/// Called once when the section is destroyed.
pub type DestroyHook = Arc<dyn Fn(&DestroyContext) + Send + Sync>;

/// Called before a data change is applied. Returning false rejects it.
pub type DataChangeHook = Arc<dyn Fn(&SectionContext, &DataChange) -> bool + Send + Sync>;

/// Called when the section is expanded or collapsed.
pub type ToggleHook = Arc<dyn Fn(&SectionContext, &ToggleEvent) + Send + Sync>;

/// Called when a section button is clicked.
pub type ButtonHook = Arc<dyn Fn(&SectionContext, &ButtonEvent) + Send + Sync>;

/// How a render hook is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Runs to completion inline whenever the pane renders.
    Synchronous,
    /// Awaited; the host may defer it until the section scrolls into view.
    Asynchronous,
}

impl RenderMode {
    /// Returns the lowercase name of the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Synchronous => "synchronous",
            Self::Asynchronous => "asynchronous",
        }
    }
}

/// A render hook with its declared dispatch mode.
#[derive(Clone)]
pub enum RenderHook {
    /// Synchronous hook.
    Sync(SyncRender),
    /// Asynchronous hook.
    Async(AsyncRender),
}

impl RenderHook {
    /// Wraps a synchronous render function.
    pub fn sync<F>(render: F) -> Self
    where
        F: Fn(&SectionContext) -> HookResult + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(render))
    }

    /// Wraps an asynchronous render function.
    pub fn asynchronous<F, Fut>(render: F) -> Self
    where
        F: Fn(SectionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        Self::Async(Arc::new(move |context| -> BoxFuture<'static, HookResult> {
            Box::pin(render(context))
        }))
    }

    /// Returns the declared dispatch mode.
    #[must_use]
    pub fn mode(&self) -> RenderMode {
        match self {
            Self::Sync(_) => RenderMode::Synchronous,
            Self::Async(_) => RenderMode::Asynchronous,
        }
    }
}

impl fmt::Debug for RenderHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderHook({:?})", self.mode())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Header and buttons
// ─────────────────────────────────────────────────────────────────────────────

/// Header or sidenav appearance of a section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionHeader {
    /// Localization id of the label or tooltip.
    pub l10n_id: String,
    /// Icon URI.
    pub icon: String,
    /// Icon URI in dark mode. Falls back to `icon`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_icon: Option<String>,
    /// Localization arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l10n_args: Option<String>,
}

impl SectionHeader {
    /// Creates a header with a localization id and an icon.
    #[must_use]
    pub fn new(l10n_id: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            l10n_id: l10n_id.into(),
            icon: icon.into(),
            dark_icon: None,
            l10n_args: None,
        }
    }

    /// Sets the dark mode icon.
    #[must_use]
    pub fn with_dark_icon(mut self, icon: impl Into<String>) -> Self {
        self.dark_icon = Some(icon.into());
        self
    }

    /// Sets the localization arguments.
    #[must_use]
    pub fn with_l10n_args(mut self, args: impl Into<String>) -> Self {
        self.l10n_args = Some(args.into());
        self
    }
}

/// A button shown in the section header.
#[derive(Clone)]
pub struct SectionButton {
    /// Button type. Must be non-empty and contain no `,`.
    pub button_type: String,
    /// Click callback.
    pub on_click: ButtonHook,
}

impl SectionButton {
    /// Creates a button.
    pub fn new<F>(button_type: impl Into<String>, on_click: F) -> Self
    where
        F: Fn(&SectionContext, &ButtonEvent) + Send + Sync + 'static,
    {
        Self {
            button_type: button_type.into(),
            on_click: Arc::new(on_click),
        }
    }
}

impl fmt::Debug for SectionButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionButton")
            .field("button_type", &self.button_type)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SectionOptions
// ─────────────────────────────────────────────────────────────────────────────

/// A custom section of the item pane.
#[derive(Clone)]
pub struct SectionOptions {
    /// Pane id, namespaced on registration.
    pub pane_id: String,
    /// Owning contributor.
    pub plugin_id: ContributorId,
    /// Header appearance.
    pub head: SectionHeader,
    /// Sidenav appearance.
    pub sidenav: SectionHeader,
    /// Pane body fragment markup.
    pub fragment: Option<String>,
    /// Primary render hook.
    pub on_render: RenderHook,
    /// Secondary render hook.
    pub on_secondary_render: Option<RenderHook>,
    /// Init hook.
    pub on_init: Option<InitHook>,
    /// Destroy hook.
    pub on_destroy: Option<DestroyHook>,
    /// Data change hook.
    pub on_data_change: Option<DataChangeHook>,
    /// Toggle hook.
    pub on_toggle: Option<ToggleHook>,
    /// Header buttons.
    pub section_buttons: Vec<SectionButton>,
}

impl fmt::Debug for SectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionOptions")
            .field("pane_id", &self.pane_id)
            .field("plugin_id", &self.plugin_id)
            .field("head", &self.head)
            .field("sidenav", &self.sidenav)
            .field("render_mode", &self.on_render.mode())
            .field("section_buttons", &self.section_buttons)
            .finish_non_exhaustive()
    }
}

impl SectionOptions {
    /// Creates a section with the required fields.
    #[must_use]
    pub fn new(
        pane_id: impl Into<String>,
        plugin_id: impl Into<ContributorId>,
        head: SectionHeader,
        sidenav: SectionHeader,
        on_render: RenderHook,
    ) -> Self {
        Self {
            pane_id: pane_id.into(),
            plugin_id: plugin_id.into(),
            head,
            sidenav,
            fragment: None,
            on_render,
            on_secondary_render: None,
            on_init: None,
            on_destroy: None,
            on_data_change: None,
            on_toggle: None,
            section_buttons: Vec::new(),
        }
    }

    /// Sets the body fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    /// Sets the secondary render hook.
    #[must_use]
    pub fn with_secondary_render(mut self, hook: RenderHook) -> Self {
        self.on_secondary_render = Some(hook);
        self
    }

    /// Sets the init hook.
    #[must_use]
    pub fn on_init<F>(mut self, hook: F) -> Self
    where
        F: Fn(&InitContext) + Send + Sync + 'static,
    {
        self.on_init = Some(Arc::new(hook));
        self
    }

    /// Sets the destroy hook.
    #[must_use]
    pub fn on_destroy<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DestroyContext) + Send + Sync + 'static,
    {
        self.on_destroy = Some(Arc::new(hook));
        self
    }

    /// Sets the data change hook.
    #[must_use]
    pub fn on_data_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SectionContext, &DataChange) -> bool + Send + Sync + 'static,
    {
        self.on_data_change = Some(Arc::new(hook));
        self
    }

    /// Sets the toggle hook.
    #[must_use]
    pub fn on_toggle<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SectionContext, &ToggleEvent) + Send + Sync + 'static,
    {
        self.on_toggle = Some(Arc::new(hook));
        self
    }

    /// Adds a header button.
    #[must_use]
    pub fn with_button(mut self, button: SectionButton) -> Self {
        self.section_buttons.push(button);
        self
    }

    /// Returns the declared render mode.
    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.on_render.mode()
    }
}

impl Contribution for SectionOptions {
    fn key(&self) -> &str {
        &self.pane_id
    }

    fn set_key(&mut self, key: String) {
        self.pane_id = key;
    }

    fn contributor_id(&self) -> &ContributorId {
        &self.plugin_id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        let callback = |set: bool| set.then_some(FieldValue::Callback);
        match name {
            "pane_id" => Some(self.pane_id.as_str().into()),
            "plugin_id" => Some(self.plugin_id.as_str().into()),
            "head" => serde_json::to_value(&self.head).ok().map(FieldValue::Object),
            "sidenav" => serde_json::to_value(&self.sidenav).ok().map(FieldValue::Object),
            "fragment" => self.fragment.clone().map(FieldValue::Text),
            "on_render" => Some(FieldValue::Callback),
            "render_mode" => Some(self.render_mode().as_str().into()),
            "on_secondary_render" => callback(self.on_secondary_render.is_some()),
            "on_init" => callback(self.on_init.is_some()),
            "on_destroy" => callback(self.on_destroy.is_some()),
            "on_data_change" => callback(self.on_data_change.is_some()),
            "on_toggle" => callback(self.on_toggle.is_some()),
            "section_buttons" => Some(FieldValue::List(
                self.section_buttons
                    .iter()
                    .map(|button| button.button_type.clone())
                    .collect(),
            )),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schema
// ─────────────────────────────────────────────────────────────────────────────

fn header_check(name: &'static str) -> FieldKind {
    FieldKind::custom(move |value| {
        let FieldValue::Object(header) = value else {
            return Err(format!("section option {name} must be object"));
        };
        for required in ["l10n_id", "icon"] {
            let present = header
                .get(required)
                .and_then(|field| field.as_str())
                .is_some_and(|field| !field.is_empty());
            if !present {
                return Err(format!(
                    "section option {name} {required} must be non-empty string"
                ));
            }
        }
        Ok(())
    })
}

fn buttons_check() -> FieldKind {
    FieldKind::custom(|value| {
        let FieldValue::List(types) = value else {
            return Err("section buttons must be array".to_string());
        };
        match types
            .iter()
            .find(|button_type| button_type.is_empty() || button_type.contains(','))
        {
            Some(bad) => Err(format!(
                "section button type must be non-empty and without ',', but got '{bad}'"
            )),
            None => Ok(()),
        }
    })
}

/// Schema every registered section is checked against.
#[must_use]
pub fn section_schema() -> OptionSchema {
    OptionSchema::new()
        .field("pane_id", FieldRule::required(FieldKind::Text))
        .field("plugin_id", FieldRule::required(FieldKind::Text))
        .field("head", FieldRule::required(header_check("head")))
        .field("sidenav", FieldRule::required(header_check("sidenav")))
        .field("on_render", FieldRule::required(FieldKind::Function))
        .field("fragment", FieldRule::optional(FieldKind::Text))
        .field("section_buttons", FieldRule::optional(buttons_check()))
}
