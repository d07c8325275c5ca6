//! Shared test utilities for `trellis_registry` integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use trellis_registry::{
    Contribution, ContributionRegistry, ContributorId, ContributorLifecycle, DataProvider,
    DataSetter, FieldKind, FieldRule, FieldValue, HookError, Item, ItemId, OptionSchema,
    RefreshTarget, RegistryConfig,
};

// ═══════════════════════════════════════════════════════════════════════════════
// TEST CONTRIBUTION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct Entry {
    pub data_key: String,
    pub plugin_id: ContributorId,
    pub label: Option<String>,
    pub index: Option<u32>,
    pub data_provider: Option<DataProvider>,
    pub data_setter: Option<DataSetter>,
}

impl Entry {
    pub fn new(data_key: &str, plugin_id: &str) -> Self {
        Self {
            data_key: data_key.into(),
            plugin_id: plugin_id.into(),
            label: Some(format!("Label {data_key}")),
            index: None,
            data_provider: None,
            data_setter: None,
        }
    }

    pub fn without_label(mut self) -> Self {
        self.label = None;
        self
    }

    pub fn with_provider(mut self, value: &'static str) -> Self {
        self.data_provider = Some(Arc::new(move |item: &dyn Item, key: &str| {
            format!("{value}:{}:{key}", item.id())
        }));
        self
    }

    pub fn with_setter(mut self, sink: Arc<Mutex<Vec<String>>>) -> Self {
        self.data_setter = Some(Arc::new(move |_item: &dyn Item, key: &str, value: &str| {
            sink.lock().push(format!("{key}={value}"));
        }));
        self
    }
}

impl Contribution for Entry {
    fn key(&self) -> &str {
        &self.data_key
    }

    fn set_key(&mut self, key: String) {
        self.data_key = key;
    }

    fn contributor_id(&self) -> &ContributorId {
        &self.plugin_id
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "data_key" => Some(self.data_key.as_str().into()),
            "plugin_id" => Some(self.plugin_id.as_str().into()),
            "label" => self.label.clone().map(FieldValue::Text),
            "index" => self.index.map(FieldValue::from),
            "data_provider" => self.data_provider.as_ref().map(|_| FieldValue::Callback),
            "data_setter" => self.data_setter.as_ref().map(|_| FieldValue::Callback),
            _ => None,
        }
    }

    fn provide_data(&self, item: &dyn Item, data_key: &str) -> Option<String> {
        self.data_provider
            .as_ref()
            .map(|provider| provider(item, data_key))
    }

    fn store_data(&self, item: &dyn Item, data_key: &str, value: &str) -> bool {
        self.data_setter.as_ref().is_some_and(|setter| {
            setter(item, data_key, value);
            true
        })
    }
}

pub fn config() -> RegistryConfig {
    RegistryConfig::new("TestManager", "data_key")
        .with_notify_kind("testview")
        .with_reserved_keys(["title", "date"])
        .with_schema(
            OptionSchema::new()
                .field("data_key", FieldRule::required(FieldKind::Text))
                .field("plugin_id", FieldRule::required(FieldKind::Text))
                .field("label", FieldRule::required(FieldKind::Text))
                .field("index", FieldRule::optional(FieldKind::Number))
                .field(
                    "data_provider",
                    FieldRule::optional(FieldKind::Function).with_fallback(""),
                )
                .field("data_setter", FieldRule::optional(FieldKind::Function)),
        )
}

pub fn new_registry() -> (Arc<ContributionRegistry<Entry>>, Arc<ContributorLifecycle>) {
    let lifecycle = Arc::new(ContributorLifecycle::new());
    let registry = ContributionRegistry::new(config(), Arc::clone(&lifecycle));
    (registry, lifecycle)
}

// ═══════════════════════════════════════════════════════════════════════════════
// VIEWS AND ITEMS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct CountingView {
    refreshes: AtomicUsize,
}

impl CountingView {
    pub fn count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshTarget for CountingView {
    async fn refresh(&self) -> Result<(), HookError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct BrokenView;

#[async_trait]
impl RefreshTarget for BrokenView {
    async fn refresh(&self) -> Result<(), HookError> {
        Err(HookError::new("view is broken"))
    }
}

/// Never finishes refreshing.
pub struct HangingView;

#[async_trait]
impl RefreshTarget for HangingView {
    async fn refresh(&self) -> Result<(), HookError> {
        futures::future::pending::<()>().await;
        Ok(())
    }
}

pub struct TestItem(pub u64);

impl Item for TestItem {
    fn id(&self) -> ItemId {
        ItemId(self.0)
    }
}
