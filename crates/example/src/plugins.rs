//! The demo contributors.

use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashMap;
use parking_lot::Mutex;
use trellis_core::{Contributor, Registries};
use trellis_item_box::RowOptions;
use trellis_item_pane::{DataChange, RenderHook, SectionButton, SectionContext, SectionHeader, SectionOptions};
use trellis_item_tree::ColumnOptions;
use trellis_registry::{ContributorId, ItemId, RegistryError};

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// WordCountPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Shows the abstract's word count as an item box row and a tree column.
#[derive(Debug, Default)]
pub struct WordCountPlugin;

impl WordCountPlugin {
    const ID: &'static str = "word-count";
}

#[async_trait]
impl Contributor for WordCountPlugin {
    fn id(&self) -> ContributorId {
        Self::ID.into()
    }

    async fn startup(&self, registries: &Registries) -> Result<(), RegistryError> {
        registries
            .item_box()
            .register_row(
                RowOptions::new("wordCount", "Words", Self::ID)
                    .with_index(0)
                    .with_data_provider(|item, _key| {
                        let text = item.field("abstractNote").unwrap_or_default();
                        word_count(&text).to_string()
                    }),
            )
            .await?;
        registries
            .item_tree()
            .register_column(
                ColumnOptions::new("wordCount", "Words", Self::ID)
                    .with_width("60px")
                    .with_data_provider(|item, _key| {
                        let text = item.field("abstractNote").unwrap_or_default();
                        word_count(&text).to_string()
                    })
                    .with_render_cell(|cell| {
                        Some(format!(
                            "<span class=\"cell {}\">{}</span>",
                            cell.column.data_key, cell.data
                        ))
                    }),
            )
            .await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ReadingNotesPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory reading notes keyed by item.
#[derive(Debug, Clone, Default)]
pub struct NoteStore {
    notes: Arc<Mutex<HashMap<ItemId, String>>>,
}

impl NoteStore {
    /// Returns the note of `item`.
    #[must_use]
    pub fn get(&self, item: ItemId) -> Option<String> {
        self.notes.lock().get(&item).cloned()
    }

    /// Replaces the note of `item`.
    pub fn set(&self, item: ItemId, note: impl Into<String>) {
        self.notes.lock().insert(item, note.into());
    }

    /// Removes the note of `item`.
    pub fn clear(&self, item: ItemId) -> bool {
        self.notes.lock().remove(&item).is_some()
    }
}

/// Editable reading note row plus an item pane section summarizing it.
#[derive(Debug, Clone, Default)]
pub struct ReadingNotesPlugin {
    store: NoteStore,
}

impl ReadingNotesPlugin {
    const ID: &'static str = "reader";

    /// Creates the plugin around `store`.
    #[must_use]
    pub fn new(store: NoteStore) -> Self {
        Self { store }
    }

    fn section(&self) -> SectionOptions {
        let render_store = self.store.clone();
        let clear_store = self.store.clone();
        SectionOptions::new(
            "reading-notes",
            Self::ID,
            SectionHeader::new("reader-notes-head", "chrome://reader/content/notes.svg"),
            SectionHeader::new("reader-notes-sidenav", "chrome://reader/content/notes.svg")
                .with_dark_icon("chrome://reader/content/notes-dark.svg"),
            RenderHook::asynchronous(move |section: SectionContext| {
                let store = render_store.clone();
                async move {
                    let words = section
                        .get_data()
                        .item
                        .and_then(|item| store.get(item))
                        .map_or(0, |note| word_count(&note));
                    section.set_l10n_args(format!("{{\"words\":{words}}}"));
                    Ok(())
                }
            }),
        )
        .on_data_change(|section, change| {
            if let DataChange::InTrash(in_trash) = change {
                section.set_enabled(!in_trash);
            }
            true
        })
        .with_button(SectionButton::new("clear", move |section, _event| {
            if let Some(item) = section.get_data().item {
                clear_store.clear(item);
            }
        }))
    }
}

#[async_trait]
impl Contributor for ReadingNotesPlugin {
    fn id(&self) -> ContributorId {
        Self::ID.into()
    }

    async fn startup(&self, registries: &Registries) -> Result<(), RegistryError> {
        let getter = self.store.clone();
        let setter = self.store.clone();
        registries
            .item_box()
            .register_row(
                RowOptions::new("readingNote", "Reading note", Self::ID)
                    .editable()
                    .with_data_provider(move |item, _key| getter.get(item.id()).unwrap_or_default())
                    .with_data_setter(move |item, _key, value| setter.set(item.id(), value)),
            )
            .await?;
        registries.item_pane().register_section(self.section()).await?;
        Ok(())
    }

    async fn shutdown(&self, _registries: &Registries) {
        tracing::info!(plugin = Self::ID, "reading notes kept in memory only");
    }
}
