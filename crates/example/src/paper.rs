use hashbrown::HashMap;
use trellis_registry::{Item, ItemId};

/// A library item with a handful of built-in fields.
#[derive(Debug, Clone)]
pub struct Paper {
    id: ItemId,
    fields: HashMap<String, String>,
}

impl Paper {
    /// Creates an item with no fields.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id: ItemId(id),
            fields: HashMap::new(),
        }
    }

    /// Sets a built-in field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

impl Item for Paper {
    fn id(&self) -> ItemId {
        self.id
    }

    fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }
}
