//! Demo contributors for a Trellis host.
//!
//! Two plugins contribute to the item detail views:
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────────────┐
//! │ WordCountPlugin          │      │ ReadingNotesPlugin               │
//! │  row    wordCount        │      │  row     readingNote (editable)  │
//! │  column wordCount        │      │  section reading-notes (async)   │
//! └────────────┬─────────────┘      └────────────────┬─────────────────┘
//!              └──────────────┐   ┌──────────────────┘
//!                             ▼   ▼
//!                      Registries (one lifecycle)
//! ```

mod paper;
mod plugins;
mod view;

pub use paper::Paper;
pub use plugins::{NoteStore, ReadingNotesPlugin, WordCountPlugin};
pub use view::RowListView;
