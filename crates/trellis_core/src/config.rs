//! Host configuration.
//!
//! Loaded from JSON. Every field has a default, so `{}` is a valid
//! configuration.
//!
//! ```json
//! {
//!   "log": { "level": "debug", "format": "compact", "filter": "trellis=debug" },
//!   "reserved": { "rows": ["citationKey"], "panes": [], "columns": [] },
//!   "replacement": "_"
//! }
//! ```

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::HostError;
use crate::tracing_setup::TracingFormat;

/// Logging section of the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Maximum level: `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// Output format.
    pub format: TracingFormat,
    /// Target filter, e.g. `trellis_registry=debug,trellis_item_pane=warn`.
    pub filter: Option<String>,
    /// Emit span enter/exit events.
    pub span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: TracingFormat::default(),
            filter: None,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// Parses the configured level.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidLevel`] for an unknown level name.
    pub fn level(&self) -> Result<Level, HostError> {
        Level::from_str(&self.level).map_err(|_| HostError::InvalidLevel {
            level: self.level.clone(),
        })
    }
}

/// Extra reserved keys per registry kind, on top of the built-in ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservedKeys {
    /// Extra reserved row data keys.
    pub rows: Vec<String>,
    /// Extra reserved pane ids.
    pub panes: Vec<String>,
    /// Extra reserved column data keys.
    pub columns: Vec<String>,
}

/// Configuration of a Trellis host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Logging.
    pub log: LogConfig,
    /// Extra reserved keys.
    pub reserved: ReservedKeys,
    /// Replacement for characters not allowed in identifiers.
    pub replacement: Option<char>,
}

impl HostConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Config`] if the JSON is malformed and
    /// [`HostError::InvalidLevel`] if the log level is unknown.
    pub fn from_json_str(json: &str) -> Result<Self, HostError> {
        let config: Self = serde_json::from_str(json)?;
        config.log.level()?;
        Ok(config)
    }

    /// Sets the log level.
    #[must_use]
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log.level = level.as_str().to_lowercase();
        self
    }

    /// Sets the log format.
    #[must_use]
    pub fn with_log_format(mut self, format: TracingFormat) -> Self {
        self.log.format = format;
        self
    }

    /// Sets the log target filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log.filter = Some(filter.into());
        self
    }

    /// Adds reserved row data keys.
    #[must_use]
    pub fn with_reserved_rows<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.rows.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds reserved pane ids.
    #[must_use]
    pub fn with_reserved_panes<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.panes.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Adds reserved column data keys.
    #[must_use]
    pub fn with_reserved_columns<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.columns.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Sets the identifier replacement character.
    #[must_use]
    pub fn with_replacement(mut self, replacement: char) -> Self {
        self.replacement = Some(replacement);
        self
    }
}
