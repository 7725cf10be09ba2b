//! Database settings.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

fn default_busy_timeout_ms() -> u64 {
    1000
}

/// Where the database lives and how to open it.
///
/// Can be deserialized from JSON, e.g. `{"path": "slides.sqlite"}`.  A missing path means an in-memory database.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DbSettings {
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DbSettings {
    fn default() -> Self {
        DbSettings {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DbSettings {
    pub fn in_memory() -> DbSettings {
        Default::default()
    }

    pub fn at_path(path: impl Into<PathBuf>) -> DbSettings {
        DbSettings {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<DbSettings> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read settings from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Could not parse settings in {}", path.display()))
    }
}
