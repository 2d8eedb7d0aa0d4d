//! Converter configuration.
//!
//! Settings are read from an optional TOML file:
//!
//! ```toml
//! root_dir = "data_UD"
//! ud_table = "ud_pos.txt"
//! exclude = ["data_UD/am/draft"]
//! unresolved = "skip"
//! verbose = false
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ConvertError, ConvertResult};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "brat-conllu.toml";

/// What to do with a `T` record whose span matches no token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Drop the record with a warning, and skip attributes and relations
    /// that reference it.
    #[default]
    Skip,
    /// Fail the whole document.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory searched recursively for `.txt` files.
    pub root_dir: PathBuf,
    /// POS to UD tag table.
    pub ud_table: PathBuf,
    /// Documents to leave out, by file stem or by path without extension.
    pub exclude: Vec<String>,
    pub unresolved: UnresolvedPolicy,
    /// Echo every converted document to stdout.
    pub verbose: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data_UD"),
            ud_table: PathBuf::from("ud_pos.txt"),
            exclude: Vec::new(),
            unresolved: UnresolvedPolicy::default(),
            verbose: false,
        }
    }
}

impl ConvertConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> ConvertResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConvertError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConvertError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Whether the document at `text_path` is on the exclusion list.
    pub fn is_excluded(&self, text_path: &Path) -> bool {
        let stem = text_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned());
        let bare = text_path.with_extension("").to_string_lossy().into_owned();

        self.exclude.iter().any(|entry| {
            let entry = entry.trim_start_matches("./");
            stem.as_deref() == Some(entry) || bare.trim_start_matches("./") == entry
        })
    }
}
