//! Settings and manifest loading.
//!
//! This module provides support for loading `settings.toml` files that tune
//! usage rendering and source lookup, and for loading the `manifest.json`
//! record that names and describes a program.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};
use crate::introspect::SourceTree;
use crate::usage::LINE_LENGTH;

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Usage banner configuration.
    pub usage: Option<UsageSettings>,

    /// Source lookup configuration.
    pub source: Option<SourceSettings>,
}

/// Settings for usage rendering.
#[derive(Debug, Default, Deserialize)]
pub struct UsageSettings {
    /// Column budget (default: 79).
    pub line_length: Option<usize>,
}

/// Settings for source-derived parameter names.
#[derive(Debug, Default, Deserialize)]
pub struct SourceSettings {
    /// Crate root to search for function definitions.
    /// Relative paths are resolved against the settings directory.
    pub root: Option<PathBuf>,
}

impl Settings {
    pub fn line_length(&self) -> usize {
        self.usage
            .as_ref()
            .and_then(|u| u.line_length)
            .unwrap_or(LINE_LENGTH)
    }

    /// The source tree to recover parameter names from.
    ///
    /// Falls back to `SourceTree::from_env` when no root is configured.
    pub fn source_tree(&self, settings_dir: &Path) -> SourceTree {
        match self.source.as_ref().and_then(|s| s.root.as_ref()) {
            Some(root) if root.is_absolute() => SourceTree::new(root),
            Some(root) => SourceTree::new(settings_dir.join(root)),
            None => SourceTree::from_env(),
        }
    }
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), "failed to parse settings.toml: {}", e);
                Settings::default()
            }
        },
        Err(_) => Settings::default(),
    }
}

/// Discover settings.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found settings.toml (used for resolving relative paths).
/// If not found, returns `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join("settings.toml");
        if candidate.is_file() {
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join("settings.toml");
                if candidate.is_file() {
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}

/// Name and description of a program, read from `manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    pub description: String,
    pub name: String,
}

impl Manifest {
    /// Load a manifest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| Error::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the `manifest.json` that sits next to `file`.
    pub fn beside(file: &Path) -> Result<Self> {
        let dir = file.parent().unwrap_or_else(|| Path::new("."));
        Self::load(&dir.join("manifest.json"))
    }
}
