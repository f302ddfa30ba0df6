//! Configuration management - handles user settings and persistence

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// How many project folders the recent list keeps
pub const MAX_RECENT_PROJECTS: usize = 10;

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub last_project: Option<String>,
    pub recent_projects: Vec<String>,
}

impl Config {
    /// Get the config directory path (OS-specific)
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("slideshow-curator")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    /// Load config from the default location, or return default
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, or return default
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                log::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> StoreResult<()> {
        self.save_to(&Self::config_path())
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> StoreResult<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::fs("create", parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| StoreError::fs("serialize", path, io::Error::other(e)))?;
        fs::write(path, json).map_err(|e| StoreError::fs("write", path, e))?;

        Ok(())
    }

    /// Move `folder` to the front of the recent list and make it the last project
    pub fn remember_project(&mut self, folder: &str) {
        self.recent_projects.retain(|f| f != folder);
        self.recent_projects.insert(0, folder.to_string());
        self.recent_projects.truncate(MAX_RECENT_PROJECTS);
        self.last_project = Some(folder.to_string());
    }

    /// Recent folders that still exist on disk
    pub fn existing_recent_projects(&self) -> Vec<String> {
        self.recent_projects
            .iter()
            .filter(|f| Path::new(f).is_dir())
            .cloned()
            .collect()
    }
}
