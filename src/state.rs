//! Application state management

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::store::ProjectStore;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Supported image extensions
/// Formats a webview can render in the slideshow
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "gif", "bmp", "avif",
];

/// Format produced by a datetime-local input
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";
const TIMESTAMP_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a display window bound. Seconds are optional.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT_SECONDS))
        .ok()
}

/// Metadata for one image in the project folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub name: String,
    #[serde(default = "default_always_show")]
    pub always_show: bool,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

fn default_always_show() -> bool {
    true
}

impl ImageRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            always_show: true,
            start: None,
            end: None,
        }
    }

    /// Overwrite only the fields present in the patch
    pub fn apply(&mut self, patch: &RecordPatch) {
        if let Some(always_show) = patch.always_show {
            self.always_show = always_show;
        }
        if let Some(start) = &patch.start {
            self.start = start.clone();
        }
        if let Some(end) = &patch.end {
            self.end = end.clone();
        }
    }

    /// Whether the slideshow should show this image at `at`.
    ///
    /// `alwaysShow` wins. Otherwise the image needs at least one window bound,
    /// and a missing bound is open on that side. Unparseable bounds hide it.
    pub fn is_visible_at(&self, at: NaiveDateTime) -> bool {
        if self.always_show {
            return true;
        }
        if self.start.is_none() && self.end.is_none() {
            return false;
        }

        let after_start = match self.start.as_deref() {
            Some(start) => match parse_timestamp(start) {
                Some(start) => at >= start,
                None => return false,
            },
            None => true,
        };
        let before_end = match self.end.as_deref() {
            Some(end) => match parse_timestamp(end) {
                Some(end) => at <= end,
                None => return false,
            },
            None => true,
        };

        after_start && before_end
    }
}

/// Partial update for a record. `None` leaves a field untouched;
/// `Some(None)` clears a window bound.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_show: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub start: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some", skip_serializing_if = "Option::is_none")]
    pub end: Option<Option<String>>,
}

// Distinguishes an explicit `null` from an absent key
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.always_show.is_none() && self.start.is_none() && self.end.is_none()
    }

    /// Check window bounds and turn cleared inputs ("") into `null`
    pub fn normalized(&self) -> StoreResult<RecordPatch> {
        Ok(RecordPatch {
            always_show: self.always_show,
            start: self.start.as_ref().map(normalize_bound).transpose()?,
            end: self.end.as_ref().map(normalize_bound).transpose()?,
        })
    }
}

fn normalize_bound(bound: &Option<String>) -> StoreResult<Option<String>> {
    match bound.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => {
            if parse_timestamp(value).is_none() {
                return Err(StoreError::InvalidTimestamp(value.to_string()));
            }
            Ok(Some(value.to_string()))
        }
    }
}

/// Full application state (in-memory)
///
/// The project lock is held for the duration of every store call, which keeps
/// sidecar writes for the open project strictly sequential.
pub struct AppState {
    pub config: Mutex<Config>,
    pub project: Mutex<Option<ProjectStore>>,
    config_path: Option<PathBuf>,
}

impl AppState {
    pub fn new() -> Self {
        let config_path = Config::config_path();
        Self {
            config: Mutex::new(Config::load_from(&config_path)),
            project: Mutex::new(None),
            config_path: Some(config_path),
        }
    }

    /// State whose config lives only in memory
    pub fn ephemeral(config: Config) -> Self {
        Self {
            config: Mutex::new(config),
            project: Mutex::new(None),
            config_path: None,
        }
    }

    /// Switch to `folder`, reconcile it, and remember it as the last project
    pub fn open_project(&self, folder: &Path) -> StoreResult<Vec<ImageRecord>> {
        let store = ProjectStore::open(folder)?;
        let opened = store.folder().to_string_lossy().to_string();

        // Reconcile may rewrite the sidecar, so it runs under the project lock
        let records = {
            let mut project = lock(&self.project);
            let records = store.reconcile()?;
            *project = Some(store);
            records
        };
        log::info!("Opened project {} ({} images)", opened, records.len());

        let mut config = lock(&self.config);
        config.remember_project(&opened);
        if let Some(path) = &self.config_path {
            if let Err(e) = config.save_to(path) {
                log::warn!("Could not save config: {}", e);
            }
        }

        Ok(records)
    }

    /// Make `store` the open project without reconciling it or touching the
    /// config. Used for one-off commands against a folder.
    pub fn set_project(&self, store: ProjectStore) {
        log::debug!("Using project {}", store.folder().display());
        *lock(&self.project) = Some(store);
    }

    pub fn current_folder(&self) -> Option<PathBuf> {
        lock(&self.project).as_ref().map(|store| store.folder().to_path_buf())
    }

    /// Recent project folders that still exist
    pub fn recent_projects(&self) -> Vec<String> {
        lock(&self.config).existing_recent_projects()
    }

    /// Run `op` against the open project
    pub fn with_project<T>(&self, op: impl FnOnce(&ProjectStore) -> StoreResult<T>) -> StoreResult<T> {
        let project = lock(&self.project);
        let store = project.as_ref().ok_or(StoreError::MissingProject)?;
        op(store)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
