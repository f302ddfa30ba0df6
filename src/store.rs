//! Project metadata store - the `images.json` sidecar next to the images
//!
//! The sidecar is a JSON array of [`ImageRecord`]s in slideshow order. Every
//! mutation rereads it, edits the array, and rewrites the whole file; at a few
//! hundred records there is nothing to gain from anything finer grained.

use crate::error::{StoreError, StoreResult};
use crate::image_manager::{copy_into_project, delete_file, image_path, scan_images, validate_name};
use crate::state::{ImageRecord, RecordPatch};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sidecar file name inside every project folder
pub const SIDECAR_FILE: &str = "images.json";

/// Result of a combined file + record delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub name: String,
    /// False when the backing file was already gone
    pub file_deleted: bool,
    /// False when there was no record to remove
    pub record_removed: bool,
}

/// Handle on one project folder and its sidecar
#[derive(Debug, Clone)]
pub struct ProjectStore {
    folder: PathBuf,
    sidecar: PathBuf,
}

impl ProjectStore {
    /// Open `folder` as a project. Nothing is written until the first mutation.
    pub fn open(folder: impl AsRef<Path>) -> StoreResult<Self> {
        let folder = folder.as_ref();
        if !folder.is_dir() {
            return Err(StoreError::NotADirectory(folder.to_path_buf()));
        }
        let folder = fs::canonicalize(folder).map_err(|e| StoreError::fs("resolve", folder, e))?;
        let sidecar = folder.join(SIDECAR_FILE);

        Ok(Self { folder, sidecar })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn sidecar_path(&self) -> &Path {
        &self.sidecar
    }

    /// Read the records as stored, without checking the folder.
    /// A missing sidecar is an empty project.
    pub fn load(&self) -> StoreResult<Vec<ImageRecord>> {
        Ok(self.read()?.map(dedupe).unwrap_or_default())
    }

    // Raw array from disk, duplicates included. `None` when there is no sidecar.
    fn read(&self) -> StoreResult<Option<Vec<ImageRecord>>> {
        let contents = match fs::read_to_string(&self.sidecar) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::fs("read", &self.sidecar, e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| StoreError::MalformedMetadata {
                path: self.sidecar.clone(),
                source,
            })
    }

    /// Overwrite the sidecar with `records`
    pub fn save(&self, records: &[ImageRecord]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::fs("serialize", &self.sidecar, io::Error::other(e)))?;
        fs::write(&self.sidecar, json).map_err(|e| StoreError::fs("write", &self.sidecar, e))?;

        log::debug!("Wrote {} records to {}", records.len(), self.sidecar.display());
        Ok(())
    }

    /// Insert `name` with defaults, or merge `patch` into its existing record.
    ///
    /// A new record always starts from the defaults. An existing record with no
    /// patch is left alone and the sidecar is not rewritten. The patch is only
    /// validated when it is merged, so a patch sent with a new name is ignored
    /// even when its timestamps are invalid.
    pub fn upsert(&self, name: &str, patch: Option<&RecordPatch>) -> StoreResult<()> {
        validate_name(name)?;
        let mut records = self.load()?;

        match records.iter_mut().find(|r| r.name == name) {
            Some(record) => match patch {
                Some(patch) if !patch.is_empty() => record.apply(&patch.normalized()?),
                _ => return Ok(()),
            },
            None => {
                log::info!("Adding {} to {}", name, self.sidecar.display());
                records.push(ImageRecord::new(name));
            }
        }

        self.save(&records)
    }

    /// Drop records whose file is gone and return what is left, in order.
    ///
    /// This is the load path for the UI. The sidecar is only rewritten when
    /// something was dropped, and never created.
    pub fn reconcile(&self) -> StoreResult<Vec<ImageRecord>> {
        let Some(records) = self.read()? else {
            return Ok(Vec::new());
        };

        let raw = records.len();
        let records = dedupe(records);
        let kept: Vec<ImageRecord> = records
            .into_iter()
            .filter(|record| {
                let present = image_path(&self.folder, &record.name)
                    .map(|path| path.is_file())
                    .unwrap_or(false);
                if !present {
                    log::info!("File {} does not exist, removing its record", record.name);
                }
                present
            })
            .collect();

        if kept.len() != raw {
            self.save(&kept)?;
        }

        Ok(kept)
    }

    /// Remove the record for `name`. Returns whether one existed.
    pub fn remove(&self, name: &str) -> StoreResult<bool> {
        let Some(records) = self.read()? else {
            return Ok(false);
        };

        let mut records = dedupe(records);
        let before = records.len();
        records.retain(|r| r.name != name);

        if records.len() == before {
            return Ok(false);
        }

        self.save(&records)?;
        Ok(true)
    }

    /// Sort records by their position in `order`.
    ///
    /// Records missing from `order` keep their relative order after all the
    /// listed ones. Names in `order` without a record are ignored.
    pub fn reorder(&self, order: &[String]) -> StoreResult<Vec<ImageRecord>> {
        let Some(records) = self.read()? else {
            return Ok(Vec::new());
        };

        let mut records = dedupe(records);
        sort_by_order(&mut records, order);
        self.save(&records)?;

        Ok(records)
    }

    /// Delete the backing file, then its record.
    ///
    /// A failed file delete leaves the record in place. A failed record removal
    /// after the file is gone is reported as [`StoreError::PartialDeleteFailure`].
    pub fn delete_image(&self, name: &str) -> StoreResult<DeleteOutcome> {
        let path = image_path(&self.folder, name)?;

        let file_deleted = delete_file(&path).map_err(|e| {
            log::error!("Could not delete {}: {}", path.display(), e);
            e
        })?;

        match self.remove(name) {
            Ok(record_removed) => {
                log::info!("Deleted {} (file: {}, record: {})", name, file_deleted, record_removed);
                Ok(DeleteOutcome {
                    name: name.to_string(),
                    file_deleted,
                    record_removed,
                })
            }
            Err(source) if file_deleted => {
                log::error!("Deleted {} but could not remove its record: {}", name, source);
                Err(StoreError::PartialDeleteFailure {
                    name: name.to_string(),
                    source: Box::new(source),
                })
            }
            Err(source) => Err(source),
        }
    }

    /// Copy a dropped file into the project and register it
    pub fn import_file(&self, source: &Path) -> StoreResult<String> {
        let name = copy_into_project(source, &self.folder)?;
        self.upsert(&name, None)?;
        Ok(name)
    }

    /// Images in the folder that have no record yet
    pub fn untracked(&self) -> StoreResult<Vec<String>> {
        let records = self.load()?;
        let known: HashSet<&str> = records.iter().map(|r| r.name.as_str()).collect();

        Ok(scan_images(&self.folder)
            .into_iter()
            .filter(|name| !known.contains(name.as_str()))
            .collect())
    }

    /// Reconciled records the slideshow shows at `at`, in order
    pub fn visible_at(&self, at: NaiveDateTime) -> StoreResult<Vec<ImageRecord>> {
        Ok(self
            .reconcile()?
            .into_iter()
            .filter(|r| r.is_visible_at(at))
            .collect())
    }
}

/// Keep the first record for each name
fn dedupe(records: Vec<ImageRecord>) -> Vec<ImageRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| {
            let first = seen.insert(r.name.clone());
            if !first {
                log::warn!("Dropping duplicate record for {}", r.name);
            }
            first
        })
        .collect()
}

fn sort_by_order(records: &mut [ImageRecord], order: &[String]) {
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    for (i, name) in order.iter().enumerate() {
        position.entry(name.as_str()).or_insert(i);
    }

    // Stable, so unlisted records stay in their current order at the end
    records.sort_by_key(|r| position.get(r.name.as_str()).copied().unwrap_or(usize::MAX));
}
