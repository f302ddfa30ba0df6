//! Image management - name checks, importing, deleting, and folder scans

use crate::error::{StoreError, StoreResult};
use crate::state::SUPPORTED_EXTENSIONS;
use crate::store::SIDECAR_FILE;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Check the extension against the slideshow formats
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Reject anything that is not a plain file name inside the project folder
pub fn validate_name(name: &str) -> StoreResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name == SIDECAR_FILE;

    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Path of the backing file for `name`
pub fn image_path(folder: &Path, name: &str) -> StoreResult<PathBuf> {
    validate_name(name)?;
    Ok(folder.join(name))
}

/// Copy `source` into `folder` under its base name. Returns that name.
/// An existing file with the same name is overwritten.
pub fn copy_into_project(source: &Path, folder: &Path) -> StoreResult<String> {
    if !source.is_file() || !is_supported_image(source) {
        return Err(StoreError::UnsupportedFile(source.to_path_buf()));
    }

    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| StoreError::UnsupportedFile(source.to_path_buf()))?;
    let destination = image_path(folder, &name)?;

    if is_same_file(source, &destination) {
        log::debug!("{} already lives in the project folder", name);
        return Ok(name);
    }

    fs::copy(source, &destination).map_err(|e| StoreError::fs("copy", source, e))?;
    log::info!("Copied {} to {}", source.display(), destination.display());

    Ok(name)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Delete a backing file. `Ok(false)` when it was already gone.
pub fn delete_file(path: &Path) -> StoreResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(StoreError::fs("delete", path, e)),
    }
}

/// Names of supported images directly inside `folder`, sorted
pub fn scan_images(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_supported_image(e.path()))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();

    names.sort_by_key(|name| name.to_lowercase());
    names
}

/// What the viewer window needs to show one image
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub name: String,
    pub path: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

pub fn image_info(folder: &Path, name: &str) -> StoreResult<ImageInfo> {
    let path = image_path(folder, name)?;
    if !path.is_file() {
        return Err(StoreError::fs(
            "open",
            &path,
            io::Error::new(io::ErrorKind::NotFound, "image file is missing"),
        ));
    }

    let dimensions = match image::image_dimensions(&path) {
        Ok(dimensions) => Some(dimensions),
        Err(e) => {
            log::debug!("Could not read dimensions of {}: {}", path.display(), e);
            None
        }
    };

    Ok(ImageInfo {
        name: name.to_string(),
        path: path.to_string_lossy().to_string(),
        width: dimensions.map(|(w, _)| w),
        height: dimensions.map(|(_, h)| h),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("a.jpg")));
        assert!(is_supported_image(Path::new("B.JPEG")));
        assert!(is_supported_image(Path::new("/x/y/c.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("noext")));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("photo 1.jpg").is_ok());
        for bad in ["", ".", "..", "a/b.jpg", "a\\b.jpg", SIDECAR_FILE] {
            assert!(matches!(validate_name(bad), Err(StoreError::InvalidName(_))), "{bad}");
        }
    }

    #[test]
    fn test_copy_into_project() {
        let outside = tempdir().unwrap();
        let project = tempdir().unwrap();
        let source = outside.path().join("sunset.png");
        fs::write(&source, b"png bytes").unwrap();

        let name = copy_into_project(&source, project.path()).unwrap();
        assert_eq!(name, "sunset.png");
        assert_eq!(fs::read(project.path().join("sunset.png")).unwrap(), b"png bytes");
        assert!(source.exists());
    }

    #[test]
    fn test_copy_into_project_same_file_is_noop() {
        let project = tempdir().unwrap();
        let source = project.path().join("a.jpg");
        fs::write(&source, b"jpg").unwrap();

        assert_eq!(copy_into_project(&source, project.path()).unwrap(), "a.jpg");
        assert_eq!(fs::read(&source).unwrap(), b"jpg");
    }

    #[test]
    fn test_copy_into_project_rejects_non_images() {
        let outside = tempdir().unwrap();
        let project = tempdir().unwrap();
        let source = outside.path().join("readme.txt");
        fs::write(&source, b"text").unwrap();

        assert!(matches!(
            copy_into_project(&source, project.path()),
            Err(StoreError::UnsupportedFile(_))
        ));
        assert!(matches!(
            copy_into_project(&outside.path().join("missing.jpg"), project.path()),
            Err(StoreError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn test_delete_file_reports_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.jpg");
        fs::write(&path, b"x").unwrap();

        assert!(delete_file(&path).unwrap());
        assert!(!delete_file(&path).unwrap());
    }

    #[test]
    fn test_scan_images_skips_sidecar_and_subdirs() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(dir.path().join("A.jpg"), b"x").unwrap();
        fs::write(dir.path().join(SIDECAR_FILE), b"[]").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.jpg"), b"x").unwrap();

        assert_eq!(scan_images(dir.path()), vec!["A.jpg", "b.png"]);
    }

    #[test]
    fn test_image_info_without_decodable_image() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("fake.jpg"), b"not really a jpeg").unwrap();

        let info = image_info(dir.path(), "fake.jpg").unwrap();
        assert_eq!(info.name, "fake.jpg");
        assert_eq!(info.width, None);
        assert!(image_info(dir.path(), "missing.jpg").is_err());
    }
}
