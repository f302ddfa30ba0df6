//! Tauri commands - Functions callable from JavaScript

use crate::error::StoreError;
use crate::image_manager::{image_info, ImageInfo};
use crate::state::{AppState, ImageRecord, RecordPatch};
use crate::store::DeleteOutcome;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tauri::{AppHandle, Emitter, State, Url, WebviewUrl, WebviewWindowBuilder};

/// Event sent to the main window after an image is deleted
pub const IMAGE_REMOVED_EVENT: &str = "image-removed";

static VIEWER_COUNT: AtomicUsize = AtomicUsize::new(0);

fn report(err: StoreError) -> String {
    log::error!("{}", err);
    err.to_string()
}

// ============================================================================
// Project commands
// ============================================================================

#[tauri::command]
pub fn open_project(path: String, state: State<AppState>) -> Result<Vec<ImageRecord>, String> {
    state.open_project(Path::new(&path)).map_err(report)
}

#[tauri::command]
pub fn get_project(state: State<AppState>) -> Option<String> {
    state
        .current_folder()
        .map(|folder| folder.to_string_lossy().to_string())
}

#[tauri::command]
pub fn get_recent_projects(state: State<AppState>) -> Vec<String> {
    state.recent_projects()
}

// ============================================================================
// Image list commands
// ============================================================================

#[tauri::command]
pub fn load_images(state: State<AppState>) -> Result<Vec<ImageRecord>, String> {
    state.with_project(|store| store.reconcile()).map_err(report)
}

#[tauri::command]
pub fn import_image(path: String, state: State<AppState>) -> Result<String, String> {
    state
        .with_project(|store| store.import_file(Path::new(&path)))
        .map_err(report)
}

#[tauri::command]
pub fn update_image(name: String, patch: RecordPatch, state: State<AppState>) -> Result<(), String> {
    state
        .with_project(|store| store.upsert(&name, Some(&patch)))
        .map_err(report)
}

#[tauri::command]
pub fn update_order(order: Vec<String>, state: State<AppState>) -> Result<(), String> {
    state
        .with_project(|store| store.reorder(&order))
        .map(|_| ())
        .map_err(report)
}

#[tauri::command]
pub fn delete_image(name: String, app: AppHandle, state: State<AppState>) -> Result<DeleteOutcome, String> {
    let outcome = state
        .with_project(|store| store.delete_image(&name))
        .map_err(report)?;

    if outcome.file_deleted || outcome.record_removed {
        if let Err(e) = app.emit(IMAGE_REMOVED_EVENT, &outcome.name) {
            log::warn!("Could not notify UI about {}: {}", outcome.name, e);
        }
    }

    Ok(outcome)
}

#[tauri::command]
pub fn get_untracked(state: State<AppState>) -> Result<Vec<String>, String> {
    state.with_project(|store| store.untracked()).map_err(report)
}

// ============================================================================
// Viewer commands
// ============================================================================

#[tauri::command]
pub fn get_image_info(name: String, state: State<AppState>) -> Result<ImageInfo, String> {
    state
        .with_project(|store| image_info(store.folder(), &name))
        .map_err(report)
}

/// Open `name` in its own viewer window. Async so window creation does not
/// block the main thread.
#[tauri::command]
pub async fn open_image(name: String, app: AppHandle, state: State<'_, AppState>) -> Result<ImageInfo, String> {
    let info = state
        .with_project(|store| image_info(store.folder(), &name))
        .map_err(report)?;

    let mut url = Url::parse("app://localhost/viewer.html").map_err(|e| e.to_string())?;
    url.query_pairs_mut().append_pair("name", &info.name);
    let page = format!("viewer.html?{}", url.query().unwrap_or_default());

    let label = format!("viewer-{}", VIEWER_COUNT.fetch_add(1, Ordering::Relaxed));
    WebviewWindowBuilder::new(&app, label, WebviewUrl::App(page.into()))
        .title(info.name.as_str())
        .inner_size(800.0, 600.0)
        .build()
        .map_err(|e| e.to_string())?;

    Ok(info)
}
