//! Slideshow Curator - Image Slideshow Project Editor

#[cfg(feature = "desktop")]
pub mod commands;
pub mod config;
pub mod error;
pub mod image_manager;
pub mod state;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use state::{AppState, ImageRecord, RecordPatch};
pub use store::{DeleteOutcome, ProjectStore, SIDECAR_FILE};

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(AppState::new())
        .invoke_handler(tauri::generate_handler![
            // Project
            commands::open_project,
            commands::get_project,
            commands::get_recent_projects,
            // Images
            commands::load_images,
            commands::import_image,
            commands::update_image,
            commands::update_order,
            commands::delete_image,
            commands::get_untracked,
            // Viewer
            commands::get_image_info,
            commands::open_image,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
