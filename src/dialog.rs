use std::path::{Path, PathBuf};
use tracing::info;

use crate::persistence::{to_relative_path, with_save_extension};
use crate::types::{FileFilter, SharedState};

/// Native open/save pickers. `None` means the user cancelled.
pub trait FileChooser {
    fn open(&self, filters: &[FileFilter], default: Option<&Path>) -> Option<PathBuf>;
    fn save(&self, filters: &[FileFilter], default: Option<&Path>) -> Option<PathBuf>;
}

/// Asks for a save file and loads it.
pub fn open_save_file<C: FileChooser + ?Sized>(chooser: &C, state: &SharedState) -> Result<bool, String> {
    let default = state.lock().map_err(|e| e.to_string())?.base_path();
    let Some(path) = chooser.open(&[FileFilter::save_files()], default.as_deref()) else {
        return Ok(false);
    };
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.load_from_filename(&path))
}

/// Asks where to write the current data, defaulting to the loaded file.
pub fn save_save_file_as<C: FileChooser + ?Sized>(chooser: &C, state: &SharedState) -> Result<bool, String> {
    let default = state.lock().map_err(|e| e.to_string())?.loaded_config.clone();
    let Some(path) = chooser.save(&[FileFilter::save_files()], default.as_deref()) else {
        return Ok(false);
    };
    let path = with_save_extension(&path);
    info!("Saving as {}", path.display());
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.save_to_filename(&path))
}

/// Asks for an image inside the save file's directory and returns its
/// relative path.
pub fn pick_image<C: FileChooser + ?Sized>(chooser: &C, state: &SharedState) -> Result<Option<String>, String> {
    let base_path = state
        .lock()
        .map_err(|e| e.to_string())?
        .base_path()
        .ok_or_else(|| "Save the event before adding images.".to_string())?;
    let Some(path) = chooser.open(&[FileFilter::images()], Some(&base_path)) else {
        return Ok(None);
    };
    to_relative_path(&base_path, &path)
        .map(Some)
        .ok_or_else(|| format!("{} is outside {}", path.display(), base_path.display()))
}

#[cfg(feature = "desktop")]
pub use desktop::DialogChooser;

#[cfg(feature = "desktop")]
mod desktop {
    use super::*;
    use tauri::{AppHandle, Runtime};
    use tauri_plugin_dialog::{DialogExt, FileDialogBuilder};

    pub struct DialogChooser<R: Runtime> {
        app: AppHandle<R>,
    }

    impl<R: Runtime> DialogChooser<R> {
        pub fn new(app: AppHandle<R>) -> Self {
            Self { app }
        }

        fn builder(&self, filters: &[FileFilter], default: Option<&Path>) -> FileDialogBuilder<R> {
            let mut builder = self.app.dialog().file();
            for filter in filters {
                let extensions: Vec<&str> = filter.extensions.iter().map(String::as_str).collect();
                builder = builder.add_filter(filter.name.clone(), &extensions);
            }
            match default {
                Some(path) if path.is_dir() => builder.set_directory(path),
                Some(path) => {
                    if let Some(dir) = path.parent() {
                        builder = builder.set_directory(dir);
                    }
                    match path.file_name() {
                        Some(name) => builder.set_file_name(name.to_string_lossy()),
                        None => builder,
                    }
                }
                None => builder,
            }
        }
    }

    impl<R: Runtime> FileChooser for DialogChooser<R> {
        fn open(&self, filters: &[FileFilter], default: Option<&Path>) -> Option<PathBuf> {
            self.builder(filters, default)
                .blocking_pick_file()
                .and_then(|file| file.into_path().ok())
        }

        fn save(&self, filters: &[FileFilter], default: Option<&Path>) -> Option<PathBuf> {
            self.builder(filters, default)
                .blocking_save_file()
                .and_then(|file| file.into_path().ok())
        }
    }
}
