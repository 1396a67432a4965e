use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info};

use crate::models::SaveData;
use crate::types::{AppState, OVERLAY_ASSETS_DIR, SAVE_FILE_EXTENSION};

// ── Paths ──────────────────────────────────────────────────────────────

pub fn remove_file_from_path(path: &Path) -> PathBuf {
    let mut path = path.to_path_buf();
    path.pop();
    path
}

/// Path of `path` relative to `base_path`, written with forward slashes and a
/// leading `/` (e.g. `/assets/logo.png`). `None` when `path` is outside the base.
pub fn to_relative_path(base_path: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(base_path)
        .ok()
        .map(|relative| Path::new(".").join(relative))
        .map(|joined| joined.to_string_lossy().replace('\\', "/"))
        .map(|joined| joined.trim_start_matches('.').to_string())
}

pub fn from_relative_path(base_path: &Path, path: &str) -> PathBuf {
    base_path.join(path.trim_start_matches('/'))
}

/// URL the overlay server exposes a relative asset path under. Only files
/// inside the assets directory are served.
pub fn asset_url(path: &str) -> Option<String> {
    let normalized = path.replace('\\', "/");
    let trimmed = normalized.trim_start_matches('.').trim_start_matches('/');
    let rest = trimmed.strip_prefix(OVERLAY_ASSETS_DIR)?.strip_prefix('/')?;
    if rest.is_empty() || rest.split('/').any(|part| part == "..") {
        return None;
    }
    Some(format!("/{OVERLAY_ASSETS_DIR}/{rest}"))
}

/// Appends the save file extension unless the path already carries it.
pub fn with_save_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case(SAVE_FILE_EXTENSION) => path.to_path_buf(),
        _ => path.with_extension(SAVE_FILE_EXTENSION),
    }
}

// ── Save files ─────────────────────────────────────────────────────────

pub fn load_save_file(path: &Path) -> Result<SaveData, String> {
    let data = fs::read_to_string(path).map_err(|e| format!("read save file {}: {e}", path.display()))?;
    let mut save =
        serde_json::from_str::<SaveData>(&data).map_err(|e| format!("parse save file {}: {e}", path.display()))?;
    save.correct_rounds_to_count();
    Ok(save)
}

pub fn write_save_file(path: &Path, save: &SaveData) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(save).map_err(|e| e.to_string())?;
    fs::write(path, payload).map_err(|e| format!("write save file {}: {e}", path.display()))
}

impl AppState {
    /// Replaces the current data with the save file at `path`. On failure the
    /// state is left as it was.
    pub fn load_from_filename(&mut self, path: &Path) -> bool {
        match load_save_file(path) {
            Ok(data) => {
                self.data = data;
                self.loaded_config = Some(path.to_path_buf());
                info!("Loaded save file {}", path.display());
                true
            }
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }

    pub fn save_to_filename(&mut self, path: &Path) -> bool {
        match write_save_file(path, &self.data) {
            Ok(()) => {
                self.loaded_config = Some(path.to_path_buf());
                info!("Saved save file {}", path.display());
                true
            }
            Err(e) => {
                error!("{e}");
                false
            }
        }
    }
}
