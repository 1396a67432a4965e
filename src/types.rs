use serde::{Deserialize, Serialize};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::sync::oneshot;

use crate::models::SaveData;

// ── Constants ──────────────────────────────────────────────────────────

pub const DEFAULT_ROUND_COUNT: usize = 5;
pub const DEFAULT_BRACKET_STAGE_COUNT: usize = 3;
pub const DEFAULT_OVERLAY_ADDR: &str = "0.0.0.0:3000";
pub const OVERLAY_PAGES_DIR: &str = "overlay";
pub const OVERLAY_ASSETS_DIR: &str = "assets";
pub const SAVE_FILE_EXTENSION: &str = "json";

// ── Shared state type aliases ──────────────────────────────────────────

pub type SharedState = Arc<Mutex<AppState>>;

// ── App state ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AppState {
    /// Save file the current data was loaded from or last written to.
    pub loaded_config: Option<PathBuf>,
    pub webserver_stop_tx: Option<oneshot::Sender<()>>,
    pub data: SaveData,
}

impl AppState {
    pub fn new_shared(data: SaveData) -> SharedState {
        Arc::new(Mutex::new(AppState {
            data,
            ..AppState::default()
        }))
    }

    /// Directory holding the loaded save file; relative asset paths resolve against it.
    pub fn base_path(&self) -> Option<PathBuf> {
        self.loaded_config
            .as_deref()
            .map(crate::persistence::remove_file_from_path)
    }
}

// ── Dialog types ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn save_files() -> Self {
        FileFilter {
            name: "JSON".to_string(),
            extensions: vec![SAVE_FILE_EXTENSION.to_string()],
        }
    }

    pub fn images() -> Self {
        FileFilter {
            name: "Images".to_string(),
            extensions: ["png", "jpg", "jpeg", "gif", "svg", "webp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}
