pub mod types;
pub mod config;
pub mod models;
pub mod reindex;
pub mod bracket;
pub mod layout;
pub mod persistence;
pub mod overlay;
pub mod webserver;
pub mod dialog;
#[cfg(feature = "desktop")]
pub mod commands;

use types::*;
use config::*;
use models::SaveData;

use std::{fs, path::Path};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Logs to a daily rolling `app.log` under `logs_dir`. Keep the guard alive
/// for as long as logs should be flushed.
pub fn init_tracing(logs_dir: &Path) -> WorkerGuard {
    fs::create_dir_all(logs_dir).ok();
    let file_appender = tracing_appender::rolling::daily(logs_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();
    guard
}

/// Empty state, or the `AUTOLOAD_SAVE` file when one is configured.
pub fn initial_state() -> SharedState {
    let shared = AppState::new_shared(SaveData::default());
    if let Some(path) = autoload_save_path() {
        let mut guard = shared.lock().unwrap_or_else(|e| e.into_inner());
        guard.load_from_filename(&path);
    }
    shared
}

// ── Entry point ────────────────────────────────────────────────────────

#[cfg(feature = "desktop")]
pub fn run() {
    load_env_file();
    let _guard = init_tracing(&logs_dir());
    tracing::info!("Bracket overlay starting");
    log_env_warnings();

    let state = initial_state();
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            commands::get_settings,
            commands::set_settings,
            commands::get_division,
            commands::set_division,
            commands::get_assets,
            commands::set_assets,
            commands::get_current_match,
            commands::set_current_match,
            commands::correct_rounds_to_count,
            commands::correct_bracket_to_count,
            commands::get_loaded_config,
            commands::load_from_filename,
            commands::save_to_filename,
            commands::to_relative_path,
            commands::from_relative_path,
            commands::asset_url,
            commands::open_save_file_dialog,
            commands::save_save_file_dialog,
            commands::pick_image_dialog,
            commands::start_webserver,
            commands::stop_webserver,
            commands::edit_teams,
            commands::edit_gamemodes,
            commands::edit_maps,
            commands::edit_roles,
            commands::edit_characters,
            commands::seed_bracket,
            commands::set_matchup_scores,
            commands::record_result,
            commands::set_winner,
            commands::advance_byes,
            commands::get_bracket_visibilities
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri app");
}
