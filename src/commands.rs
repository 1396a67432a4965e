use serde::{Deserialize, Serialize};
use std::path::Path;
use tauri::{AppHandle, State};

use crate::config::overlay_addr;
use crate::dialog::{self, DialogChooser};
use crate::models::{Asset, Character, Division, Gamemode, Map, Match, Role, Settings, Team};
use crate::persistence;
use crate::reindex::ListEdit;
use crate::types::*;
use crate::webserver;

/// List edit as sent by the frontend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ListEditRequest {
    Remove { index: usize },
    Move { from: usize, to: usize },
    Insert { index: usize },
}

impl From<ListEditRequest> for ListEdit {
    fn from(request: ListEditRequest) -> Self {
        match request {
            ListEditRequest::Remove { index } => ListEdit::Removed(index),
            ListEditRequest::Move { from, to } => ListEdit::Moved { from, to },
            ListEditRequest::Insert { index } => ListEdit::Inserted(index),
        }
    }
}

// ── Save data accessors ────────────────────────────────────────────────

#[tauri::command]
pub fn get_settings(state: State<'_, SharedState>) -> Result<Settings, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.data.settings.clone())
}

#[tauri::command]
pub fn set_settings(settings: Settings, state: State<'_, SharedState>) -> Result<(), String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.settings = settings;
    Ok(())
}

#[tauri::command]
pub fn get_division(state: State<'_, SharedState>) -> Result<Division, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.data.division.clone())
}

#[tauri::command]
pub fn set_division(division: Division, state: State<'_, SharedState>) -> Result<(), String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.division = division;
    Ok(())
}

#[tauri::command]
pub fn get_assets(state: State<'_, SharedState>) -> Result<Vec<Asset>, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.data.assets.clone())
}

#[tauri::command]
pub fn set_assets(assets: Vec<Asset>, state: State<'_, SharedState>) -> Result<(), String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.assets = assets;
    Ok(())
}

#[tauri::command]
pub fn get_current_match(state: State<'_, SharedState>) -> Result<Match, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.data.current_match.clone())
}

#[tauri::command]
pub fn set_current_match(current_match: Match, state: State<'_, SharedState>) -> Result<(), String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.current_match = current_match;
    Ok(())
}

#[tauri::command]
pub fn correct_rounds_to_count(state: State<'_, SharedState>) -> Result<Match, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.correct_to_counts();
    Ok(guard.data.current_match.clone())
}

#[tauri::command]
pub fn correct_bracket_to_count(state: State<'_, SharedState>) -> Result<Division, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.correct_bracket_to_count();
    Ok(guard.data.division.clone())
}

// ── Save files and paths ───────────────────────────────────────────────

#[tauri::command]
pub fn get_loaded_config(state: State<'_, SharedState>) -> Result<Option<String>, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard
        .loaded_config
        .as_ref()
        .map(|path| path.to_string_lossy().to_string()))
}

#[tauri::command]
pub fn load_from_filename(filename: String, state: State<'_, SharedState>) -> Result<bool, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.load_from_filename(Path::new(&filename)))
}

#[tauri::command]
pub fn save_to_filename(filename: String, state: State<'_, SharedState>) -> Result<bool, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.save_to_filename(Path::new(&filename)))
}

#[tauri::command]
pub fn to_relative_path(path: String, state: State<'_, SharedState>) -> Result<Option<String>, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard
        .base_path()
        .and_then(|base| persistence::to_relative_path(&base, Path::new(&path))))
}

#[tauri::command]
pub fn from_relative_path(path: String, state: State<'_, SharedState>) -> Result<Option<String>, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard
        .base_path()
        .map(|base| persistence::from_relative_path(&base, &path).to_string_lossy().to_string()))
}

#[tauri::command]
pub fn asset_url(path: String) -> Option<String> {
    persistence::asset_url(&path)
}

// ── Dialogs ────────────────────────────────────────────────────────────

#[tauri::command]
pub async fn open_save_file_dialog(app: AppHandle, state: State<'_, SharedState>) -> Result<bool, String> {
    dialog::open_save_file(&DialogChooser::new(app), state.inner())
}

#[tauri::command]
pub async fn save_save_file_dialog(app: AppHandle, state: State<'_, SharedState>) -> Result<bool, String> {
    dialog::save_save_file_as(&DialogChooser::new(app), state.inner())
}

#[tauri::command]
pub async fn pick_image_dialog(app: AppHandle, state: State<'_, SharedState>) -> Result<Option<String>, String> {
    dialog::pick_image(&DialogChooser::new(app), state.inner())
}

// ── Overlay server ─────────────────────────────────────────────────────

#[tauri::command]
pub async fn start_webserver(state: State<'_, SharedState>) -> Result<bool, String> {
    match webserver::start_webserver(state.inner(), &overlay_addr()).await {
        Ok(server) => {
            tauri::async_runtime::spawn(server);
            Ok(true)
        }
        Err(e) => {
            tracing::warn!("Not starting overlay server: {e}");
            Ok(false)
        }
    }
}

#[tauri::command]
pub fn stop_webserver(state: State<'_, SharedState>) -> bool {
    webserver::stop_webserver(state.inner())
}

// ── List edits ─────────────────────────────────────────────────────────

#[tauri::command]
pub fn edit_teams(edit: ListEditRequest, team: Option<Team>, state: State<'_, SharedState>) -> Result<Division, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.edit_teams(edit.into(), team)?;
    Ok(guard.data.division.clone())
}

#[tauri::command]
pub fn edit_gamemodes(
    edit: ListEditRequest,
    gamemode: Option<Gamemode>,
    state: State<'_, SharedState>,
) -> Result<Settings, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.edit_gamemodes(edit.into(), gamemode)?;
    Ok(guard.data.settings.clone())
}

#[tauri::command]
pub fn edit_maps(
    gamemode: usize,
    edit: ListEditRequest,
    map: Option<Map>,
    state: State<'_, SharedState>,
) -> Result<Settings, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.edit_maps(gamemode, edit.into(), map)?;
    Ok(guard.data.settings.clone())
}

#[tauri::command]
pub fn edit_roles(edit: ListEditRequest, role: Option<Role>, state: State<'_, SharedState>) -> Result<Settings, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.edit_roles(edit.into(), role)?;
    Ok(guard.data.settings.clone())
}

#[tauri::command]
pub fn edit_characters(
    edit: ListEditRequest,
    character: Option<Character>,
    state: State<'_, SharedState>,
) -> Result<Settings, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.edit_characters(edit.into(), character)?;
    Ok(guard.data.settings.clone())
}

// ── Bracket ────────────────────────────────────────────────────────────

#[tauri::command]
pub fn seed_bracket(state: State<'_, SharedState>) -> Result<Division, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.seed_bracket();
    Ok(guard.data.division.clone())
}

#[tauri::command]
pub fn set_matchup_scores(
    round: usize,
    slot: usize,
    team1_score: usize,
    team2_score: usize,
    state: State<'_, SharedState>,
) -> Result<Division, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.division.set_scores(round, slot, team1_score, team2_score)?;
    Ok(guard.data.division.clone())
}

#[tauri::command]
pub fn record_result(
    round: usize,
    slot: usize,
    team1_score: usize,
    team2_score: usize,
    state: State<'_, SharedState>,
) -> Result<Division, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.division.record_result(round, slot, team1_score, team2_score)?;
    Ok(guard.data.division.clone())
}

#[tauri::command]
pub fn set_winner(
    round: usize,
    slot: usize,
    winner: Option<usize>,
    state: State<'_, SharedState>,
) -> Result<Division, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.division.set_winner(round, slot, winner)?;
    Ok(guard.data.division.clone())
}

#[tauri::command]
pub fn advance_byes(state: State<'_, SharedState>) -> Result<Division, String> {
    let mut guard = state.lock().map_err(|e| e.to_string())?;
    guard.data.division.advance_byes();
    Ok(guard.data.division.clone())
}

#[tauri::command]
pub fn get_bracket_visibilities(state: State<'_, SharedState>) -> Result<Vec<Vec<bool>>, String> {
    let guard = state.lock().map_err(|e| e.to_string())?;
    Ok(guard.data.bracket_visibilities())
}
