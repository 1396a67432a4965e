use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Character, Gamemode, Matchup, Role, SaveData, Team};
use crate::persistence::asset_url;

// ── Overlay payload types ──────────────────────────────────────────────

/// What overlay pages poll from `/state.json`. Every index in the save data is
/// resolved here; a reference to a missing element comes out as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    pub event_name: String,
    pub team_count: usize,
    pub teams: Vec<TeamState>,
    pub team1: Option<TeamState>,
    pub team2: Option<TeamState>,
    pub team1_score: usize,
    pub team2_score: usize,
    pub swap_scoreboard: bool,
    pub bracket_stage_count: usize,
    pub bracket: Vec<Vec<Option<MatchupState>>>,
    pub rounds: Vec<RoundState>,
    pub gamemodes: Vec<Gamemode>,
    pub roles: Vec<Role>,
    pub characters: Vec<Character>,
    /// Asset name to the URL it is served under (or its stored path when it
    /// lies outside the assets directory).
    pub assets: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamState {
    pub index: usize,
    pub name: String,
    pub icon: Option<String>,
    pub players: Vec<PlayerState>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub name: String,
    pub role: Option<Role>,
    pub character: Option<Character>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchupState {
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub team1_score: usize,
    pub team2_score: usize,
    pub winner: Option<String>,
    /// Both teams known.
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub gamemode: Option<String>,
    pub gamemode_icon: Option<String>,
    pub map: Option<String>,
    pub map_image: Option<String>,
    pub team1_score: usize,
    pub team2_score: usize,
    pub completed: bool,
}

// ── Builders ───────────────────────────────────────────────────────────

pub fn build_overlay_state(data: &SaveData) -> OverlayState {
    let current = &data.current_match;
    let teams: Vec<TeamState> = data
        .division
        .teams
        .iter()
        .enumerate()
        .map(|(index, team)| team_state(data, index, team))
        .collect();

    OverlayState {
        event_name: data.settings.event_name.clone(),
        team_count: teams.len(),
        team1: resolve_team(data, current.team1),
        team2: resolve_team(data, current.team2),
        teams,
        team1_score: current.team1_score(),
        team2_score: current.team2_score(),
        swap_scoreboard: current.swap_scoreboard,
        bracket_stage_count: data.settings.bracket_stage_count,
        bracket: data
            .division
            .bracket
            .iter()
            .map(|stage| {
                stage
                    .iter()
                    .map(|cell| cell.as_ref().map(|matchup| matchup_state(data, matchup)))
                    .collect()
            })
            .collect(),
        rounds: current
            .rounds
            .iter()
            .map(|round| {
                let gamemode = round.gamemode.and_then(|index| data.settings.gamemodes.get(index));
                let map = gamemode.and_then(|mode| round.map.and_then(|index| mode.maps.get(index)));
                RoundState {
                    gamemode: gamemode.map(|mode| mode.name.clone()),
                    gamemode_icon: gamemode.and_then(|mode| mode.icon.clone()),
                    map: map.map(|map| map.name.clone()),
                    map_image: map.and_then(|map| map.image.clone()),
                    team1_score: round.team1_score,
                    team2_score: round.team2_score,
                    completed: round.completed,
                }
            })
            .collect(),
        gamemodes: data.settings.gamemodes.clone(),
        roles: data.settings.roles.clone(),
        characters: data.settings.characters.clone(),
        assets: data
            .assets_map()
            .into_iter()
            .map(|(name, path)| {
                let url = asset_url(&path).unwrap_or(path);
                (name, url)
            })
            .collect(),
    }
}

/// Team 1 or 2 of the current match.
pub fn current_team(data: &SaveData, number: usize) -> Option<TeamState> {
    let index = match number {
        1 => data.current_match.team1,
        2 => data.current_match.team2,
        _ => None,
    };
    resolve_team(data, index)
}

fn resolve_team(data: &SaveData, index: Option<usize>) -> Option<TeamState> {
    let index = index?;
    data.division
        .teams
        .get(index)
        .map(|team| team_state(data, index, team))
}

fn team_state(data: &SaveData, index: usize, team: &Team) -> TeamState {
    TeamState {
        index,
        name: team.name.clone(),
        icon: team.icon.clone(),
        players: team
            .players
            .iter()
            .map(|player| PlayerState {
                name: player.name.clone(),
                role: player.role.and_then(|i| data.settings.roles.get(i)).cloned(),
                character: player.character.and_then(|i| data.settings.characters.get(i)).cloned(),
            })
            .collect(),
    }
}

fn team_name(data: &SaveData, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| data.division.teams.get(i))
        .map(|team| team.name.clone())
}

fn matchup_state(data: &SaveData, matchup: &Matchup) -> MatchupState {
    MatchupState {
        team1: team_name(data, matchup.team1),
        team2: team_name(data, matchup.team2),
        team1_score: matchup.team1_score,
        team2_score: matchup.team2_score,
        winner: team_name(data, matchup.winner),
        visible: matchup.is_filled(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Asset, Map, Player, Round};

    fn sample() -> SaveData {
        let mut data = SaveData::default();
        data.settings.event_name = "Spring Cup".to_string();
        data.settings.roles = vec![Role::new("Tank", None)];
        data.settings.characters = vec![Character::new("Knight", Some("/assets/knight.png".to_string()))];
        data.settings.gamemodes = vec![Gamemode::new(
            "Control",
            Some("/assets/control.png".to_string()),
            vec![Map::new("Harbor", None)],
        )];
        data.division.teams = vec![
            Team::new("Red", None, vec![Player::new("ana", Some(0), Some(0))]),
            Team::new("Blue", None, vec![Player::new("bo", None, Some(7))]),
            Team::new("Green", None, Vec::new()),
        ];
        data.correct_bracket_to_count();
        data.division.seed_bracket();
        data.current_match.team1 = Some(0);
        data.current_match.team2 = Some(1);
        data.current_match.rounds = vec![
            Round { gamemode: Some(0), map: Some(0), team1_score: 2, team2_score: 1, completed: true },
            Round::default(),
        ];
        data.assets = vec![
            Asset::new("logo", "/assets/logo.png"),
            Asset::new("notes", "/notes.txt"),
        ];
        data
    }

    #[test]
    fn resolves_current_match_teams_and_scores() {
        let state = build_overlay_state(&sample());
        assert_eq!(state.event_name, "Spring Cup");
        assert_eq!(state.team_count, 3);
        assert_eq!(state.team1.as_ref().map(|t| t.name.as_str()), Some("Red"));
        assert_eq!(state.team2.as_ref().map(|t| t.name.as_str()), Some("Blue"));
        assert_eq!((state.team1_score, state.team2_score), (1, 0));
    }

    #[test]
    fn resolves_player_roles_and_characters() {
        let state = build_overlay_state(&sample());
        let red = &state.teams[0].players[0];
        assert_eq!(red.role.as_ref().map(|r| r.name.as_str()), Some("Tank"));
        assert_eq!(red.character.as_ref().map(|c| c.name.as_str()), Some("Knight"));
        // index 7 does not exist
        assert!(state.teams[1].players[0].character.is_none());
        assert!(state.teams[1].players[0].role.is_none());
    }

    #[test]
    fn bracket_cells_carry_names_and_visibility() {
        let state = build_overlay_state(&sample());
        let first = state.bracket[0][0].as_ref().unwrap();
        assert_eq!(first.team1.as_deref(), Some("Red"));
        assert_eq!(first.team2.as_deref(), Some("Blue"));
        assert!(first.visible);

        // green has a bye into the final
        let bye = state.bracket[0][1].as_ref().unwrap();
        assert_eq!(bye.winner.as_deref(), Some("Green"));
        assert!(!bye.visible);
        let last = state.bracket[1][0].as_ref().unwrap();
        assert_eq!(last.team2.as_deref(), Some("Green"));
    }

    #[test]
    fn rounds_resolve_gamemode_and_map() {
        let state = build_overlay_state(&sample());
        assert_eq!(state.rounds[0].gamemode.as_deref(), Some("Control"));
        assert_eq!(state.rounds[0].gamemode_icon.as_deref(), Some("/assets/control.png"));
        assert_eq!(state.rounds[0].map.as_deref(), Some("Harbor"));
        assert!(state.rounds[1].gamemode.is_none());
        assert!(state.rounds[1].map.is_none());
    }

    #[test]
    fn dangling_references_resolve_to_null() {
        let mut data = sample();
        data.current_match.team2 = Some(42);
        data.current_match.rounds[0].map = Some(9);
        data.division.bracket[0][0] = Some(Matchup::new(Some(0), Some(42)));

        let state = build_overlay_state(&data);
        assert!(state.team2.is_none());
        assert!(state.rounds[0].map.is_none());
        let cell = state.bracket[0][0].as_ref().unwrap();
        assert_eq!(cell.team1.as_deref(), Some("Red"));
        assert!(cell.team2.is_none());
    }

    #[test]
    fn assets_map_to_served_urls() {
        let state = build_overlay_state(&sample());
        assert_eq!(state.assets.get("logo").map(String::as_str), Some("/assets/logo.png"));
        assert_eq!(state.assets.get("notes").map(String::as_str), Some("/notes.txt"));
    }

    #[test]
    fn current_team_accepts_only_one_and_two() {
        let data = sample();
        assert_eq!(current_team(&data, 1).map(|t| t.index), Some(0));
        assert_eq!(current_team(&data, 2).map(|t| t.index), Some(1));
        assert!(current_team(&data, 0).is_none());
        assert!(current_team(&data, 3).is_none());
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let value = serde_json::to_value(build_overlay_state(&sample())).unwrap();
        assert!(value.get("eventName").is_some());
        assert!(value.get("swapScoreboard").is_some());
        assert!(value["bracket"][0][0].get("team1Score").is_some());
    }
}
