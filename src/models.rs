use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::bracket;
use crate::types::{DEFAULT_BRACKET_STAGE_COUNT, DEFAULT_ROUND_COUNT};

// ── Save file ──────────────────────────────────────────────────────────

/// Everything persisted in a save file. Loaded and written wholesale.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveData {
    pub settings: Settings,
    pub division: Division,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub current_match: Match,
}

impl SaveData {
    pub fn assets_map(&self) -> HashMap<String, String> {
        self.assets
            .iter()
            .map(|asset| (asset.name.clone(), asset.path.clone()))
            .collect()
    }

    /// Per bracket cell: whether both teams of the matchup are known.
    pub fn bracket_visibilities(&self) -> Vec<Vec<bool>> {
        self.division
            .bracket
            .iter()
            .map(|stage| {
                stage
                    .iter()
                    .map(|cell| cell.as_ref().map(Matchup::is_filled).unwrap_or(false))
                    .collect()
            })
            .collect()
    }

    pub fn correct_rounds_to_count(&mut self) {
        self.current_match
            .rounds
            .resize_with(self.settings.round_count, Round::default);
    }

    /// Brings both the current match and the bracket in line with the settings.
    pub fn correct_to_counts(&mut self) {
        self.correct_rounds_to_count();
        self.correct_bracket_to_count();
    }

    pub fn correct_bracket_to_count(&mut self) {
        let team_count = self.division.teams.len();
        let shape = if team_count >= 2 {
            let shape = bracket::shape_for_teams(team_count);
            self.settings.bracket_stage_count = shape.len();
            shape
        } else {
            bracket::shape_for_stage_count(self.settings.bracket_stage_count)
        };
        self.division.reshape_bracket(&shape);
    }
}

// ── Settings ───────────────────────────────────────────────────────────

fn default_bracket_stage_count() -> usize {
    DEFAULT_BRACKET_STAGE_COUNT
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Settings {
    pub event_name: String,
    pub round_count: usize,
    #[serde(default = "default_bracket_stage_count")]
    pub bracket_stage_count: usize,
    #[serde(default)]
    pub gamemodes: Vec<Gamemode>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub characters: Vec<Character>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            event_name: "New Event".to_string(),
            round_count: DEFAULT_ROUND_COUNT,
            bracket_stage_count: DEFAULT_BRACKET_STAGE_COUNT,
            gamemodes: Vec::new(),
            roles: Vec::new(),
            characters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Gamemode {
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub maps: Vec<Map>,
}

impl Gamemode {
    pub fn new(name: &str, icon: Option<String>, maps: Vec<Map>) -> Self {
        Self {
            name: name.to_string(),
            icon,
            maps,
        }
    }
}

impl Default for Gamemode {
    fn default() -> Self {
        Self::new("New Gamemode", None, Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Map {
    pub name: String,
    pub image: Option<String>,
}

impl Map {
    pub fn new(name: &str, image: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            image,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Role {
    pub name: String,
    pub icon: Option<String>,
}

impl Role {
    pub fn new(name: &str, icon: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            icon,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Character {
    pub name: String,
    pub image: Option<String>,
}

impl Character {
    pub fn new(name: &str, image: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            image,
        }
    }
}

/// Named file reference; `path` is relative to the save file's directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Asset {
    pub name: String,
    pub path: String,
}

impl Asset {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

// ── Teams ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Team {
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(name: &str, icon: Option<String>, players: Vec<Player>) -> Self {
        Self {
            name: name.to_string(),
            icon,
            players,
        }
    }
}

impl Default for Team {
    fn default() -> Self {
        Self::new("New Team", None, Vec::new())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Player {
    pub name: String,
    /// Index into `Settings::roles`.
    pub role: Option<usize>,
    /// Index into `Settings::characters`.
    pub character: Option<usize>,
}

impl Player {
    pub fn new(name: &str, role: Option<usize>, character: Option<usize>) -> Self {
        Self {
            name: name.to_string(),
            role,
            character,
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new("New Player", None, None)
    }
}

// ── Bracket ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Division {
    pub teams: Vec<Team>,
    /// Indexed `[round][slot]`; `None` for cells not yet determined.
    pub bracket: Vec<Vec<Option<Matchup>>>,
}

impl Division {
    pub fn new(teams: Vec<Team>, bracket: Option<Vec<Vec<Option<Matchup>>>>) -> Self {
        let bracket = bracket.unwrap_or_else(|| {
            bracket::shape_for_stage_count(DEFAULT_BRACKET_STAGE_COUNT)
                .into_iter()
                .map(|len| vec![None; len])
                .collect()
        });
        Self { teams, bracket }
    }
}

impl Default for Division {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

/// One bracket cell. Team fields index into `Division::teams`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "StoredMatchup")]
pub struct Matchup {
    pub team1: Option<usize>,
    pub team2: Option<usize>,
    pub team1_score: usize,
    pub team2_score: usize,
    pub winner: Option<usize>,
}

impl Matchup {
    pub fn new(team1: Option<usize>, team2: Option<usize>) -> Self {
        Self {
            team1,
            team2,
            ..Self::default()
        }
    }

    pub fn is_filled(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }

    pub fn has_team(&self, team: usize) -> bool {
        self.team1 == Some(team) || self.team2 == Some(team)
    }

    pub fn team(&self, side: usize) -> Option<usize> {
        match side {
            0 => self.team1,
            _ => self.team2,
        }
    }

    pub fn team_mut(&mut self, side: usize) -> &mut Option<usize> {
        match side {
            0 => &mut self.team1,
            _ => &mut self.team2,
        }
    }

    pub fn clear_result(&mut self) {
        self.team1_score = 0;
        self.team2_score = 0;
        self.winner = None;
    }
}

/// On-disk matchup as written by either schema: older saves carry a
/// `completed` flag, newer ones an explicit `winner`.
#[derive(Deserialize)]
struct StoredMatchup {
    #[serde(default)]
    team1: Option<usize>,
    #[serde(default)]
    team2: Option<usize>,
    #[serde(default)]
    team1_score: usize,
    #[serde(default)]
    team2_score: usize,
    #[serde(default)]
    winner: Option<usize>,
    #[serde(default)]
    completed: Option<bool>,
}

impl From<StoredMatchup> for Matchup {
    fn from(stored: StoredMatchup) -> Self {
        let winner = match (stored.winner, stored.completed) {
            (Some(winner), _) => Some(winner),
            (None, Some(true)) => migrate_completed_winner(&stored),
            (None, _) => None,
        };
        Matchup {
            team1: stored.team1,
            team2: stored.team2,
            team1_score: stored.team1_score,
            team2_score: stored.team2_score,
            winner,
        }
    }
}

fn migrate_completed_winner(stored: &StoredMatchup) -> Option<usize> {
    match (stored.team1, stored.team2) {
        (Some(team), None) | (None, Some(team)) => Some(team),
        (Some(team1), Some(team2)) => {
            if stored.team1_score > stored.team2_score {
                Some(team1)
            } else if stored.team2_score > stored.team1_score {
                Some(team2)
            } else {
                warn!(team1, team2, "completed matchup is tied; dropping its result");
                None
            }
        }
        (None, None) => None,
    }
}

// ── Current match ──────────────────────────────────────────────────────

/// The head-to-head series currently shown on the overlay.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Match {
    pub rounds: Vec<Round>,
    pub team1: Option<usize>,
    pub team2: Option<usize>,
    pub swap_scoreboard: bool,
}

impl Match {
    pub fn team1_score(&self) -> usize {
        self.rounds
            .iter()
            .filter(|round| round.team1_score > round.team2_score)
            .count()
    }

    pub fn team2_score(&self) -> usize {
        self.rounds
            .iter()
            .filter(|round| round.team2_score > round.team1_score)
            .count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Round {
    /// Index into `Settings::gamemodes`.
    pub gamemode: Option<usize>,
    /// Index into the maps of `gamemode`.
    pub map: Option<usize>,
    pub team1_score: usize,
    pub team2_score: usize,
    pub completed: bool,
}
