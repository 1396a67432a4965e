//! Keeps index references valid when the list they point into is edited.
//!
//! Every `Option<usize>` reference in the save data (player roles and
//! characters, round gamemodes and maps, matchup and match teams) is rewritten
//! through [`correct_index`] whenever its target list changes. A reference to
//! a removed element comes back as `None`; callers must blank the selection.

use crate::models::{Round, SaveData};

/// Position of `index` after `from` was removed (`to == None`) or moved to `to`.
pub fn correct_index(index: usize, from: usize, to: Option<usize>) -> Option<usize> {
    match to {
        None => {
            if index == from {
                None
            } else if index > from {
                Some(index - 1)
            } else {
                Some(index)
            }
        }
        Some(to) => {
            if index == from {
                Some(to)
            } else if index > from && index <= to {
                Some(index - 1)
            } else if index < from && index >= to {
                Some(index + 1)
            } else {
                Some(index)
            }
        }
    }
}

/// An edit applied to an ordered list that other records index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEdit {
    Removed(usize),
    Moved { from: usize, to: usize },
    Inserted(usize),
}

impl ListEdit {
    pub fn correct(self, index: Option<usize>) -> Option<usize> {
        let index = index?;
        match self {
            ListEdit::Removed(at) => correct_index(index, at, None),
            ListEdit::Moved { from, to } => correct_index(index, from, Some(to)),
            ListEdit::Inserted(at) => Some(if index >= at { index + 1 } else { index }),
        }
    }

    pub fn correct_in_place(self, index: &mut Option<usize>) {
        *index = self.correct(*index);
    }

    /// Applies the edit to `list`. `Inserted` places `item` at the position.
    pub fn apply<T>(self, list: &mut Vec<T>, item: Option<T>) -> Result<(), String> {
        let len = list.len();
        match self {
            ListEdit::Removed(at) => {
                if at >= len {
                    return Err(format!("Cannot remove item {at}: list has {len} items."));
                }
                list.remove(at);
            }
            ListEdit::Moved { from, to } => {
                if from >= len || to >= len {
                    return Err(format!("Cannot move item {from} to {to}: list has {len} items."));
                }
                let moved = list.remove(from);
                list.insert(to, moved);
            }
            ListEdit::Inserted(at) => {
                if at > len {
                    return Err(format!("Cannot insert at {at}: list has {len} items."));
                }
                let item = item.ok_or_else(|| "No item given to insert.".to_string())?;
                list.insert(at, item);
            }
        }
        Ok(())
    }
}

impl SaveData {
    pub fn edit_teams(&mut self, edit: ListEdit, item: Option<crate::models::Team>) -> Result<(), String> {
        edit.apply(&mut self.division.teams, item)?;
        for matchup in self.division.bracket.iter_mut().flatten().flatten() {
            edit.correct_in_place(&mut matchup.team1);
            edit.correct_in_place(&mut matchup.team2);
            edit.correct_in_place(&mut matchup.winner);
        }
        edit.correct_in_place(&mut self.current_match.team1);
        edit.correct_in_place(&mut self.current_match.team2);
        // a removed team can leave its opponent with a bye
        self.division.advance_byes();
        Ok(())
    }

    pub fn edit_gamemodes(
        &mut self,
        edit: ListEdit,
        item: Option<crate::models::Gamemode>,
    ) -> Result<(), String> {
        edit.apply(&mut self.settings.gamemodes, item)?;
        for round in &mut self.current_match.rounds {
            edit.correct_in_place(&mut round.gamemode);
            // maps are owned by the gamemode; a cleared gamemode leaves no map to point at
            if round.gamemode.is_none() {
                round.map = None;
            }
        }
        Ok(())
    }

    pub fn edit_maps(
        &mut self,
        gamemode: usize,
        edit: ListEdit,
        item: Option<crate::models::Map>,
    ) -> Result<(), String> {
        let count = self.settings.gamemodes.len();
        let maps = &mut self
            .settings
            .gamemodes
            .get_mut(gamemode)
            .ok_or_else(|| format!("Gamemode {gamemode} not found ({count} gamemodes)."))?
            .maps;
        edit.apply(maps, item)?;
        self.current_match
            .rounds
            .iter_mut()
            .filter(|round| round.gamemode == Some(gamemode))
            .for_each(|round: &mut Round| edit.correct_in_place(&mut round.map));
        Ok(())
    }

    pub fn edit_roles(&mut self, edit: ListEdit, item: Option<crate::models::Role>) -> Result<(), String> {
        edit.apply(&mut self.settings.roles, item)?;
        for player in self.division.teams.iter_mut().flat_map(|team| team.players.iter_mut()) {
            edit.correct_in_place(&mut player.role);
        }
        Ok(())
    }

    pub fn edit_characters(
        &mut self,
        edit: ListEdit,
        item: Option<crate::models::Character>,
    ) -> Result<(), String> {
        edit.apply(&mut self.settings.characters, item)?;
        for player in self.division.teams.iter_mut().flat_map(|team| team.players.iter_mut()) {
            edit.correct_in_place(&mut player.character);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Character, Gamemode, Map, Matchup, Player, Role, Round, Team};

    /// Where each original position ends up, computed by editing a real list.
    fn spliced_positions(len: usize, edit: ListEdit) -> Vec<Option<usize>> {
        let mut list: Vec<usize> = (0..len).collect();
        edit.apply(&mut list, Some(usize::MAX)).unwrap();
        (0..len).map(|orig| list.iter().position(|&v| v == orig)).collect()
    }

    #[test]
    fn deletion_mode_branches() {
        assert_eq!(correct_index(2, 2, None), None);
        assert_eq!(correct_index(3, 2, None), Some(2));
        assert_eq!(correct_index(1, 2, None), Some(1));
        assert_eq!(correct_index(0, 0, None), None);
    }

    #[test]
    fn deletion_matches_list_removal() {
        for len in 1..7 {
            for removed in 0..len {
                let edit = ListEdit::Removed(removed);
                let expected = spliced_positions(len, edit);
                let actual: Vec<Option<usize>> = (0..len).map(|i| edit.correct(Some(i))).collect();
                assert_eq!(actual, expected, "len {len}, removed {removed}");
            }
        }
    }

    #[test]
    fn move_mode_branches() {
        // forward
        assert_eq!(correct_index(1, 1, Some(3)), Some(3));
        assert_eq!(correct_index(2, 1, Some(3)), Some(1));
        assert_eq!(correct_index(3, 1, Some(3)), Some(2));
        // backward
        assert_eq!(correct_index(3, 3, Some(1)), Some(1));
        assert_eq!(correct_index(1, 3, Some(1)), Some(2));
        assert_eq!(correct_index(2, 3, Some(1)), Some(3));
        // outside the moved span
        assert_eq!(correct_index(0, 1, Some(3)), Some(0));
        assert_eq!(correct_index(4, 1, Some(3)), Some(4));
        assert_eq!(correct_index(4, 3, Some(1)), Some(4));
    }

    #[test]
    fn move_matches_list_splice() {
        for len in 2..7 {
            for from in 0..len {
                for to in 0..len {
                    let edit = ListEdit::Moved { from, to };
                    let expected = spliced_positions(len, edit);
                    let actual: Vec<Option<usize>> = (0..len).map(|i| edit.correct(Some(i))).collect();
                    assert_eq!(actual, expected, "len {len}, {from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn insertion_matches_list_insert() {
        for len in 0..6 {
            for at in 0..=len {
                let edit = ListEdit::Inserted(at);
                let expected = spliced_positions(len, edit);
                let actual: Vec<Option<usize>> = (0..len).map(|i| edit.correct(Some(i))).collect();
                assert_eq!(actual, expected, "len {len}, insert at {at}");
            }
        }
    }

    #[test]
    fn absent_reference_stays_absent() {
        assert_eq!(ListEdit::Removed(0).correct(None), None);
        assert_eq!(ListEdit::Moved { from: 0, to: 2 }.correct(None), None);
        assert_eq!(ListEdit::Inserted(0).correct(None), None);
    }

    #[test]
    fn out_of_range_edit_is_rejected_and_state_kept() {
        let mut data = SaveData::default();
        data.settings.roles = vec![Role::new("Tank", None)];
        let before = data.clone();
        assert!(data.edit_roles(ListEdit::Removed(1), None).is_err());
        assert!(data.edit_roles(ListEdit::Moved { from: 0, to: 1 }, None).is_err());
        assert!(data.edit_maps(4, ListEdit::Removed(0), None).is_err());
        assert_eq!(data, before);
    }

    #[test]
    fn removing_gamemode_rewrites_rounds() {
        let mut data = SaveData::default();
        data.settings.gamemodes = (0..5)
            .map(|i| Gamemode::new(&format!("Mode {i}"), None, vec![Map::new("m", None)]))
            .collect();
        data.current_match.rounds = (0..5)
            .map(|i| Round {
                gamemode: Some(i),
                map: Some(0),
                ..Round::default()
            })
            .collect();

        data.edit_gamemodes(ListEdit::Removed(2), None).unwrap();

        let gamemodes: Vec<Option<usize>> =
            data.current_match.rounds.iter().map(|r| r.gamemode).collect();
        assert_eq!(gamemodes, vec![Some(0), Some(1), None, Some(2), Some(3)]);
        assert_eq!(data.current_match.rounds[2].map, None);
        assert_eq!(data.current_match.rounds[3].map, Some(0));
        assert_eq!(data.settings.gamemodes.len(), 4);
    }

    #[test]
    fn moving_team_rewrites_matchups() {
        let mut data = SaveData::default();
        data.division.teams = (0..5).map(|i| Team::new(&format!("T{i}"), None, vec![])).collect();
        data.division.bracket = vec![vec![
            Some(Matchup::new(Some(3), Some(0))),
            Some(Matchup::new(Some(4), None)),
        ]];
        data.current_match.team1 = Some(0);

        data.edit_teams(ListEdit::Moved { from: 0, to: 3 }, None).unwrap();

        let first = data.division.bracket[0][0].as_ref().unwrap();
        assert_eq!(first.team1, Some(2));
        assert_eq!(first.team2, Some(3));
        let second = data.division.bracket[0][1].as_ref().unwrap();
        assert_eq!(second.team1, Some(4));
        assert_eq!(data.current_match.team1, Some(3));
        assert_eq!(data.division.teams[3].name, "T0");
    }

    #[test]
    fn removing_team_clears_winner_and_references() {
        let mut data = SaveData::default();
        data.division.teams = (0..3).map(|i| Team::new(&format!("T{i}"), None, vec![])).collect();
        let mut played = Matchup::new(Some(1), Some(2));
        played.winner = Some(1);
        data.division.bracket = vec![vec![Some(played)], vec![Some(Matchup::new(Some(1), None))]];
        data.current_match.team2 = Some(2);

        data.edit_teams(ListEdit::Removed(1), None).unwrap();

        // the old winner is gone and its opponent now walks through on a bye
        let first = data.division.bracket[0][0].as_ref().unwrap();
        assert_eq!((first.team1, first.team2, first.winner), (None, Some(1), Some(1)));
        assert_eq!(data.division.bracket[1][0].as_ref().unwrap().team1, Some(1));
        assert_eq!(data.current_match.team2, Some(1));
    }

    #[test]
    fn removing_seeded_team_advances_its_opponent() {
        let mut data = SaveData::default();
        data.division.teams = (0..4).map(|i| Team::new(&format!("T{i}"), None, vec![])).collect();
        data.seed_bracket();

        data.edit_teams(ListEdit::Removed(3), None).unwrap();

        let orphaned = data.division.matchup(0, 1).unwrap();
        assert_eq!((orphaned.team1, orphaned.team2, orphaned.winner), (Some(2), None, Some(2)));
        let final_match = data.division.matchup(1, 0).unwrap();
        assert_eq!((final_match.team1, final_match.team2), (None, Some(2)));
        assert!(data.division.champion().is_none());
    }

    #[test]
    fn inserting_team_shifts_later_references() {
        let mut data = SaveData::default();
        data.division.teams = (0..2).map(|i| Team::new(&format!("T{i}"), None, vec![])).collect();
        data.division.bracket = vec![vec![Some(Matchup::new(Some(0), Some(1)))]];
        data.edit_teams(ListEdit::Inserted(1), Some(Team::default())).unwrap();
        let matchup = data.division.bracket[0][0].as_ref().unwrap();
        assert_eq!((matchup.team1, matchup.team2), (Some(0), Some(2)));
        assert!(data.edit_teams(ListEdit::Inserted(0), None).is_err());
    }

    #[test]
    fn map_edits_only_touch_rounds_of_that_gamemode() {
        let mut data = SaveData::default();
        data.settings.gamemodes = vec![
            Gamemode::new("A", None, vec![Map::new("a0", None), Map::new("a1", None)]),
            Gamemode::new("B", None, vec![Map::new("b0", None), Map::new("b1", None)]),
        ];
        data.current_match.rounds = vec![
            Round { gamemode: Some(0), map: Some(1), ..Round::default() },
            Round { gamemode: Some(1), map: Some(1), ..Round::default() },
        ];
        data.edit_maps(0, ListEdit::Removed(0), None).unwrap();
        assert_eq!(data.current_match.rounds[0].map, Some(0));
        assert_eq!(data.current_match.rounds[1].map, Some(1));
    }

    #[test]
    fn role_and_character_edits_rewrite_players() {
        let mut data = SaveData::default();
        data.settings.roles = vec![Role::new("Tank", None), Role::new("Support", None)];
        data.settings.characters = (0..3).map(|i| Character::new(&format!("C{i}"), None)).collect();
        data.division.teams = vec![Team::new(
            "T",
            None,
            vec![Player::new("p0", Some(0), Some(2)), Player::new("p1", Some(1), Some(0))],
        )];

        data.edit_roles(ListEdit::Removed(0), None).unwrap();
        data.edit_characters(ListEdit::Moved { from: 2, to: 0 }, None).unwrap();

        let players = &data.division.teams[0].players;
        assert_eq!((players[0].role, players[0].character), (None, Some(0)));
        assert_eq!((players[1].role, players[1].character), (Some(0), Some(1)));
    }
}
