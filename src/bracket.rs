//! Single-elimination bracket shape and progression.
//!
//! Slot `k` of round `r + 1` is fed by slots `2k` (as team1) and `2k + 1`
//! (as team2) of round `r`. Each round has half the slots of the previous one,
//! rounded up, so an odd slot out gets a free pass into the next round.

use std::cmp::Ordering;

use crate::models::{Division, Matchup, SaveData};

/// Upper bound for placeholder brackets built from `bracket_stage_count`.
pub const MAX_BRACKET_STAGES: usize = 10;

pub fn next_round_len(len: usize) -> usize {
    (len + 1) / 2
}

/// `ceil(log2(team_count))`; zero when there is nothing to play.
pub fn stage_count_for_teams(team_count: usize) -> usize {
    if team_count < 2 {
        return 0;
    }
    (usize::BITS - (team_count - 1).leading_zeros()) as usize
}

/// Slot counts per round, starting from `first` and halving down to the final.
pub fn shape_from_first_round(first: usize) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut len = first;
    while len > 0 {
        shape.push(len);
        if len == 1 {
            break;
        }
        len = next_round_len(len);
    }
    shape
}

pub fn shape_for_teams(team_count: usize) -> Vec<usize> {
    if team_count < 2 {
        return Vec::new();
    }
    shape_from_first_round(next_round_len(team_count))
}

pub fn shape_for_stage_count(stage_count: usize) -> Vec<usize> {
    if stage_count == 0 {
        return Vec::new();
    }
    let stages = stage_count.min(MAX_BRACKET_STAGES);
    shape_from_first_round(1 << (stages - 1))
}

/// Slot in the next round that slot `slot` feeds, and the side it lands on.
pub fn destination(slot: usize) -> (usize, usize) {
    (slot / 2, slot % 2)
}

impl Division {
    pub fn matchup(&self, round: usize, slot: usize) -> Option<&Matchup> {
        self.bracket.get(round)?.get(slot)?.as_ref()
    }

    fn matchup_mut(&mut self, round: usize, slot: usize) -> Result<&mut Matchup, String> {
        self.bracket
            .get_mut(round)
            .and_then(|cells| cells.get_mut(slot))
            .and_then(Option::as_mut)
            .ok_or_else(|| format!("No matchup at round {round}, slot {slot}."))
    }

    fn slot_exists(&self, round: usize, slot: usize) -> bool {
        self.bracket.get(round).map_or(false, |cells| slot < cells.len())
    }

    /// Champion of the final, once decided.
    pub fn champion(&self) -> Option<usize> {
        let last = self.bracket.len().checked_sub(1)?;
        self.matchup(last, 0)?.winner
    }

    /// Resizes the bracket to `shape`, keeping existing cells by position.
    pub fn reshape_bracket(&mut self, shape: &[usize]) {
        self.bracket.resize_with(shape.len(), Vec::new);
        for (cells, &len) in self.bracket.iter_mut().zip(shape) {
            cells.resize(len, None);
        }
    }

    /// Rebuilds the bracket from the team list: teams `2k` and `2k + 1`
    /// meet in first-round slot `k`, later rounds start empty.
    pub fn seed_bracket(&mut self) {
        let team_count = self.teams.len();
        self.bracket = shape_for_teams(team_count)
            .into_iter()
            .map(|len| vec![None; len])
            .collect();
        if let Some(first) = self.bracket.first_mut() {
            for (slot, cell) in first.iter_mut().enumerate() {
                let team2 = 2 * slot + 1;
                *cell = Some(Matchup::new(Some(2 * slot), (team2 < team_count).then_some(team2)));
            }
        }
        self.advance_byes();
    }

    /// A side is dead when no team can ever reach it.
    fn side_is_dead(&self, round: usize, slot: usize, side: usize) -> bool {
        if self.matchup(round, slot).and_then(|m| m.team(side)).is_some() {
            return false;
        }
        if round == 0 {
            return true;
        }
        let feeder = 2 * slot + side;
        if !self.slot_exists(round - 1, feeder) {
            return true;
        }
        self.side_is_dead(round - 1, feeder, 0) && self.side_is_dead(round - 1, feeder, 1)
    }

    /// One team present and the other side can never be filled.
    pub fn is_bye(&self, round: usize, slot: usize) -> bool {
        let Some(matchup) = self.matchup(round, slot) else {
            return false;
        };
        match (matchup.team1, matchup.team2) {
            (Some(_), None) => self.side_is_dead(round, slot, 1),
            (None, Some(_)) => self.side_is_dead(round, slot, 0),
            _ => false,
        }
    }

    pub fn set_scores(
        &mut self,
        round: usize,
        slot: usize,
        team1_score: usize,
        team2_score: usize,
    ) -> Result<(), String> {
        let matchup = self.matchup_mut(round, slot)?;
        matchup.team1_score = team1_score;
        matchup.team2_score = team2_score;
        Ok(())
    }

    /// Stores the scores and advances the higher-scoring team.
    pub fn record_result(
        &mut self,
        round: usize,
        slot: usize,
        team1_score: usize,
        team2_score: usize,
    ) -> Result<(), String> {
        let matchup = self.matchup_mut(round, slot)?;
        if !matchup.is_filled() {
            return Err(format!("Round {round}, slot {slot} needs two teams to record a result."));
        }
        let winner = match team1_score.cmp(&team2_score) {
            Ordering::Greater => matchup.team1,
            Ordering::Less => matchup.team2,
            Ordering::Equal => {
                return Err(format!(
                    "Round {round}, slot {slot} is tied {team1_score}-{team2_score}; pick a winner explicitly."
                ))
            }
        };
        matchup.team1_score = team1_score;
        matchup.team2_score = team2_score;
        self.set_winner(round, slot, winner)
    }

    /// Sets or clears the winner of a matchup and moves it into the next round.
    /// A replaced winner is withdrawn from every later round it had reached.
    pub fn set_winner(&mut self, round: usize, slot: usize, winner: Option<usize>) -> Result<(), String> {
        self.apply_winner(round, slot, winner)?;
        self.advance_byes();
        Ok(())
    }

    fn apply_winner(&mut self, round: usize, slot: usize, winner: Option<usize>) -> Result<(), String> {
        let is_bye = self.is_bye(round, slot);
        let matchup = self.matchup_mut(round, slot)?;
        if let Some(team) = winner {
            if !matchup.has_team(team) {
                return Err(format!("Team {team} is not playing in round {round}, slot {slot}."));
            }
            if !matchup.is_filled() && !is_bye {
                return Err(format!("Round {round}, slot {slot} is still waiting for an opponent."));
            }
        }
        if matchup.winner == winner {
            return Ok(());
        }
        matchup.winner = winner;
        let (next_slot, side) = destination(slot);
        self.place_team(round + 1, next_slot, side, winner);
        Ok(())
    }

    fn place_team(&mut self, round: usize, slot: usize, side: usize, team: Option<usize>) {
        let Some(cell) = self.bracket.get_mut(round).and_then(|cells| cells.get_mut(slot)) else {
            return;
        };
        if cell.is_none() && team.is_none() {
            return;
        }
        let matchup = cell.get_or_insert_with(Matchup::default);
        if matchup.team(side) == team {
            return;
        }
        *matchup.team_mut(side) = team;
        let had_winner = matchup.winner.is_some();
        matchup.clear_result();
        if had_winner {
            let (next_slot, next_side) = destination(slot);
            self.place_team(round + 1, next_slot, next_side, None);
        }
    }

    /// Advances every undecided bye, round by round so byes cascade.
    /// Returns how many teams moved.
    pub fn advance_byes(&mut self) -> usize {
        let mut advanced = 0;
        for round in 0..self.bracket.len() {
            for slot in 0..self.bracket[round].len() {
                if !self.is_bye(round, slot) {
                    continue;
                }
                let Some(matchup) = self.matchup(round, slot) else {
                    continue;
                };
                if matchup.winner.is_some() {
                    continue;
                }
                let team = matchup.team1.or(matchup.team2);
                if self.apply_winner(round, slot, team).is_ok() {
                    advanced += 1;
                }
            }
        }
        advanced
    }
}

impl SaveData {
    /// Seeds the bracket from the team list and records its stage count. With
    /// fewer than two teams the placeholder bracket is kept instead.
    pub fn seed_bracket(&mut self) {
        if self.division.teams.len() < 2 {
            self.correct_bracket_to_count();
            return;
        }
        self.division.seed_bracket();
        self.settings.bracket_stage_count = stage_count_for_teams(self.division.teams.len());
    }
}
