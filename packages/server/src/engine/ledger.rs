use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::GameError;
use crate::models::{
    game::{Game, GamePhase, GameStatus, RoundState},
    role::Role,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub from_user_id: String,
    pub target_user_id: String,
    pub timestamp: DateTime<Utc>,
}

impl Vote {
    pub fn new(from_user_id: &str, target_user_id: &str) -> Self {
        Vote {
            from_user_id: from_user_id.to_string(),
            target_user_id: target_user_id.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// One live ballot per voter. Casting again replaces the earlier ballot;
/// casting "no target" withdraws it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoteLedger {
    votes: Vec<Vote>,
}

impl VoteLedger {
    pub fn cast(&mut self, from_user_id: &str, target_user_id: Option<&str>) {
        self.votes.retain(|v| v.from_user_id != from_user_id);
        if let Some(target) = target_user_id {
            self.votes.push(Vote::new(from_user_id, target));
        }
    }

    pub fn ballot_of(&self, user_id: &str) -> Option<&Vote> {
        self.votes.iter().find(|v| v.from_user_id == user_id)
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    pub fn clear(&mut self) {
        self.votes.clear();
    }

    pub fn tally(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for vote in &self.votes {
            *counts.entry(vote.target_user_id.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// The target with the most ballots. Ties go to the smallest user id.
    pub fn leader(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        // BTreeMap iterates in ascending id order, so a strict `>` keeps the
        // smallest id among equal counts.
        for (target, count) in self.tally() {
            if best.map_or(true, |(_, max)| count > max) {
                best = Some((target, count));
            }
        }
        best.map(|(target, _)| target)
    }
}

impl Game {
    pub fn vote_day(&mut self, user_id: &str, target_user_id: Option<&str>) -> Result<(), GameError> {
        self.check_ballot(GamePhase::Day, user_id, target_user_id)?;
        let round = self.round_mut(GamePhase::Day)?;
        round.day_votes.cast(user_id, target_user_id);
        Ok(())
    }

    pub fn vote_night(
        &mut self,
        user_id: &str,
        target_user_id: Option<&str>,
    ) -> Result<(), GameError> {
        self.check_ballot(GamePhase::Night, user_id, target_user_id)?;
        let role = self.player(user_id).and_then(|p| p.role);
        let round = self.round_mut(GamePhase::Night)?;
        match role {
            Some(Role::Mafia) => round.night_votes.cast(user_id, target_user_id),
            Some(Role::Doctor) => {
                round.doctor_heal = target_user_id.map(|target| Vote::new(user_id, target));
            }
            _ => {
                return Err(GameError::Forbidden(
                    "Only mafia and doctor can vote during night".to_string(),
                ))
            }
        }
        Ok(())
    }

    pub fn cast_vote(&mut self, user_id: &str, target_user_id: Option<&str>) -> Result<(), GameError> {
        match self.round.as_ref().map(|r| r.phase) {
            Some(GamePhase::Night) => self.vote_night(user_id, target_user_id),
            _ => self.vote_day(user_id, target_user_id),
        }
    }

    fn check_ballot(
        &self,
        phase: GamePhase,
        user_id: &str,
        target_user_id: Option<&str>,
    ) -> Result<(), GameError> {
        let in_phase = self.status == GameStatus::InProgress
            && self.round.as_ref().map(|r| r.phase) == Some(phase);
        if !in_phase {
            let name = match phase {
                GamePhase::Day => "day",
                GamePhase::Night => "night",
            };
            return Err(GameError::InvalidState(format!(
                "Can only vote during {} phase",
                name
            )));
        }

        if self.alive_player(user_id).is_none() {
            return Err(if self.has_player(user_id) {
                GameError::Forbidden("Dead players cannot vote".to_string())
            } else {
                GameError::NotAMember
            });
        }

        if let Some(target) = target_user_id {
            if self.alive_player(target).is_none() {
                return Err(GameError::InvalidTarget);
            }
        }
        Ok(())
    }

    fn round_mut(&mut self, phase: GamePhase) -> Result<&mut RoundState, GameError> {
        self.round
            .as_mut()
            .filter(|r| r.phase == phase)
            .ok_or_else(|| GameError::InvalidState("No round in progress".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::Player;

    fn game_in(phase: GamePhase, roles: &[(&str, Role)]) -> Game {
        let mut players = roles.iter().map(|(id, role)| {
            let mut p = Player::new(id.to_string(), id.to_string(), id.to_string());
            p.role = Some(*role);
            p
        });
        let host = players.next().unwrap();
        let mut game = Game::new("test".to_string(), host, 10);
        game.players.extend(players);
        game.sync_player_count();
        game.status = GameStatus::InProgress;
        let mut round = RoundState::first_day(Utc::now());
        round.phase = phase;
        game.round = Some(round);
        game
    }

    #[test]
    fn recasting_replaces_previous_ballot() {
        let mut ledger = VoteLedger::default();
        ledger.cast("a", Some("b"));
        ledger.cast("a", Some("c"));
        ledger.cast("b", Some("c"));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.ballot_of("a").unwrap().target_user_id, "c");
    }

    #[test]
    fn abstaining_withdraws_ballot() {
        let mut ledger = VoteLedger::default();
        ledger.cast("a", Some("b"));
        ledger.cast("a", None);
        assert!(ledger.is_empty());
    }

    #[test]
    fn leader_breaks_ties_by_smallest_id() {
        let mut ledger = VoteLedger::default();
        ledger.cast("v1", Some("zed"));
        ledger.cast("v2", Some("amy"));
        assert_eq!(ledger.leader(), Some("amy"));

        ledger.cast("v3", Some("zed"));
        assert_eq!(ledger.leader(), Some("zed"));
    }

    #[test]
    fn empty_ledger_has_no_leader() {
        assert_eq!(VoteLedger::default().leader(), None);
    }

    #[test]
    fn day_vote_outside_day_is_invalid_state() {
        let mut game = game_in(GamePhase::Night, &[("m", Role::Mafia), ("v", Role::Villager)]);
        let err = game.vote_day("v", Some("m")).unwrap_err();
        assert!(matches!(err, GameError::InvalidState(_)));
    }

    #[test]
    fn day_vote_on_dead_target_is_rejected() {
        let mut game = game_in(
            GamePhase::Day,
            &[("m", Role::Mafia), ("d", Role::Doctor), ("v", Role::Villager)],
        );
        game.player_mut("d").unwrap().alive = false;
        assert!(matches!(game.vote_day("v", Some("d")), Err(GameError::InvalidTarget)));
        assert!(matches!(game.vote_day("v", Some("ghost")), Err(GameError::InvalidTarget)));
    }

    #[test]
    fn dead_players_and_strangers_cannot_vote() {
        let mut game = game_in(GamePhase::Day, &[("m", Role::Mafia), ("v", Role::Villager)]);
        game.player_mut("v").unwrap().alive = false;
        assert!(matches!(game.vote_day("v", Some("m")), Err(GameError::Forbidden(_))));
        assert!(matches!(game.vote_day("x", Some("m")), Err(GameError::NotAMember)));
    }

    #[test]
    fn any_living_role_votes_by_day() {
        let mut game = game_in(
            GamePhase::Day,
            &[("m", Role::Mafia), ("d", Role::Doctor), ("v", Role::Villager)],
        );
        game.vote_day("m", Some("v")).unwrap();
        game.vote_day("d", Some("m")).unwrap();
        game.vote_day("v", Some("m")).unwrap();
        game.vote_day("v", Some("d")).unwrap();
        let round = game.round.as_ref().unwrap();
        assert_eq!(round.day_votes.len(), 3);
        assert_eq!(round.day_votes.ballot_of("v").unwrap().target_user_id, "d");
    }

    #[test]
    fn night_routes_mafia_and_doctor_separately() {
        let mut game = game_in(
            GamePhase::Night,
            &[("m", Role::Mafia), ("d", Role::Doctor), ("v", Role::Villager)],
        );
        game.vote_night("m", Some("v")).unwrap();
        game.vote_night("d", Some("v")).unwrap();
        let round = game.round.as_ref().unwrap();
        assert_eq!(round.night_votes.len(), 1);
        assert_eq!(round.doctor_heal.as_ref().unwrap().target_user_id, "v");

        game.vote_night("d", None).unwrap();
        game.vote_night("m", None).unwrap();
        let round = game.round.as_ref().unwrap();
        assert!(round.doctor_heal.is_none());
        assert!(round.night_votes.is_empty());
    }

    #[test]
    fn villagers_cannot_act_at_night() {
        let mut game = game_in(GamePhase::Night, &[("m", Role::Mafia), ("v", Role::Villager)]);
        assert!(matches!(game.vote_night("v", Some("m")), Err(GameError::Forbidden(_))));
    }

    #[test]
    fn cast_vote_follows_current_phase() {
        let mut game = game_in(GamePhase::Night, &[("m", Role::Mafia), ("v", Role::Villager)]);
        game.cast_vote("m", Some("v")).unwrap();
        assert_eq!(game.round.as_ref().unwrap().night_votes.len(), 1);
    }
}
