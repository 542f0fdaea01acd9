use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{comment::Comment, log::GameLog, player::Player, role::Role};
use crate::engine::ledger::{Vote, VoteLedger};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
    Cancelled,
}

impl GameStatus {
    pub fn priority(&self) -> u8 {
        match self {
            GameStatus::Waiting => 0,
            GameStatus::InProgress => 1,
            GameStatus::Finished => 2,
            GameStatus::Cancelled => 3,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, GameStatus::Waiting | GameStatus::InProgress)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Waiting => write!(f, "waiting"),
            GameStatus::InProgress => write!(f, "in-progress"),
            GameStatus::Finished => write!(f, "finished"),
            GameStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(GameStatus::Waiting),
            "in-progress" => Ok(GameStatus::InProgress),
            "finished" => Ok(GameStatus::Finished),
            "cancelled" => Ok(GameStatus::Cancelled),
            other => Err(format!("unknown game status: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Day,   // 議論と投票
    Night, // マフィアの襲撃と医者の治療
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Mafia,
    Villagers,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub phase: GamePhase,
    pub day_number: u32,
    pub day_votes: VoteLedger,
    pub night_votes: VoteLedger,
    pub doctor_heal: Option<Vote>,
    pub phase_end_time: DateTime<Utc>,
}

impl RoundState {
    pub fn first_day(phase_end_time: DateTime<Utc>) -> Self {
        RoundState {
            phase: GamePhase::Day,
            day_number: 1,
            day_votes: VoteLedger::default(),
            night_votes: VoteLedger::default(),
            doctor_heal: None,
            phase_end_time,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalRound {
    pub phase: GamePhase,
    pub day_number: u32,
}

/// Serialized flat: the round fields (or the frozen final ones) sit next
/// to the game's own fields.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub name: String,
    pub host_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_nickname: Option<String>,
    pub status: GameStatus,
    pub max_players: usize,
    pub current_players: usize,
    pub players: Vec<Player>,
    pub logs: Vec<GameLog>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub round: Option<RoundState>,
    #[serde(flatten)]
    pub final_round: Option<FinalRound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Winner>,
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Game {{ id: {}, name: {}, host: {}, status: {}, players: {}/{}, phase: {:?}, winner: {:?} }}",
            self.id,
            self.name,
            self.host_id,
            self.status,
            self.current_players,
            self.max_players,
            self.phase(),
            self.winner
        )
    }
}

impl Game {
    pub fn new(name: String, host: Player, max_players: usize) -> Self {
        let join_log = GameLog::join(&host.nickname);
        Game {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            host_id: host.user_id.clone(),
            host_nickname: None,
            status: GameStatus::Waiting,
            max_players,
            current_players: 1,
            players: vec![host],
            logs: vec![join_log],
            comments: Vec::new(),
            created_at: Utc::now(),
            round: None,
            final_round: None,
            winner: None,
        }
    }

    pub fn player(&self, user_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    pub fn player_mut(&mut self, user_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.user_id == user_id)
    }

    pub fn alive_player(&self, user_id: &str) -> Option<&Player> {
        self.player(user_id).filter(|p| p.alive)
    }

    pub fn has_player(&self, user_id: &str) -> bool {
        self.player(user_id).is_some()
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_id == user_id
    }

    pub fn is_full(&self) -> bool {
        self.current_players >= self.max_players
    }

    /// Current phase while in progress, otherwise the phase the game froze in.
    pub fn phase(&self) -> Option<GamePhase> {
        self.round
            .as_ref()
            .map(|r| r.phase)
            .or(self.final_round.map(|r| r.phase))
    }

    pub fn day_number(&self) -> Option<u32> {
        self.round
            .as_ref()
            .map(|r| r.day_number)
            .or(self.final_round.map(|r| r.day_number))
    }

    pub fn count_alive(&self, role: Role) -> usize {
        self.players.iter().filter(|p| p.is_alive_with(role)).count()
    }

    pub fn push_logs(&mut self, logs: &[GameLog]) {
        for log in logs {
            self.logs.insert(0, log.clone());
        }
    }

    pub(crate) fn sync_player_count(&mut self) {
        self.current_players = self.players.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(
            "Friday night".to_string(),
            Player::new("h".to_string(), "Host".to_string(), "Host".to_string()),
            8,
        )
    }

    #[test]
    fn waiting_game_serializes_without_round_fields() {
        let json = serde_json::to_value(game()).unwrap();
        assert_eq!(json["status"], "waiting");
        assert_eq!(json["currentPlayers"], 1);
        assert!(json.get("phase").is_none());
        assert!(json.get("winner").is_none());
    }

    #[test]
    fn round_fields_sit_at_top_level() {
        let mut game = game();
        game.status = GameStatus::InProgress;
        game.round = Some(RoundState::first_day(Utc::now()));

        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["phase"], "day");
        assert_eq!(json["dayNumber"], 1);
        assert!(json["dayVotes"].as_array().unwrap().is_empty());
        assert!(json.get("phaseEndTime").is_some());
    }

    #[test]
    fn finished_game_keeps_final_phase() {
        let mut game = game();
        game.status = GameStatus::Finished;
        game.winner = Some(Winner::Villagers);
        game.final_round = Some(FinalRound {
            phase: GamePhase::Night,
            day_number: 3,
        });

        assert_eq!(game.phase(), Some(GamePhase::Night));
        let json = serde_json::to_value(&game).unwrap();
        assert_eq!(json["phase"], "night");
        assert_eq!(json["dayNumber"], 3);
        assert_eq!(json["winner"], "villagers");
        assert!(json.get("nightVotes").is_none());
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            GameStatus::Waiting,
            GameStatus::InProgress,
            GameStatus::Finished,
            GameStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<GameStatus>(), Ok(status));
        }
        assert!("paused".parse::<GameStatus>().is_err());
    }
}
