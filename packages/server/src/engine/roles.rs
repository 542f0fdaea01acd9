use chrono::{DateTime, Duration, Utc};
use rand::{seq::SliceRandom, Rng};

use super::GameError;
use crate::models::{
    game::{Game, GameStatus, RoundState},
    log::{GameLog, LogType},
    player::Player,
    role::{Role, RoleDistribution},
};

/// Hands out roles in roster order (mafia first, then doctor, then
/// villagers), revives everyone, then shuffles the seating so nobody can
/// read roles off seat order.
pub fn assign_roles<R: Rng + ?Sized>(players: &mut [Player], rng: &mut R) -> RoleDistribution {
    let distribution = RoleDistribution::for_player_count(players.len());

    for (index, player) in players.iter_mut().enumerate() {
        player.role = Some(if index < distribution.mafia_count {
            Role::Mafia
        } else if index < distribution.mafia_count + distribution.doctor_count {
            Role::Doctor
        } else {
            Role::Villager
        });
        player.alive = true;
    }

    players.shuffle(rng);
    distribution
}

impl Game {
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        caller: &str,
        rng: &mut R,
        now: DateTime<Utc>,
        phase_duration: Duration,
    ) -> Result<Vec<GameLog>, GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::InvalidState(format!(
                "Cannot start game with status: {}. Only waiting games can be started.",
                self.status
            )));
        }
        if !self.is_host(caller) {
            return Err(GameError::Forbidden(
                "Only the host can start the game".to_string(),
            ));
        }

        let distribution = assign_roles(&mut self.players, rng);

        self.status = GameStatus::InProgress;
        self.round = Some(RoundState::first_day(now + phase_duration));
        self.final_round = None;
        self.winner = None;

        let logs = vec![
            GameLog::new(
                LogType::System,
                "gameStarted",
                format!(
                    "Game started! Roles have been assigned. {} Mafia, {} Doctor, {} Villagers.",
                    distribution.mafia_count,
                    distribution.doctor_count,
                    distribution.villager_count
                ),
            )
            .with_param("mafiaCount", distribution.mafia_count)
            .with_param("doctorCount", distribution.doctor_count)
            .with_param("villagerCount", distribution.villager_count),
            GameLog::new(
                LogType::Phase,
                "day1Begins",
                "Day 1 begins. Discuss and vote to lynch a suspect.",
            ),
        ];
        self.push_logs(&logs);
        Ok(logs)
    }
}
