use super::GameError;
use crate::models::{
    comment::Comment,
    game::{FinalRound, Game, GameStatus},
    log::GameLog,
    player::Player,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LeaveOutcome {
    pub log: GameLog,
    pub game_cancelled: bool,
}

impl Game {
    pub fn join(&mut self, player: Player) -> Result<GameLog, GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::InvalidState(format!(
                "Cannot join game with status: {}. Only waiting games can be joined.",
                self.status
            )));
        }
        if self.has_player(&player.user_id) {
            return Err(GameError::AlreadyJoined(Box::new(self.clone())));
        }
        if self.is_full() {
            return Err(GameError::Full(Box::new(self.clone())));
        }

        let log = GameLog::join(&player.nickname);
        self.players.push(player);
        self.sync_player_count();
        self.push_logs(std::slice::from_ref(&log));
        Ok(log)
    }

    /// Removes a player. The host walking out of a waiting game cancels it,
    /// since a game cannot change hands before it starts.
    pub fn leave(&mut self, user_id: &str) -> Result<LeaveOutcome, GameError> {
        let index = self
            .players
            .iter()
            .position(|p| p.user_id == user_id)
            .ok_or(GameError::NotAMember)?;

        let player = self.players.remove(index);
        self.sync_player_count();

        let game_cancelled = self.is_host(user_id) && self.status == GameStatus::Waiting;
        let log = if game_cancelled {
            self.status = GameStatus::Cancelled;
            GameLog::host_cancelled(&player.nickname)
        } else {
            GameLog::leave(&player.nickname)
        };
        self.push_logs(std::slice::from_ref(&log));

        Ok(LeaveOutcome {
            log,
            game_cancelled,
        })
    }

    pub fn cancel(&mut self, caller: &str) -> Result<(), GameError> {
        self.close_by_host(caller, GameStatus::Cancelled, "cancel")
    }

    pub fn end(&mut self, caller: &str) -> Result<(), GameError> {
        self.close_by_host(caller, GameStatus::Finished, "end")
    }

    fn close_by_host(
        &mut self,
        caller: &str,
        status: GameStatus,
        verb: &str,
    ) -> Result<(), GameError> {
        if !self.is_host(caller) {
            return Err(GameError::Forbidden(format!(
                "Only host can {} the game",
                verb
            )));
        }
        if self.status.is_terminal() {
            return Err(GameError::InvalidState(format!(
                "Cannot {} game with status: {}",
                verb, self.status
            )));
        }
        self.status = status;
        self.round = None;
        self.final_round = None;
        Ok(())
    }

    pub(crate) fn freeze_round(&mut self) {
        if let Some(round) = self.round.take() {
            self.final_round = Some(FinalRound {
                phase: round.phase,
                day_number: round.day_number,
            });
        }
    }

    pub fn add_comment(
        &mut self,
        user_id: &str,
        message: &str,
        max_length: usize,
        max_comments: usize,
    ) -> Result<Comment, GameError> {
        if self.status.is_terminal() {
            return Err(GameError::GameEnded);
        }

        let message = message.trim();
        if message.is_empty() {
            return Err(GameError::InvalidArgument(
                "Comment message is required and must be a non-empty string".to_string(),
            ));
        }
        if message.chars().count() > max_length {
            return Err(GameError::InvalidArgument(format!(
                "Comment message is too long (max {} characters)",
                max_length
            )));
        }

        let sender = self.player(user_id).ok_or(GameError::NotAMember)?;
        let comment = Comment::from_player(&self.id, sender, message.to_string());

        self.comments.insert(0, comment.clone());
        self.comments.truncate(max_comments);
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{log::LogType, role::Role};

    fn player(id: &str) -> Player {
        Player::new(id.to_string(), format!("nick-{}", id), id.to_string())
    }

    fn waiting_game(max_players: usize) -> Game {
        Game::new("Friday night".to_string(), player("host"), max_players)
    }

    #[test]
    fn new_game_seats_host_and_logs_join() {
        let game = waiting_game(10);
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.current_players, 1);
        assert!(game.has_player("host"));
        assert_eq!(game.logs[0].key(), Some("join"));
    }

    #[test]
    fn join_appends_player_and_prepends_log() {
        let mut game = waiting_game(10);
        let log = game.join(player("p1")).unwrap();
        assert_eq!(log.log_type, LogType::Join);
        assert_eq!(game.current_players, 2);
        assert_eq!(game.players.last().unwrap().user_id, "p1");
        assert_eq!(game.logs[0], log);
        assert!(game.players[1].alive);
        assert!(game.players[1].role.is_none());
    }

    #[test]
    fn join_twice_reports_already_joined_with_snapshot() {
        let mut game = waiting_game(10);
        game.join(player("p1")).unwrap();
        match game.join(player("p1")) {
            Err(GameError::AlreadyJoined(snapshot)) => assert_eq!(snapshot.current_players, 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn join_full_game_fails_without_changes() {
        let mut game = waiting_game(2);
        game.join(player("p1")).unwrap();
        let logs_before = game.logs.len();

        let err = game.join(player("p2")).unwrap_err();
        assert!(matches!(err, GameError::Full(_)));
        assert_eq!(game.current_players, 2);
        assert_eq!(game.players.len(), 2);
        assert_eq!(game.logs.len(), logs_before);
    }

    #[test]
    fn join_requires_waiting_status() {
        let mut game = waiting_game(10);
        game.status = GameStatus::InProgress;
        assert!(matches!(game.join(player("p1")), Err(GameError::InvalidState(_))));
    }

    #[test]
    fn host_leaving_waiting_game_cancels_it() {
        let mut game = waiting_game(10);
        game.join(player("p1")).unwrap();
        let logs_before = game.logs.len();

        let outcome = game.leave("host").unwrap();
        assert!(outcome.game_cancelled);
        assert_eq!(outcome.log.key(), Some("leaveHostCancel"));
        assert_eq!(game.status, GameStatus::Cancelled);
        assert!(!game.has_player("host"));
        assert_eq!(game.current_players, 1);
        assert_eq!(game.logs.len(), logs_before + 1);
    }

    #[test]
    fn regular_leave_keeps_game_open() {
        let mut game = waiting_game(10);
        game.join(player("p1")).unwrap();
        let outcome = game.leave("p1").unwrap();
        assert!(!outcome.game_cancelled);
        assert_eq!(outcome.log.key(), Some("leave"));
        assert_eq!(game.status, GameStatus::Waiting);
        assert_eq!(game.current_players, 1);
    }

    #[test]
    fn leave_by_stranger_is_not_a_member() {
        let mut game = waiting_game(10);
        assert!(matches!(game.leave("nobody"), Err(GameError::NotAMember)));
    }

    #[test]
    fn only_host_can_cancel_or_end() {
        let mut game = waiting_game(10);
        game.join(player("p1")).unwrap();
        assert!(matches!(game.cancel("p1"), Err(GameError::Forbidden(_))));
        assert!(matches!(game.end("p1"), Err(GameError::Forbidden(_))));

        game.end("host").unwrap();
        assert_eq!(game.status, GameStatus::Finished);
        assert!(game.winner.is_none());
        assert!(matches!(game.cancel("host"), Err(GameError::InvalidState(_))));
    }

    #[test]
    fn ending_in_progress_game_drops_round_state() {
        let mut game = waiting_game(10);
        game.status = GameStatus::InProgress;
        game.round = Some(crate::models::game::RoundState::first_day(chrono::Utc::now()));

        game.cancel("host").unwrap();
        assert!(game.round.is_none());
        assert_eq!(game.phase(), None);
        assert_eq!(game.day_number(), None);
        assert!(game.winner.is_none());
    }

    #[test]
    fn comment_snapshots_sender_state() {
        let mut game = waiting_game(10);
        game.join(player("p1")).unwrap();
        game.player_mut("p1").unwrap().role = Some(Role::Doctor);

        let comment = game.add_comment("p1", "  hello  ", 500, 1000).unwrap();
        assert_eq!(comment.message, "hello");
        assert_eq!(comment.role, Some(Role::Doctor));
        assert!(comment.alive);

        game.player_mut("p1").unwrap().alive = false;
        assert!(game.comments[0].alive);
    }

    #[test]
    fn comment_validation() {
        let mut game = waiting_game(10);
        assert!(matches!(
            game.add_comment("host", "   ", 500, 1000),
            Err(GameError::InvalidArgument(_))
        ));
        let long = "x".repeat(501);
        assert!(matches!(
            game.add_comment("host", &long, 500, 1000),
            Err(GameError::InvalidArgument(_))
        ));
        assert!(matches!(
            game.add_comment("stranger", "hi", 500, 1000),
            Err(GameError::NotAMember)
        ));
        game.status = GameStatus::Cancelled;
        assert!(matches!(
            game.add_comment("host", "hi", 500, 1000),
            Err(GameError::GameEnded)
        ));
    }

    #[test]
    fn comments_are_newest_first_and_capped() {
        let mut game = waiting_game(10);
        for i in 0..5 {
            game.add_comment("host", &format!("msg {}", i), 500, 3).unwrap();
        }
        assert_eq!(game.comments.len(), 3);
        assert_eq!(game.comments[0].message, "msg 4");
        assert_eq!(game.comments[2].message, "msg 2");
    }
}
