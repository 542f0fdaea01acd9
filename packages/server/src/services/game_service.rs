use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use crate::{
    engine::{
        flavor::{RandomPicker, VariantPicker},
        lifecycle::LeaveOutcome,
        phase::PhaseOutcome,
        GameError,
    },
    models::{
        comment::Comment,
        config::GameConfig,
        game::{Game, GameStatus},
        log::GameLog,
        player::Player,
    },
    services::{
        broadcaster::{EventSink, GameEvent},
        profile_service::ProfileStore,
        registry::{GameRegistry, SharedGame},
        scheduler::{PhaseScheduler, PhaseTick},
    },
};

#[derive(Clone)]
pub struct GameService {
    registry: GameRegistry,
    profiles: Arc<dyn ProfileStore>,
    events: Arc<dyn EventSink>,
    scheduler: Arc<PhaseScheduler>,
    picker: Arc<dyn VariantPicker>,
    rng: Arc<StdMutex<StdRng>>,
    config: Arc<GameConfig>,
}

impl GameService {
    pub fn new(
        registry: GameRegistry,
        profiles: Arc<dyn ProfileStore>,
        events: Arc<dyn EventSink>,
        scheduler: Arc<PhaseScheduler>,
        config: Arc<GameConfig>,
    ) -> Self {
        Self {
            registry,
            profiles,
            events,
            scheduler,
            picker: Arc::new(RandomPicker),
            rng: Arc::new(StdMutex::new(StdRng::from_entropy())),
            config,
        }
    }

    pub fn with_picker(mut self, picker: Arc<dyn VariantPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(StdMutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &PhaseScheduler {
        &self.scheduler
    }

    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }

    async fn shared(&self, game_id: &str) -> Result<SharedGame, GameError> {
        self.registry.get(game_id).await.ok_or(GameError::NotFound)
    }

    fn present(&self, game: &Game) -> Game {
        let mut game = game.clone();
        game.host_nickname = self.profiles.nickname(&game.host_id);
        game
    }

    fn player_for(&self, user_id: &str) -> Player {
        let profile = self.profiles.profile_or_unknown(user_id);
        Player::new(user_id.to_string(), profile.nickname, profile.avatar_seed)
    }

    fn publish_logs(&self, game_id: &str, logs: &[GameLog]) {
        for log in logs {
            self.events.publish(GameEvent::GameLog {
                game_id: game_id.to_string(),
                log: log.clone(),
            });
        }
    }

    fn publish_update(&self, game: &Game) {
        self.events.publish(GameEvent::updated(game));
    }

    fn phase_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.phase_duration().as_secs() as i64)
    }

    fn arm_phase_timer(&self, game: &Game) {
        if let Some(round) = game.round.as_ref() {
            self.scheduler.arm(
                PhaseTick {
                    game_id: game.id.clone(),
                    phase: round.phase,
                    day_number: round.day_number,
                },
                self.config.phase_duration(),
            );
        }
    }

    pub async fn create_game(
        &self,
        host_id: &str,
        name: &str,
        max_players: Option<usize>,
    ) -> Result<Game, GameError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::InvalidArgument(
                "Game name is required".to_string(),
            ));
        }
        let max_players = max_players
            .filter(|&n| n > 0)
            .unwrap_or(self.config.default_max_players);

        let game = Game::new(name.to_string(), self.player_for(host_id), max_players);
        let game = match self.registry.insert_unless_hosting(game.clone()).await {
            Ok(_) => self.present(&game),
            Err(existing) => {
                log::info!(
                    "User {} tried to create a game while hosting {}",
                    host_id,
                    existing.id
                );
                return Err(GameError::AlreadyHosting(Box::new(self.present(&existing))));
            }
        };

        log::info!("Game created: {} ({}) by {}", game.name, game.id, host_id);
        self.events.publish(GameEvent::GameCreated(game.clone()));
        Ok(game)
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Game, GameError> {
        let game = self.registry.snapshot(game_id).await.ok_or(GameError::NotFound)?;
        Ok(self.present(&game))
    }

    pub async fn list_games(&self, status: Option<GameStatus>) -> Vec<Game> {
        let games = match status {
            Some(status) => self.registry.list_by_status(status).await,
            None => self.registry.list_all().await,
        };
        games.iter().map(|g| self.present(g)).collect()
    }

    pub async fn games_for_user(&self, user_id: &str) -> Vec<Game> {
        self.registry
            .list_where(|g| g.status.is_active() && (g.is_host(user_id) || g.has_player(user_id)))
            .await
            .iter()
            .map(|g| self.present(g))
            .collect()
    }

    pub async fn join_game(&self, game_id: &str, user_id: &str) -> Result<Game, GameError> {
        let shared = self.shared(game_id).await?;
        let (game, log) = {
            let mut game = shared.lock().await;
            let log = game.join(self.player_for(user_id)).map_err(|e| self.present_error(e))?;
            (self.present(&game), log)
        };

        log::info!("User {} joined game {}", user_id, game_id);
        self.publish_update(&game);
        self.publish_logs(game_id, &[log]);
        Ok(game)
    }

    pub async fn leave_game(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<(Game, LeaveOutcome), GameError> {
        let shared = self.shared(game_id).await?;
        let (game, outcome) = {
            let mut game = shared.lock().await;
            let outcome = game.leave(user_id)?;
            (self.present(&game), outcome)
        };

        log::info!("User {} left game {}", user_id, game_id);
        self.publish_update(&game);
        self.publish_logs(game_id, &[outcome.log.clone()]);
        if outcome.game_cancelled {
            log::info!("Game {} cancelled because its host left", game_id);
            self.scheduler.cancel(game_id);
            self.events.publish(GameEvent::GameCancelled {
                game_id: game_id.to_string(),
            });
        }
        Ok((game, outcome))
    }

    pub async fn cancel_game(&self, game_id: &str, caller: &str) -> Result<Game, GameError> {
        let shared = self.shared(game_id).await?;
        let game = {
            let mut game = shared.lock().await;
            game.cancel(caller)?;
            self.present(&game)
        };
        self.scheduler.cancel(game_id);

        log::info!("Game {} cancelled by host", game_id);
        self.publish_update(&game);
        self.events.publish(GameEvent::GameCancelled {
            game_id: game_id.to_string(),
        });
        Ok(game)
    }

    pub async fn end_game(&self, game_id: &str, caller: &str) -> Result<Game, GameError> {
        let shared = self.shared(game_id).await?;
        let game = {
            let mut game = shared.lock().await;
            game.end(caller)?;
            self.present(&game)
        };
        self.scheduler.cancel(game_id);

        log::info!("Game {} ended by host", game_id);
        self.publish_update(&game);
        self.events.publish(GameEvent::GameEnded {
            game_id: game_id.to_string(),
        });
        Ok(game)
    }

    pub async fn delete_game(&self, game_id: &str) -> bool {
        self.scheduler.cancel(game_id);
        let removed = self.registry.remove(game_id).await;
        if removed {
            log::info!("Game {} deleted", game_id);
            self.events.forget(game_id);
        }
        removed
    }

    pub async fn delete_inactive_games(&self) -> usize {
        let removed = self.registry.remove_inactive().await;
        for game_id in &removed {
            self.scheduler.cancel(game_id);
            self.events.forget(game_id);
        }
        removed.len()
    }

    pub async fn add_comment(
        &self,
        game_id: &str,
        user_id: &str,
        message: &str,
    ) -> Result<Comment, GameError> {
        let shared = self.shared(game_id).await?;
        let comment = {
            let mut game = shared.lock().await;
            game.add_comment(
                user_id,
                message,
                self.config.max_comment_length,
                self.config.max_comments,
            )?
        };

        self.events.publish(GameEvent::GameComment {
            game_id: game_id.to_string(),
            comment: comment.clone(),
        });
        Ok(comment)
    }

    pub async fn comments(
        &self,
        game_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Comment>, GameError> {
        let shared = self.shared(game_id).await?;
        let game = shared.lock().await;
        let limit = limit.unwrap_or(game.comments.len());
        Ok(game.comments.iter().take(limit).cloned().collect())
    }

    pub async fn logs(&self, game_id: &str) -> Result<Vec<GameLog>, GameError> {
        let shared = self.shared(game_id).await?;
        let game = shared.lock().await;
        Ok(game.logs.clone())
    }

    pub async fn start_game(&self, game_id: &str, caller: &str) -> Result<Game, GameError> {
        let shared = self.shared(game_id).await?;
        let (game, logs) = {
            let mut game = shared.lock().await;
            let logs = {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                game.start(caller, &mut *rng, Utc::now(), self.phase_duration())?
            };
            self.arm_phase_timer(&game);
            (self.present(&game), logs)
        };

        log::info!(
            "Game {} started with {} players",
            game_id,
            game.current_players
        );
        self.publish_update(&game);
        self.publish_logs(game_id, &logs);
        Ok(game)
    }

    pub async fn vote_day(
        &self,
        game_id: &str,
        user_id: &str,
        target_user_id: Option<&str>,
    ) -> Result<Game, GameError> {
        self.ballot(game_id, |game| game.vote_day(user_id, target_user_id))
            .await
    }

    pub async fn vote_night(
        &self,
        game_id: &str,
        user_id: &str,
        target_user_id: Option<&str>,
    ) -> Result<Game, GameError> {
        self.ballot(game_id, |game| game.vote_night(user_id, target_user_id))
            .await
    }

    pub async fn cast_vote(
        &self,
        game_id: &str,
        user_id: &str,
        target_user_id: Option<&str>,
    ) -> Result<Game, GameError> {
        self.ballot(game_id, |game| game.cast_vote(user_id, target_user_id))
            .await
    }

    async fn ballot<F>(&self, game_id: &str, cast: F) -> Result<Game, GameError>
    where
        F: FnOnce(&mut Game) -> Result<(), GameError>,
    {
        let shared = self.shared(game_id).await?;
        let game = {
            let mut game = shared.lock().await;
            cast(&mut game)?;
            self.present(&game)
        };
        self.publish_update(&game);
        Ok(game)
    }

    pub async fn transition_phase(&self, game_id: &str) -> Result<Option<PhaseOutcome>, GameError> {
        self.run_transition(game_id, None).await
    }

    /// Runs the boundary a deadline was armed for. Ticks that no longer match
    /// the game's round are ignored.
    pub async fn on_phase_due(&self, tick: PhaseTick) -> Result<Option<PhaseOutcome>, GameError> {
        let game_id = tick.game_id.clone();
        self.run_transition(&game_id, Some(tick)).await
    }

    async fn run_transition(
        &self,
        game_id: &str,
        expected: Option<PhaseTick>,
    ) -> Result<Option<PhaseOutcome>, GameError> {
        let shared = self.shared(game_id).await?;
        let (game, outcome) = {
            let mut game = shared.lock().await;
            if let Some(tick) = expected.as_ref() {
                let current = game.round.as_ref().map(|r| (r.phase, r.day_number));
                if current != Some((tick.phase, tick.day_number)) {
                    log::debug!("Stale phase deadline for game {} ignored", game_id);
                    return Ok(None);
                }
            }
            let Some(outcome) =
                game.transition_phase(self.picker.as_ref(), Utc::now(), self.phase_duration())
            else {
                return Ok(None);
            };
            if !outcome.finished() {
                self.arm_phase_timer(&game);
            }
            (self.present(&game), outcome)
        };

        if let Some(eliminated) = outcome.eliminated.as_deref() {
            log::info!("Player {} eliminated in game {}", eliminated, game_id);
        }
        self.publish_update(&game);
        self.publish_logs(game_id, &outcome.logs);
        if let Some(win) = outcome.outcome {
            log::info!("Game {} finished: {:?}", game_id, win.winner());
            self.scheduler.cancel(game_id);
            self.events.publish(GameEvent::GameEnded {
                game_id: game_id.to_string(),
            });
        }
        Ok(Some(outcome))
    }

    fn present_error(&self, error: GameError) -> GameError {
        match error {
            GameError::AlreadyJoined(game) => GameError::AlreadyJoined(Box::new(self.present(&game))),
            GameError::Full(game) => GameError::Full(Box::new(self.present(&game))),
            other => other,
        }
    }
}
