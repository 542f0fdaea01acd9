use std::sync::Arc;

use crate::models::config::GameConfig;
use crate::services::{
    broadcaster::ChannelBroadcaster,
    game_service::GameService,
    presence::PresenceTracker,
    profile_service::{InMemoryProfiles, ProfileStore},
    registry::GameRegistry,
    scheduler::{spawn_phase_driver, PhaseScheduler},
};

#[derive(Clone)]
pub struct AppState {
    pub games: GameService,
    pub profiles: Arc<dyn ProfileStore>,
    pub presence: Arc<PresenceTracker>,
    pub broadcaster: Arc<ChannelBroadcaster>,
    pub config: Arc<GameConfig>,
}

impl AppState {
    pub fn new(config: GameConfig) -> Self {
        Self::with_service(config, |service| service)
    }

    pub fn with_service<F>(config: GameConfig, customize: F) -> Self
    where
        F: FnOnce(GameService) -> GameService,
    {
        let config = Arc::new(config);
        let profiles: Arc<dyn ProfileStore> = Arc::new(InMemoryProfiles::new());
        let broadcaster = Arc::new(ChannelBroadcaster::new());
        let (scheduler, due) = PhaseScheduler::new();

        let games = customize(GameService::new(
            GameRegistry::new(),
            profiles.clone(),
            broadcaster.clone(),
            Arc::new(scheduler),
            config.clone(),
        ));
        // ドライバはランタイムが終わるまで動き続ける
        spawn_phase_driver(games.clone(), due);

        AppState {
            games,
            profiles,
            presence: Arc::new(PresenceTracker::new()),
            broadcaster,
            config,
        }
    }
}
