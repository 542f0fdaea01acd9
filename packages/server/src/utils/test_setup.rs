use dotenvy::dotenv;
use std::sync::{Arc, Once};

use crate::engine::{flavor::FixedPicker, GameError};
use crate::models::config::GameConfig;
use crate::services::{
    broadcaster::RecordingSink,
    game_service::GameService,
    profile_service::{InMemoryProfiles, ProfileStore},
    registry::GameRegistry,
    scheduler::{spawn_phase_driver, PhaseScheduler},
};
use crate::state::AppState;

static INIT: Once = Once::new();

pub const TEST_SEED: u64 = 7;

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

pub struct TestHarness {
    pub service: GameService,
    pub profiles: Arc<InMemoryProfiles>,
    pub events: Arc<RecordingSink>,
}

impl TestHarness {
    pub fn new(config: GameConfig) -> Self {
        setup_test_env();
        let profiles = Arc::new(InMemoryProfiles::new());
        let events = Arc::new(RecordingSink::new());
        let (scheduler, due) = PhaseScheduler::new();
        let service = GameService::new(
            GameRegistry::new(),
            profiles.clone(),
            events.clone(),
            Arc::new(scheduler),
            Arc::new(config),
        )
        .with_picker(Arc::new(FixedPicker(0)))
        .with_seed(TEST_SEED);
        spawn_phase_driver(service.clone(), due);

        Self {
            service,
            profiles,
            events,
        }
    }

    pub fn user(&self, user_id: &str) -> String {
        // 空でないIDしか渡さないので失敗しない
        let _ = self.profiles.set_nickname(user_id, user_id, None);
        user_id.to_string()
    }

    pub async fn game_with(&self, host: &str, others: &[&str]) -> Result<String, GameError> {
        self.user(host);
        let game = self
            .service
            .create_game(host, &format!("{}'s table", host), None)
            .await?;
        for other in others {
            self.user(other);
            self.service.join_game(&game.id, other).await?;
        }
        Ok(game.id)
    }
}

pub fn test_app_state(config: GameConfig) -> AppState {
    setup_test_env();
    AppState::with_service(config, |service| {
        service
            .with_picker(Arc::new(FixedPicker(0)))
            .with_seed(TEST_SEED)
    })
}
