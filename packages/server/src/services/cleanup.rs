use std::time::Duration;
use tokio::task::JoinHandle;

use crate::services::game_service::GameService;

pub fn spawn_cleanup_job(service: GameService, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // 最初のtickは即座に発火するので読み捨てる
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = service.delete_inactive_games().await;
            if removed > 0 {
                log::info!("Cleanup removed {} inactive games", removed);
            }
        }
    })
}
