use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::models::game::GamePhase;
use crate::services::game_service::GameService;

/// A phase deadline that elapsed. It names the phase it was armed for, so a
/// tick that lost a race with another transition is recognisably stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTick {
    pub game_id: String,
    pub phase: GamePhase,
    pub day_number: u32,
}

pub struct PhaseScheduler {
    timers: Mutex<HashMap<String, JoinHandle<()>>>,
    due: mpsc::UnboundedSender<PhaseTick>,
}

impl PhaseScheduler {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PhaseTick>) {
        let (due, rx) = mpsc::unbounded_channel();
        (
            Self {
                timers: Mutex::new(HashMap::new()),
                due,
            },
            rx,
        )
    }

    /// Replaces any pending deadline of the game. Must run inside a tokio
    /// runtime.
    pub fn arm(&self, tick: PhaseTick, after: Duration) {
        let game_id = tick.game_id.clone();
        let due = self.due.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if due.send(tick).is_err() {
                log::warn!("Phase driver is gone; dropping deadline");
            }
        });

        let previous = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(game_id, handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self, game_id: &str) {
        let handle = self
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(game_id);
        if let Some(handle) = handle {
            handle.abort();
            log::debug!("Phase timer cancelled for game {}", game_id);
        }
    }

    pub fn is_armed(&self, game_id: &str) -> bool {
        self.timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(game_id)
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for PhaseScheduler {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }
}

pub fn spawn_phase_driver(
    service: GameService,
    mut due: mpsc::UnboundedReceiver<PhaseTick>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(tick) = due.recv().await {
            let service = service.clone();
            tokio::spawn(async move {
                let game_id = tick.game_id.clone();
                match service.on_phase_due(tick).await {
                    Ok(Some(outcome)) if outcome.finished() => {
                        log::debug!("Game {} reached a win condition", game_id)
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Phase deadline for game {} ignored: {}", game_id, e),
                }
            });
        }
        log::debug!("Phase driver stopped");
    })
}
