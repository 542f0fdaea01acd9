use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;

use crate::models::{comment::Comment, game::Game, log::GameLog};

const CHANNEL_CAPACITY: usize = 1000;

/// Everything observers are told about. `GameUpdated` carries a snapshot
/// without logs and comments; those travel as their own events.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum GameEvent {
    #[serde(rename = "game:created")]
    GameCreated(Game),
    #[serde(rename = "game:updated")]
    GameUpdated(Game),
    #[serde(rename = "game:log", rename_all = "camelCase")]
    GameLog { game_id: String, log: GameLog },
    #[serde(rename = "game:comment", rename_all = "camelCase")]
    GameComment { game_id: String, comment: Comment },
    #[serde(rename = "game:ended", rename_all = "camelCase")]
    GameEnded { game_id: String },
    #[serde(rename = "game:cancelled", rename_all = "camelCase")]
    GameCancelled { game_id: String },
}

impl GameEvent {
    pub fn game_id(&self) -> &str {
        match self {
            GameEvent::GameCreated(game) | GameEvent::GameUpdated(game) => &game.id,
            GameEvent::GameLog { game_id, .. }
            | GameEvent::GameComment { game_id, .. }
            | GameEvent::GameEnded { game_id }
            | GameEvent::GameCancelled { game_id } => game_id,
        }
    }

    pub fn is_lobby_event(&self) -> bool {
        matches!(
            self,
            GameEvent::GameCreated(_) | GameEvent::GameEnded { .. } | GameEvent::GameCancelled { .. }
        )
    }

    pub fn updated(game: &Game) -> Self {
        let mut game = game.clone();
        game.logs.clear();
        game.comments.clear();
        GameEvent::GameUpdated(game)
    }
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: GameEvent);

    fn forget(&self, _game_id: &str) {}
}

pub struct ChannelBroadcaster {
    games: Mutex<HashMap<String, broadcast::Sender<GameEvent>>>,
    lobby: broadcast::Sender<GameEvent>,
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        let (lobby, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            games: Mutex::new(HashMap::new()),
            lobby,
        }
    }
}

impl ChannelBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    fn game_channel(&self, game_id: &str) -> broadcast::Sender<GameEvent> {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        games
            .entry(game_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    pub fn subscribe(&self, game_id: &str) -> broadcast::Receiver<GameEvent> {
        self.game_channel(game_id).subscribe()
    }

    pub fn subscribe_lobby(&self) -> broadcast::Receiver<GameEvent> {
        self.lobby.subscribe()
    }

    /// Drops the game's channel once its last subscriber is gone.
    pub fn release(&self, game_id: &str) {
        let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
        if games
            .get(game_id)
            .map_or(false, |sender| sender.receiver_count() == 0)
        {
            games.remove(game_id);
        }
    }

    pub fn channel_count(&self) -> usize {
        self.games.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl EventSink for ChannelBroadcaster {
    fn publish(&self, event: GameEvent) {
        if event.is_lobby_event() {
            // 誰も購読していなければ送信エラーになるが問題ない
            let _ = self.lobby.send(event.clone());
        }
        let sender = self
            .games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event.game_id())
            .cloned();
        if let Some(sender) = sender {
            let _ = sender.send(event);
        }
    }

    fn forget(&self, game_id: &str) {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(game_id);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: GameEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
