use std::cmp::Ordering;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

use crate::models::game::{Game, GameStatus};

pub type SharedGame = Arc<Mutex<Game>>;

/// Owns every game by id. The map lock is only held to look games up or
/// add/remove them; a game's own mutex serializes everything done to it.
/// Lock order is always map first, then game.
#[derive(Clone, Default)]
pub struct GameRegistry {
    games: Arc<RwLock<HashMap<String, SharedGame>>>,
}

pub fn compare_games(a: &Game, b: &Game) -> Ordering {
    a.status
        .priority()
        .cmp(&b.status.priority())
        .then_with(|| b.created_at.cmp(&a.created_at))
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, game: Game) -> SharedGame {
        let id = game.id.clone();
        let shared = Arc::new(Mutex::new(game));
        self.games.write().await.insert(id, shared.clone());
        shared
    }

    /// Inserts `game` unless its host already runs a waiting or in-progress
    /// game; in that case the existing game is returned instead.
    pub async fn insert_unless_hosting(&self, game: Game) -> Result<SharedGame, Game> {
        let mut games = self.games.write().await;
        for existing in games.values() {
            let existing = existing.lock().await;
            if existing.host_id == game.host_id && existing.status.is_active() {
                return Err(existing.clone());
            }
        }
        let id = game.id.clone();
        let shared = Arc::new(Mutex::new(game));
        games.insert(id, shared.clone());
        Ok(shared)
    }

    pub async fn get(&self, game_id: &str) -> Option<SharedGame> {
        self.games.read().await.get(game_id).cloned()
    }

    pub async fn snapshot(&self, game_id: &str) -> Option<Game> {
        let shared = self.get(game_id).await?;
        let game = shared.lock().await;
        Some(game.clone())
    }

    async fn all_handles(&self) -> Vec<SharedGame> {
        self.games.read().await.values().cloned().collect()
    }

    pub async fn list_where<F>(&self, filter: F) -> Vec<Game>
    where
        F: Fn(&Game) -> bool,
    {
        let mut out = Vec::new();
        for shared in self.all_handles().await {
            let game = shared.lock().await;
            if filter(&game) {
                out.push(game.clone());
            }
        }
        out.sort_by(compare_games);
        out
    }

    pub async fn list_all(&self) -> Vec<Game> {
        self.list_where(|_| true).await
    }

    pub async fn list_by_status(&self, status: GameStatus) -> Vec<Game> {
        self.list_where(|g| g.status == status).await
    }

    pub async fn remove(&self, game_id: &str) -> bool {
        self.games.write().await.remove(game_id).is_some()
    }

    pub async fn remove_inactive(&self) -> Vec<String> {
        let mut games = self.games.write().await;
        let mut removed = Vec::new();
        for (id, shared) in games.iter() {
            if shared.lock().await.status.is_terminal() {
                removed.push(id.clone());
            }
        }
        for id in &removed {
            games.remove(id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
