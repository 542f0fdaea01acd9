use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{player::Player, role::Role};

/// Chat message scoped to a game. `alive` and `role` are copied from the
/// sender when the comment is written and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub game_id: String,
    pub user_id: String,
    pub nickname: String,
    pub avatar_seed: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Comment {
    pub fn from_player(game_id: &str, sender: &Player, message: String) -> Self {
        Comment {
            id: uuid::Uuid::new_v4().to_string(),
            game_id: game_id.to_string(),
            user_id: sender.user_id.clone(),
            nickname: sender.nickname.clone(),
            avatar_seed: sender.avatar_seed.clone(),
            message,
            timestamp: Utc::now(),
            alive: sender.alive,
            role: sender.role,
        }
    }
}
