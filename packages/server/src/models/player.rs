use serde::{Deserialize, Serialize};

use super::role::Role;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub user_id: String,
    pub nickname: String,
    pub avatar_seed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub alive: bool,
}

impl Player {
    pub fn new(user_id: String, nickname: String, avatar_seed: String) -> Self {
        Self {
            user_id,
            nickname,
            avatar_seed,
            role: None,
            alive: true,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == Some(role)
    }

    pub fn is_alive_with(&self, role: Role) -> bool {
        self.alive && self.has_role(role)
    }
}
