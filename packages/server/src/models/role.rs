use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mafia,
    Doctor,
    Villager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Mafia => write!(f, "mafia"),
            Role::Doctor => write!(f, "doctor"),
            Role::Villager => write!(f, "villager"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDistribution {
    pub mafia_count: usize,
    pub doctor_count: usize,
    pub villager_count: usize,
}

impl RoleDistribution {
    /// Two mafia from seven players up, one below. A single doctor; the
    /// remainder are villagers (possibly none in very small games). Counts
    /// are clamped so they always sum to `player_count`.
    pub fn for_player_count(player_count: usize) -> Self {
        let (mafia, doctor) = if player_count >= 7 { (2, 1) } else { (1, 1) };
        let mafia_count = mafia.min(player_count);
        let doctor_count = doctor.min(player_count - mafia_count);
        Self {
            mafia_count,
            doctor_count,
            villager_count: player_count - mafia_count - doctor_count,
        }
    }

    pub fn total(&self) -> usize {
        self.mafia_count + self.doctor_count + self.villager_count
    }
}
