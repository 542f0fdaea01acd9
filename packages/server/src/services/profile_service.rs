use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::engine::GameError;

pub const UNKNOWN_NICKNAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub nickname: String,
    pub avatar_seed: String,
}

impl Profile {
    pub fn unknown() -> Self {
        Self {
            nickname: UNKNOWN_NICKNAME.to_string(),
            avatar_seed: UNKNOWN_NICKNAME.to_string(),
        }
    }
}

/// Display labels per user id. Games copy these into player records at join
/// time, so later changes only affect new joins and the lobby's host labels.
pub trait ProfileStore: Send + Sync {
    fn profile(&self, user_id: &str) -> Option<Profile>;

    fn set_nickname(
        &self,
        user_id: &str,
        nickname: &str,
        avatar_seed: Option<&str>,
    ) -> Result<Profile, GameError>;

    fn set_avatar_seed(&self, user_id: &str, avatar_seed: &str) -> Result<Profile, GameError>;

    fn nickname(&self, user_id: &str) -> Option<String> {
        self.profile(user_id).map(|p| p.nickname)
    }

    fn avatar_seed(&self, user_id: &str) -> Option<String> {
        self.profile(user_id).map(|p| p.avatar_seed)
    }

    fn profile_or_unknown(&self, user_id: &str) -> Profile {
        self.profile(user_id).unwrap_or_else(Profile::unknown)
    }
}

#[derive(Default)]
pub struct InMemoryProfiles {
    profiles: RwLock<HashMap<String, Profile>>,
}

impl InMemoryProfiles {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for InMemoryProfiles {
    fn profile(&self, user_id: &str) -> Option<Profile> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
    }

    fn set_nickname(
        &self,
        user_id: &str,
        nickname: &str,
        avatar_seed: Option<&str>,
    ) -> Result<Profile, GameError> {
        let nickname = nickname.trim();
        if nickname.is_empty() {
            return Err(GameError::InvalidArgument(
                "Nickname is required and must be a non-empty string".to_string(),
            ));
        }

        let avatar_seed = avatar_seed
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(nickname);
        let profile = Profile {
            nickname: nickname.to_string(),
            avatar_seed: avatar_seed.to_string(),
        };

        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.to_string(), profile.clone());
        log::debug!("Nickname set for {}: {}", user_id, profile.nickname);
        Ok(profile)
    }

    fn set_avatar_seed(&self, user_id: &str, avatar_seed: &str) -> Result<Profile, GameError> {
        let avatar_seed = avatar_seed.trim();
        if avatar_seed.is_empty() {
            return Err(GameError::InvalidArgument(
                "Avatar seed must be a non-empty string".to_string(),
            ));
        }
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        let profile = profiles.get_mut(user_id).ok_or_else(|| {
            GameError::InvalidState("Set a nickname before choosing an avatar".to_string())
        })?;
        profile.avatar_seed = avatar_seed.to_string();
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_is_trimmed_and_seeds_avatar() {
        let store = InMemoryProfiles::new();
        let profile = store.set_nickname("u1", "  Alice ", None).unwrap();
        assert_eq!(profile.nickname, "Alice");
        assert_eq!(profile.avatar_seed, "Alice");
        assert_eq!(store.nickname("u1").as_deref(), Some("Alice"));
    }

    #[test]
    fn explicit_avatar_seed_is_kept() {
        let store = InMemoryProfiles::new();
        store.set_nickname("u1", "Alice", Some("fox")).unwrap();
        assert_eq!(store.avatar_seed("u1").as_deref(), Some("fox"));
    }

    #[test]
    fn blank_nickname_is_rejected() {
        let store = InMemoryProfiles::new();
        let err = store.set_nickname("u1", "   ", None).unwrap_err();
        assert!(matches!(err, GameError::InvalidArgument(_)));
        assert!(store.profile("u1").is_none());
    }

    #[test]
    fn avatar_needs_a_nickname_first() {
        let store = InMemoryProfiles::new();
        assert!(store.set_avatar_seed("u1", "fox").is_err());

        store.set_nickname("u1", "Alice", None).unwrap();
        let profile = store.set_avatar_seed("u1", " fox ").unwrap();
        assert_eq!(profile.nickname, "Alice");
        assert_eq!(profile.avatar_seed, "fox");

        let err = store.set_avatar_seed("u1", "  ").unwrap_err();
        assert!(matches!(err, GameError::InvalidArgument(_)));
    }

    #[test]
    fn unknown_users_get_placeholder() {
        let store = InMemoryProfiles::new();
        assert_eq!(store.profile_or_unknown("ghost"), Profile::unknown());
    }
}
