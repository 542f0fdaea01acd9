pub mod broadcaster;
pub mod cleanup;
pub mod game_service;
pub mod presence;
pub mod profile_service;
pub mod registry;
pub mod scheduler;
