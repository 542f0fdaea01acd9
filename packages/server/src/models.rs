pub mod comment;
pub mod config;
pub mod game;
pub mod log;
pub mod player;
pub mod role;
