pub mod config;
pub mod identity;
pub mod test_setup;
pub mod websocket;
