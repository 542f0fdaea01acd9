//! The synchronous game state machine. Nothing in here touches locks,
//! timers or the network: callers own a `&mut Game` and get back the log
//! records each step produced.

pub mod error;
pub mod flavor;
pub mod ledger;
pub mod lifecycle;
pub mod phase;
pub mod resolver;
pub mod roles;
pub mod visibility;
pub mod win;

pub use error::GameError;
