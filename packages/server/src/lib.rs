//! roomcast chat server library.
//!
//! Persistent users, chats and messages, with room-based live broadcast over
//! WebSocket. A mutation is committed to the store first, then pushed to the
//! connections currently listening to the chat's room.

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod runner;
pub mod signal;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use runner::run as run_server;
