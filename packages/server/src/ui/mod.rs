//! HTTP and WebSocket surface of the chat server.

pub mod error;
pub mod extract;
pub mod handler;
pub mod router;
pub mod state; // runner とテストから AppState を組み立てるため public

pub use router::build_router;
pub use state::AppState;
