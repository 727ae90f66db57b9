//! Server state shared by every handler.

use std::sync::Arc;

use serde::Deserialize;

use crate::{
    domain::{ChatStore, ParticipantAuthorizer},
    infrastructure::{
        realtime::{Broadcaster, RoomHub},
        repository::StoreParticipantAuthorizer,
    },
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub user_id: String,
}

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub store: Arc<dyn ChatStore>,
    pub authorizer: Arc<dyn ParticipantAuthorizer>,
    /// Connection registry and room directory
    pub hub: Arc<RoomHub>,
    pub broadcaster: Arc<Broadcaster>,
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
}

impl AppState {
    /// Wire the realtime core around a store. Authorization reads the same store.
    pub fn new(store: Arc<dyn ChatStore>, outbound_buffer: usize) -> Self {
        let hub = Arc::new(RoomHub::new());
        Self {
            authorizer: Arc::new(StoreParticipantAuthorizer::new(Arc::clone(&store))),
            broadcaster: Arc::new(Broadcaster::new(Arc::clone(&hub))),
            store,
            hub,
            outbound_buffer,
        }
    }
}
