//! Connection Registry: live connections and, per connection, its joined rooms.
//!
//! The registry is one of two indexes over the connection/room relation. It is
//! only mutated through [`RoomHub`](super::RoomHub), which keeps it in step with
//! the [`RoomDirectory`](super::RoomDirectory).

use std::{collections::BTreeSet, sync::Arc};

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::connection::ConnectionHandle;
use crate::domain::{ConnectionId, RoomId, Session, SessionPhase, UserId};

/// Registry entry for one connection
pub(crate) struct ConnectionSlot {
    pub(crate) user_id: UserId,
    pub(crate) handle: ConnectionHandle,
    pub(crate) session: Mutex<Session>,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ConnectionSlot>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, session: Session, handle: ConnectionHandle) -> ConnectionId {
        let id = session.id().clone();
        let slot = ConnectionSlot {
            user_id: session.user_id().clone(),
            handle,
            session: Mutex::new(session),
        };
        self.connections.insert(id.clone(), Arc::new(slot));
        id
    }

    /// The slot is cloned out so no map guard outlives this call.
    pub(crate) fn slot(&self, id: &ConnectionId) -> Option<Arc<ConnectionSlot>> {
        self.connections.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn remove(&self, id: &ConnectionId) -> Option<Arc<ConnectionSlot>> {
        self.connections.remove(id).map(|(_, slot)| slot)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// Rooms the connection has joined. Empty for unknown connections.
    pub async fn joined_rooms(&self, id: &ConnectionId) -> BTreeSet<RoomId> {
        match self.slot(id) {
            Some(slot) => slot.session.lock().await.rooms().clone(),
            None => BTreeSet::new(),
        }
    }

    /// Lifecycle phase; unknown connections report `Disconnected`.
    pub async fn phase(&self, id: &ConnectionId) -> SessionPhase {
        match self.slot(id) {
            Some(slot) => slot.session.lock().await.phase(),
            None => SessionPhase::Disconnected,
        }
    }

    /// Owning user of a connection
    pub fn user_of(&self, id: &ConnectionId) -> Option<UserId> {
        self.connections
            .get(id)
            .map(|entry| entry.value().user_id.clone())
    }

    /// All connections registered for a user, joined to any room or none
    pub fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .filter(|entry| &entry.value().user_id == user_id)
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.connections.len()
    }
}
