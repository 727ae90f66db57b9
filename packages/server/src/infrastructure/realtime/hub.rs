//! RoomHub: the connection/room relation, kept as two synchronized indexes.
//!
//! Lock order is fixed: room locks (ascending `RoomId`) before the
//! connection's session lock. Map shard guards are never held across an
//! await. Under that order a membership is added or removed from both indexes
//! while the room lock is held, so `members(R)` and `joined_rooms(C)` never
//! disagree once the room lock is released.

use std::collections::BTreeSet;

use crate::domain::{
    ConnectionId, IdFactory, InvariantViolation, RoomId, Session, SessionError, SessionPhase,
    Timestamp, UserId,
};

use super::{connection::ConnectionHandle, directory::RoomDirectory, registry::ConnectionRegistry};

#[derive(Default)]
pub struct RoomHub {
    registry: ConnectionRegistry,
    directory: RoomDirectory,
}

impl RoomHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn directory(&self) -> &RoomDirectory {
        &self.directory
    }

    /// Complete a handshake: `Connecting -> Connected`, then register.
    pub fn register(
        &self,
        user_id: UserId,
        handle: ConnectionHandle,
    ) -> Result<ConnectionId, SessionError> {
        let mut session = Session::new(IdFactory::connection_id(), user_id);
        session.establish(Timestamp::now())?;
        let id = self.registry.insert(session, handle);
        tracing::debug!(connection_id = %id, "connection registered");
        Ok(id)
    }

    /// Remove a connection and every one of its room memberships.
    ///
    /// Unknown connections are a no-op. Returns the rooms that were left.
    pub async fn unregister(&self, connection_id: &ConnectionId) -> BTreeSet<RoomId> {
        let Some(slot) = self.registry.slot(connection_id) else {
            return BTreeSet::new();
        };

        // no join can succeed after this point; leaves still can
        let rooms = slot.session.lock().await.begin_close();

        let mut guards = Vec::with_capacity(rooms.len());
        for room_id in &rooms {
            if let Some(guard) = self.directory.lock_existing(room_id).await {
                guards.push((room_id, guard));
            }
        }

        let left = {
            let mut session = slot.session.lock().await;
            for (room_id, guard) in guards.iter_mut() {
                let removed = guard.members.remove(connection_id);
                debug_assert!(
                    removed == session.rooms().contains(*room_id),
                    "room {room_id} and connection {connection_id} disagree"
                );
            }
            let left = session.finish_close();
            self.registry.remove(connection_id);
            left
        };
        drop(guards);

        for room_id in &left {
            self.directory.collect_if_empty(room_id);
        }
        tracing::debug!(
            connection_id = %connection_id,
            rooms = left.len(),
            "connection unregistered"
        );
        left
    }

    /// Add a connection to a room. Idempotent; returns `true` if newly joined.
    ///
    /// No authorization happens here.
    pub async fn join(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
    ) -> Result<bool, SessionError> {
        let slot = self
            .registry
            .slot(connection_id)
            .ok_or_else(|| SessionError::ConnectionNotFound(connection_id.to_string()))?;

        let result = {
            let mut room = self.directory.lock_or_create(room_id).await;
            let mut session = slot.session.lock().await;
            session.join(room_id.clone()).map(|joined| {
                let inserted = room.members.insert(connection_id.clone());
                debug_assert_eq!(joined, inserted, "room {room_id} and connection disagree");
                joined
            })
        };

        if result.is_err() {
            // the room may have been created just for this attempt
            self.directory.collect_if_empty(room_id);
        }
        result
    }

    /// Remove a connection from a room. Idempotent; returns `true` if it was a member.
    pub async fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let Some(mut room) = self.directory.lock_existing(room_id).await else {
            return false;
        };
        let removed = room.members.remove(connection_id);
        if let Some(slot) = self.registry.slot(connection_id) {
            let left = slot.session.lock().await.leave(room_id);
            debug_assert_eq!(removed, left, "room {room_id} and connection disagree");
        }
        let now_empty = room.members.is_empty();
        drop(room);

        if now_empty {
            self.directory.collect_if_empty(room_id);
        }
        removed
    }

    pub async fn members(&self, room_id: &RoomId) -> BTreeSet<ConnectionId> {
        self.directory.members(room_id).await
    }

    pub async fn joined_rooms(&self, connection_id: &ConnectionId) -> BTreeSet<RoomId> {
        self.registry.joined_rooms(connection_id).await
    }

    pub async fn phase(&self, connection_id: &ConnectionId) -> SessionPhase {
        self.registry.phase(connection_id).await
    }

    pub fn connections_of(&self, user_id: &UserId) -> Vec<ConnectionId> {
        self.registry.connections_of(user_id)
    }

    /// Check that both indexes describe the same relation.
    ///
    /// Reads each room and connection separately, so the result is only
    /// meaningful when no joins or leaves are in flight.
    pub async fn verify_consistency(&self) -> Result<(), InvariantViolation> {
        for room_id in self.directory.room_ids() {
            for connection_id in self.directory.members(&room_id).await {
                if !self.registry.joined_rooms(&connection_id).await.contains(&room_id) {
                    return Err(InvariantViolation::MissingJoinedRoom {
                        room_id: room_id.to_string(),
                        connection_id: connection_id.to_string(),
                    });
                }
            }
        }
        for connection_id in self.registry.ids() {
            for room_id in self.registry.joined_rooms(&connection_id).await {
                if !self.directory.members(&room_id).await.contains(&connection_id) {
                    return Err(InvariantViolation::MissingRoomMember {
                        room_id: room_id.to_string(),
                        connection_id: connection_id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
