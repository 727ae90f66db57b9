//! Room Directory: room id to the set of connections currently listening.
//!
//! Each room sits behind its own mutex, so joins and leaves on different rooms
//! never contend. Rooms are created on first join and collected once empty.

use std::{collections::BTreeSet, sync::Arc};

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{ConnectionId, RoomId};

#[derive(Debug, Default)]
pub(crate) struct RoomSlot {
    pub(crate) members: BTreeSet<ConnectionId>,
    /// Set once the slot is unlinked from the map; a retired slot is always empty
    pub(crate) retired: bool,
}

pub(crate) type RoomGuard = OwnedMutexGuard<RoomSlot>;

#[derive(Default)]
pub struct RoomDirectory {
    rooms: DashMap<RoomId, Arc<Mutex<RoomSlot>>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point-in-time copy of a room's members. Empty for unknown rooms.
    ///
    /// A reader that finds the room empty collects it after releasing the
    /// lock, since its guard may have kept the last leaver from doing so.
    pub async fn members(&self, room_id: &RoomId) -> BTreeSet<ConnectionId> {
        let snapshot = match self.lock_existing(room_id).await {
            Some(guard) => guard.members.clone(),
            None => return BTreeSet::new(),
        };
        if snapshot.is_empty() {
            self.collect_if_empty(room_id);
        }
        snapshot
    }

    /// Number of rooms with at least one member (empty rooms are collected)
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Lock a room, creating it if needed.
    pub(crate) async fn lock_or_create(&self, room_id: &RoomId) -> RoomGuard {
        loop {
            let slot = Arc::clone(self.rooms.entry(room_id.clone()).or_default().value());
            let guard = slot.lock_owned().await;
            if !guard.retired {
                return guard;
            }
            // collected between lookup and lock; the next lookup creates a fresh slot
        }
    }

    /// Lock a room only if it exists.
    pub(crate) async fn lock_existing(&self, room_id: &RoomId) -> Option<RoomGuard> {
        let slot = self.rooms.get(room_id).map(|entry| Arc::clone(entry.value()))?;
        let guard = slot.lock_owned().await;
        (!guard.retired).then_some(guard)
    }

    /// Unlink the room if it is empty and nobody holds its lock.
    ///
    /// Must not be called while holding any room guard.
    pub(crate) fn collect_if_empty(&self, room_id: &RoomId) -> bool {
        self.rooms
            .remove_if(room_id, |_, slot| match slot.try_lock() {
                Ok(mut guard) if guard.members.is_empty() => {
                    guard.retired = true;
                    true
                }
                _ => false,
            })
            .is_some()
    }
}
