//! Mutation-broadcast orchestrator.
//!
//! Callers commit a mutation, then call [`Broadcaster::broadcast`] from the
//! same task, in mutation order. The broadcaster never reorders, batches or
//! retries; each connection's FIFO queue carries that order to the client.
//! Delivery is at-most-once: a gone or saturated connection loses the event,
//! and the loss never reaches the caller as an error.

use std::{
    collections::BTreeSet,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use super::{
    connection::{Delivery, DropReason, OutboundFrame},
    hub::RoomHub,
};
use crate::{
    domain::{ConnectionId, Event, RoomId, Target},
    infrastructure::dto::websocket::encode_event_frame,
};

/// Per-call delivery counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub dropped: usize,
}

impl DeliveryReport {
    fn record(&mut self, delivery: Delivery) {
        match delivery {
            Delivery::Delivered => self.delivered += 1,
            Delivery::Dropped(_) => self.dropped += 1,
        }
    }
}

pub struct Broadcaster {
    hub: Arc<RoomHub>,
    dropped_total: AtomicU64,
}

impl Broadcaster {
    pub fn new(hub: Arc<RoomHub>) -> Self {
        Self {
            hub,
            dropped_total: AtomicU64::new(0),
        }
    }

    pub fn hub(&self) -> &Arc<RoomHub> {
        &self.hub
    }

    /// Deliveries dropped since start-up
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total.load(Ordering::Relaxed)
    }

    /// Deliver an event to its target.
    ///
    /// `ParticipantRemoved` also forces every targeted connection out of the
    /// chat's room before the event is sent, so later room broadcasts skip it.
    pub async fn broadcast(&self, event: &Event, target: &Target) -> DeliveryReport {
        let (channel, recipients) = match target {
            Target::Room(room_id) => (Some(room_id), self.hub.members(room_id).await),
            Target::Users(user_ids) => {
                let recipients: BTreeSet<ConnectionId> = user_ids
                    .iter()
                    .flat_map(|user_id| self.hub.connections_of(user_id))
                    .collect();
                (None, recipients)
            }
        };

        if let Event::ParticipantRemoved { chat_id } = event {
            let room_id = RoomId::from(chat_id);
            for connection_id in &recipients {
                if self.hub.leave(&room_id, connection_id).await {
                    tracing::info!(
                        connection_id = %connection_id,
                        room_id = %room_id,
                        "forced leave after participant removal"
                    );
                }
            }
        }

        let report = self.deliver(event, channel, &recipients);
        tracing::debug!(
            event = event.name(),
            delivered = report.delivered,
            dropped = report.dropped,
            "broadcast"
        );
        report
    }

    /// Deliver an event to an explicit set of connections, such as a room
    /// snapshot taken earlier.
    pub fn deliver<'a>(
        &self,
        event: &Event,
        channel: Option<&RoomId>,
        recipients: impl IntoIterator<Item = &'a ConnectionId>,
    ) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let frame = match encode_event_frame(event, channel) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode '{}' event: {}", event.name(), e);
                return report;
            }
        };
        for connection_id in recipients {
            report.record(self.send_frame(connection_id, Arc::clone(&frame)));
        }
        report
    }

    /// Send one event to one connection, outside any room.
    pub fn send(&self, connection_id: &ConnectionId, event: &Event) -> Delivery {
        match encode_event_frame(event, None) {
            Ok(frame) => self.send_frame(connection_id, frame),
            Err(e) => {
                tracing::error!("Failed to encode '{}' event: {}", event.name(), e);
                Delivery::Dropped(DropReason::Gone)
            }
        }
    }

    fn send_frame(&self, connection_id: &ConnectionId, frame: OutboundFrame) -> Delivery {
        let delivery = match self.hub.registry().slot(connection_id) {
            Some(slot) => slot.handle.send(frame),
            None => Delivery::Dropped(DropReason::Gone),
        };
        match delivery {
            Delivery::Delivered => {}
            Delivery::Dropped(DropReason::Gone) => {
                self.dropped_total.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(connection_id = %connection_id, "dropped event for gone connection");
            }
            Delivery::Dropped(DropReason::Saturated) => {
                self.dropped_total.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(connection_id = %connection_id, "dropped event for saturated connection");
            }
        }
        delivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatId, Message, MessageContent, SessionPhase, Timestamp, UserId},
        infrastructure::realtime::ConnectionHandle,
    };
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - ルーム宛てのイベントがルームのメンバーにだけ届くこと
    // - 同じルームへの連続したブロードキャストが順序通りに届くこと
    // - 切断済み・満杯の接続への配信は破棄され、他のメンバーには届くこと
    // - ParticipantRemoved が対象ユーザーの接続をルームから強制的に外すこと
    // ========================================

    struct Client {
        id: ConnectionId,
        rx: mpsc::Receiver<OutboundFrame>,
    }

    impl Client {
        fn next_json(&mut self) -> Option<serde_json::Value> {
            self.rx
                .try_recv()
                .ok()
                .map(|frame| serde_json::from_str(&frame).unwrap())
        }
    }

    fn setup() -> (Arc<RoomHub>, Broadcaster) {
        let hub = Arc::new(RoomHub::new());
        let broadcaster = Broadcaster::new(Arc::clone(&hub));
        (hub, broadcaster)
    }

    fn connect(hub: &RoomHub, user: &str, capacity: usize) -> Client {
        let (handle, rx) = ConnectionHandle::channel(capacity);
        let id = hub
            .register(UserId::new(user.to_string()).unwrap(), handle)
            .unwrap();
        Client { id, rx }
    }

    fn chat(id: &str) -> ChatId {
        ChatId::new(id.to_string()).unwrap()
    }

    fn message_in(chat_id: &str, content: &str) -> Message {
        Message::new(
            chat(chat_id),
            UserId::new("alice".to_string()).unwrap(),
            MessageContent::new(content.to_string()).unwrap(),
            Timestamp::now(),
        )
    }

    #[tokio::test]
    async fn test_room_broadcast_reaches_members_only() {
        // テスト項目: c1 のメッセージは A と B に届き、未参加の C には届かない
        // given (前提条件):
        let (hub, broadcaster) = setup();
        let mut a = connect(&hub, "alice", 8);
        let mut b = connect(&hub, "bob", 8);
        let mut c = connect(&hub, "carol", 8);
        hub.join(&RoomId::from(chat("c1")), &a.id).await.unwrap();
        hub.join(&RoomId::from(chat("c1")), &b.id).await.unwrap();

        // when (操作):
        let message = message_in("c1", "Hello!");
        let report = broadcaster
            .broadcast(&Event::MessageCreated(message.clone()), &Target::room(&chat("c1")))
            .await;

        // then (期待する結果):
        assert_eq!(report, DeliveryReport { delivered: 2, dropped: 0 });
        for client in [&mut a, &mut b] {
            let frame = client.next_json().unwrap();
            assert_eq!(frame["type"], "new_message");
            assert_eq!(frame["channel"], "c1");
            assert_eq!(frame["payload"]["id"], message.id.as_str());
        }
        assert!(c.next_json().is_none());
    }

    #[tokio::test]
    async fn test_room_broadcasts_keep_their_order() {
        // テスト項目: O1 → O2 の順のブロードキャストは全メンバーに O1 → O2 の順で届く
        // given (前提条件):
        let (hub, broadcaster) = setup();
        let mut a = connect(&hub, "alice", 64);
        let mut b = connect(&hub, "bob", 64);
        let room = Target::room(&chat("c1"));
        hub.join(&RoomId::from(chat("c1")), &a.id).await.unwrap();
        hub.join(&RoomId::from(chat("c1")), &b.id).await.unwrap();

        // when (操作):
        let sent: Vec<Message> = (0..20).map(|i| message_in("c1", &format!("m{i}"))).collect();
        for message in &sent {
            broadcaster
                .broadcast(&Event::MessageCreated(message.clone()), &room)
                .await;
        }

        // then (期待する結果):
        for client in [&mut a, &mut b] {
            for message in &sent {
                let frame = client.next_json().unwrap();
                assert_eq!(frame["payload"]["id"], message.id.as_str());
            }
        }
    }

    #[tokio::test]
    async fn test_disconnect_after_snapshot_is_dropped_silently() {
        // テスト項目: スナップショット後・送信前に切断した接続は dropped となり、他は受信する
        // given (前提条件):
        let (hub, broadcaster) = setup();
        let mut a = connect(&hub, "alice", 8);
        let b = connect(&hub, "bob", 8);
        let room_id = RoomId::from(chat("c1"));
        hub.join(&room_id, &a.id).await.unwrap();
        hub.join(&room_id, &b.id).await.unwrap();
        let snapshot = hub.members(&room_id).await;

        // when (操作): B が切断してから配信
        hub.unregister(&b.id).await;
        let report = broadcaster.deliver(&Event::status("late"), Some(&room_id), &snapshot);

        // then (期待する結果):
        assert_eq!(report, DeliveryReport { delivered: 1, dropped: 1 });
        assert_eq!(a.next_json().unwrap()["payload"]["msg"], "late");
        assert_eq!(broadcaster.dropped_total(), 1);
    }

    #[tokio::test]
    async fn test_saturated_connection_does_not_block_room() {
        // テスト項目: 満杯の接続は破棄され、他のメンバーへの配信は止まらない
        // given (前提条件):
        let (hub, broadcaster) = setup();
        let slow = connect(&hub, "slow", 1);
        let mut fast = connect(&hub, "fast", 8);
        let room = Target::room(&chat("c1"));
        hub.join(&RoomId::from(chat("c1")), &slow.id).await.unwrap();
        hub.join(&RoomId::from(chat("c1")), &fast.id).await.unwrap();

        // when (操作):
        broadcaster.broadcast(&Event::status("one"), &room).await;
        let report = broadcaster.broadcast(&Event::status("two"), &room).await;

        // then (期待する結果):
        assert_eq!(report, DeliveryReport { delivered: 1, dropped: 1 });
        assert_eq!(fast.next_json().unwrap()["payload"]["msg"], "one");
        assert_eq!(fast.next_json().unwrap()["payload"]["msg"], "two");
    }

    #[tokio::test]
    async fn test_user_target_reaches_connections_outside_rooms() {
        // テスト項目: ユーザー宛てのイベントは未参加の接続を含む全ての接続に届く
        // given (前提条件):
        let (hub, broadcaster) = setup();
        let mut tab1 = connect(&hub, "bob", 8);
        let mut tab2 = connect(&hub, "bob", 8);
        let mut other = connect(&hub, "carol", 8);

        // when (操作):
        let report = broadcaster
            .broadcast(
                &Event::status("welcome"),
                &Target::user(UserId::new("bob".to_string()).unwrap()),
            )
            .await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert!(tab1.next_json().unwrap().get("channel").is_none());
        assert!(tab2.next_json().is_some());
        assert!(other.next_json().is_none());
    }

    #[tokio::test]
    async fn test_participant_removed_forces_leave() {
        // テスト項目: ParticipantRemoved で P の接続が c2 から外れ、以降の c2 宛てが届かない
        // given (前提条件):
        let (hub, broadcaster) = setup();
        let mut owner = connect(&hub, "owner", 8);
        let mut p = connect(&hub, "p", 8);
        let room_id = RoomId::from(chat("c2"));
        hub.join(&room_id, &owner.id).await.unwrap();
        hub.join(&room_id, &p.id).await.unwrap();

        // when (操作):
        broadcaster
            .broadcast(
                &Event::ParticipantRemoved { chat_id: chat("c2") },
                &Target::user(UserId::new("p".to_string()).unwrap()),
            )
            .await;
        broadcaster
            .broadcast(&Event::status("after"), &Target::Room(room_id.clone()))
            .await;

        // then (期待する結果):
        let removed = p.next_json().unwrap();
        assert_eq!(removed["type"], "chat_removed");
        assert_eq!(removed["payload"]["chat_id"], "c2");
        assert!(p.next_json().is_none());
        assert_eq!(hub.phase(&p.id).await, SessionPhase::Connected);
        assert!(!hub.members(&room_id).await.contains(&p.id));
        assert_eq!(owner.next_json().unwrap()["payload"]["msg"], "after");
        hub.verify_consistency().await.unwrap();
    }
}
