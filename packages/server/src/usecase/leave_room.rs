//! UseCase: ルーム退出処理（Joined(room) -> Connected）

use std::sync::Arc;

use crate::{
    domain::{ChatId, ConnectionId, Event, RoomId, Target},
    infrastructure::realtime::Broadcaster,
};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    broadcaster: Arc<Broadcaster>,
}

impl LeaveRoomUseCase {
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// ルーム退出を実行。参加していなければ何もしない（`false` を返す）。
    ///
    /// 退出した場合は残りのメンバーと退出した接続の両方に status を送る。
    pub async fn execute(&self, connection_id: &ConnectionId, chat_id: ChatId) -> bool {
        let room_id = RoomId::from(chat_id);
        let left = self.broadcaster.hub().leave(&room_id, connection_id).await;
        if !left {
            return false;
        }
        tracing::info!(connection_id = %connection_id, room_id = %room_id, "Left room");

        let status = Event::status(format!("User left room {}", room_id));
        self.broadcaster
            .broadcast(&status, &Target::Room(room_id))
            .await;
        self.broadcaster.send(connection_id, &status);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{SessionPhase, UserId},
        infrastructure::realtime::{ConnectionHandle, RoomHub},
    };

    #[tokio::test]
    async fn test_leave_notifies_room_and_leaver() {
        // テスト項目: 退出すると Connected に戻り、残りのメンバーと本人に status が届く
        // given (前提条件):
        let hub = Arc::new(RoomHub::new());
        let usecase = LeaveRoomUseCase::new(Arc::new(Broadcaster::new(Arc::clone(&hub))));
        let (h1, mut alice_rx) = ConnectionHandle::channel(8);
        let (h2, mut bob_rx) = ConnectionHandle::channel(8);
        let alice = hub.register(UserId::new("alice".to_string()).unwrap(), h1).unwrap();
        let bob = hub.register(UserId::new("bob".to_string()).unwrap(), h2).unwrap();
        let chat_id = ChatId::new("c1".to_string()).unwrap();
        hub.join(&RoomId::from(&chat_id), &alice).await.unwrap();
        hub.join(&RoomId::from(&chat_id), &bob).await.unwrap();

        // when (操作):
        let left = usecase.execute(&alice, chat_id.clone()).await;

        // then (期待する結果):
        assert!(left);
        assert_eq!(hub.phase(&alice).await, SessionPhase::Connected);
        let to_bob: serde_json::Value = serde_json::from_str(&bob_rx.recv().await.unwrap()).unwrap();
        assert_eq!(to_bob["payload"]["msg"], "User left room c1");
        let to_alice: serde_json::Value =
            serde_json::from_str(&alice_rx.recv().await.unwrap()).unwrap();
        assert_eq!(to_alice["payload"]["msg"], "User left room c1");
    }

    #[tokio::test]
    async fn test_leave_when_not_joined_is_noop() {
        // テスト項目: 参加していないルームからの退出は何もしない
        let hub = Arc::new(RoomHub::new());
        let usecase = LeaveRoomUseCase::new(Arc::new(Broadcaster::new(Arc::clone(&hub))));
        let (handle, mut rx) = ConnectionHandle::channel(8);
        let alice = hub.register(UserId::new("alice".to_string()).unwrap(), handle).unwrap();

        let left = usecase
            .execute(&alice, ChatId::new("c1".to_string()).unwrap())
            .await;

        assert!(!left);
        assert!(rx.try_recv().is_err());
    }
}
