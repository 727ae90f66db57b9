//! UseCase: 切断処理（* -> Disconnected）
//!
//! トランスポートが閉じたら、参加中の全ルームから一括で取り除く。
//! 他の参加者への通知は行わない（ルームのメンバーが減るだけ）。

use std::{collections::BTreeSet, sync::Arc};

use crate::{
    domain::{ConnectionId, RoomId},
    infrastructure::realtime::RoomHub,
};

/// 切断のユースケース
pub struct DisconnectSessionUseCase {
    hub: Arc<RoomHub>,
}

impl DisconnectSessionUseCase {
    pub fn new(hub: Arc<RoomHub>) -> Self {
        Self { hub }
    }

    /// 切断を実行し、退出したルームを返す。未登録の接続は何もしない。
    pub async fn execute(&self, connection_id: &ConnectionId) -> BTreeSet<RoomId> {
        let left = self.hub.unregister(connection_id).await;
        tracing::info!(
            connection_id = %connection_id,
            rooms_left = left.len(),
            "Session disconnected"
        );
        left
    }

    /// 残りの接続数を取得
    pub fn count_remaining_connections(&self) -> usize {
        self.hub.registry().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ChatId, SessionPhase, UserId},
        infrastructure::realtime::ConnectionHandle,
    };

    #[tokio::test]
    async fn test_disconnect_leaves_all_rooms() {
        // テスト項目: 切断で全ルームから取り除かれ、Disconnected になる
        // given (前提条件):
        let hub = Arc::new(RoomHub::new());
        let usecase = DisconnectSessionUseCase::new(Arc::clone(&hub));
        let (handle, _rx) = ConnectionHandle::channel(8);
        let alice = hub
            .register(UserId::new("alice".to_string()).unwrap(), handle)
            .unwrap();
        for id in ["c1", "c2"] {
            let room_id = RoomId::from(ChatId::new(id.to_string()).unwrap());
            hub.join(&room_id, &alice).await.unwrap();
        }

        // when (操作):
        let left = usecase.execute(&alice).await;

        // then (期待する結果):
        assert_eq!(left.len(), 2);
        assert_eq!(hub.phase(&alice).await, SessionPhase::Disconnected);
        assert_eq!(usecase.count_remaining_connections(), 0);
        assert_eq!(hub.directory().room_count(), 0);
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_noop() {
        // テスト項目: 二重の切断はエラーにならない
        let hub = Arc::new(RoomHub::new());
        let usecase = DisconnectSessionUseCase::new(Arc::clone(&hub));
        let (handle, _rx) = ConnectionHandle::channel(8);
        let alice = hub
            .register(UserId::new("alice".to_string()).unwrap(), handle)
            .unwrap();

        usecase.execute(&alice).await;
        let second = usecase.execute(&alice).await;

        assert!(second.is_empty());
    }
}
