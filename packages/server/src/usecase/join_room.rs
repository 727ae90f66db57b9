//! UseCase: ルーム参加処理（Connected/Joined -> Joined(room)）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ルームのメンバーは「いま聞いている接続」のキャッシュであり、
//!   永続化された参加者リストとの突き合わせ（認可）を経てからしか追加してはならない
//! - 認可に失敗した場合、ディレクトリに一切の変更が残らないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者による参加と、ルームへの status 通知
//! - 異常系：参加者でないユーザーの参加（PermissionDenied）
//! - 異常系：未登録の接続からの参加
//! - 競合：認可チェックと参加の間に参加者から削除された場合

use std::sync::Arc;

use crate::{
    domain::{ChatId, ConnectionId, Event, ParticipantAuthorizer, RoomId, SessionError, Target},
    infrastructure::realtime::Broadcaster,
};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    authorizer: Arc<dyn ParticipantAuthorizer>,
    broadcaster: Arc<Broadcaster>,
}

impl JoinRoomUseCase {
    pub fn new(authorizer: Arc<dyn ParticipantAuthorizer>, broadcaster: Arc<Broadcaster>) -> Self {
        Self {
            authorizer,
            broadcaster,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 新たに参加した
    /// * `Ok(false)` - すでに参加済み（冪等）
    /// * `Err(SessionError::PermissionDenied)` - チャットの参加者ではない
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        chat_id: ChatId,
    ) -> Result<bool, SessionError> {
        let hub = self.broadcaster.hub();
        let user_id = hub
            .registry()
            .user_of(connection_id)
            .ok_or_else(|| SessionError::ConnectionNotFound(connection_id.to_string()))?;

        if !self.authorizer.is_participant(&user_id, &chat_id).await {
            tracing::warn!(
                user_id = %user_id,
                chat_id = %chat_id,
                "Join rejected: not a participant"
            );
            return Err(SessionError::PermissionDenied {
                user_id: user_id.into_string(),
                chat_id: chat_id.into_string(),
            });
        }

        let room_id = RoomId::from(&chat_id);
        let joined = hub.join(&room_id, connection_id).await?;

        // 参加中に参加者から外された場合、強制退出がこの join より先に
        // 走っている可能性があるため、参加後にもう一度確認する
        if !self.authorizer.is_participant(&user_id, &chat_id).await {
            hub.leave(&room_id, connection_id).await;
            tracing::warn!(
                user_id = %user_id,
                chat_id = %chat_id,
                "Join revoked: removed from chat while joining"
            );
            return Err(SessionError::PermissionDenied {
                user_id: user_id.into_string(),
                chat_id: chat_id.into_string(),
            });
        }
        tracing::info!(
            connection_id = %connection_id,
            room_id = %room_id,
            newly_joined = joined,
            "Joined room"
        );

        let status = Event::status(format!("User joined room {}", room_id));
        self.broadcaster
            .broadcast(&status, &Target::Room(room_id))
            .await;
        Ok(joined)
    }
}
