//! UseCase: 接続確立処理（Connecting -> Connected）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::ensure_user() / execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 未登録ユーザーの接続を WebSocket アップグレード前に拒否するため
//! - 同一ユーザーの複数接続（複数タブ・端末）を許可することを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済みユーザーの接続
//! - 異常系：存在しないユーザー ID での接続試行
//! - エッジケース：同一ユーザーの 2 本目の接続

use std::sync::Arc;

use crate::{
    domain::{ChatStore, ConnectionId, User, UserId},
    infrastructure::realtime::{ConnectionHandle, RoomHub},
};

use super::error::ConnectError;

/// 接続確立のユースケース
pub struct ConnectSessionUseCase {
    store: Arc<dyn ChatStore>,
    hub: Arc<RoomHub>,
}

impl ConnectSessionUseCase {
    pub fn new(store: Arc<dyn ChatStore>, hub: Arc<RoomHub>) -> Self {
        Self { store, hub }
    }

    /// ハンドシェイク前の本人確認（ユーザーが存在するか）
    pub async fn ensure_user(&self, user_id: &UserId) -> Result<User, ConnectError> {
        self.store
            .find_user(user_id)
            .await
            .map_err(|_| ConnectError::UnknownUser(user_id.to_string()))
    }

    /// 接続を登録し、Connected 状態にする
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 登録された接続の ID
    /// * `Err(ConnectError)` - ユーザーが存在しない場合など
    pub async fn execute(
        &self,
        user_id: UserId,
        handle: ConnectionHandle,
    ) -> Result<ConnectionId, ConnectError> {
        self.ensure_user(&user_id).await?;
        let connection_id = self.hub.register(user_id.clone(), handle)?;
        tracing::info!(
            user_id = %user_id,
            connection_id = %connection_id,
            "Session connected"
        );
        Ok(connection_id)
    }
}
