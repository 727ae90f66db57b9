//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - コミット（メッセージ保存・最終アクティビティ更新）の後にルームへ配信されること
//!
//! ### なぜこのテストが必要か
//! - 配信対象は「チャットのルームに参加中の接続」だけであることを保証
//! - 保存に失敗した場合は何も配信されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム参加中の 2 接続への配信、未参加の接続には届かない
//! - 異常系：参加者でないユーザーの送信、空メッセージ

use std::sync::Arc;

use crate::{
    domain::{ChatId, ChatStore, Event, Message, MessageContent, Target, Timestamp, UserId},
    infrastructure::realtime::Broadcaster,
};

use super::error::CommandError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<Broadcaster>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信者のユーザー ID
    /// * `chat_id` - 送信先チャット
    /// * `content` - メッセージ本文（未検証）
    ///
    /// # Returns
    ///
    /// * `Ok(Message)` - 保存されたメッセージ
    /// * `Err(CommandError)` - 検証・認可・保存の失敗（配信は行われない）
    pub async fn execute(
        &self,
        sender: &UserId,
        chat_id: &ChatId,
        content: String,
    ) -> Result<Message, CommandError> {
        let content = MessageContent::new(content)?;
        let chat = self.store.find_chat(chat_id).await?;
        if !chat.has_participant(sender) {
            return Err(CommandError::NotFound(format!("Chat not found: {}", chat_id)));
        }

        // 1. Repository 経由でメッセージを保存し、チャットの最終アクティビティを更新
        let now = Timestamp::now();
        let message = self
            .store
            .insert_message(Message::new(chat.id.clone(), sender.clone(), content, now))
            .await?;
        self.store.touch_chat(&chat.id, now).await?;

        // 2. ルームへ配信
        let report = self
            .broadcaster
            .broadcast(
                &Event::MessageCreated(message.clone()),
                &Target::room(&chat.id),
            )
            .await;
        tracing::info!(
            chat_id = %chat.id,
            message_id = %message.id,
            delivered = report.delivered,
            "Message sent"
        );

        Ok(message)
    }
}
