//! UseCase: グループからの参加者削除
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RemoveParticipantUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 削除されたユーザーがルームに残っていると、以後のメッセージが届き続けてしまう
//! - chat_removed の配信時にルームから強制的に退出させることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加中のユーザーの削除と強制退出
//! - 異常系：オーナー以外による削除、オーナー自身の削除、参加者でないユーザーの削除

use std::sync::Arc;

use crate::{
    domain::{Chat, ChatId, ChatStore, Event, Message, MessageContent, Target, Timestamp, UserId},
    infrastructure::realtime::Broadcaster,
};

use super::error::CommandError;

/// 参加者削除のユースケース
pub struct RemoveParticipantUseCase {
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<Broadcaster>,
}

impl RemoveParticipantUseCase {
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// 参加者削除を実行（グループのオーナーのみ、オーナー自身は削除不可）
    pub async fn execute(
        &self,
        caller: &UserId,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<Chat, CommandError> {
        let chat = self.store.find_chat(chat_id).await?;
        if !chat.is_group || !chat.is_owner(caller) {
            return Err(CommandError::Forbidden(
                "Only the group owner can remove participants".to_string(),
            ));
        }
        let user = self.store.find_user(user_id).await?;

        let now = Timestamp::now();
        let chat = self.store.remove_participant(&chat.id, &user.id, now).await?;
        let notice = MessageContent::new(format!("{} was removed from the group", user.username))?;
        let message = self
            .store
            .insert_message(Message::system(chat.id.clone(), notice, now))
            .await?;
        tracing::info!(chat_id = %chat.id, user_id = %user.id, "Participant removed");

        let room = Target::room(&chat.id);
        self.broadcaster
            .broadcast(&Event::MessageCreated(message), &room)
            .await;
        self.broadcaster
            .broadcast(&Event::ChatUpdated(chat.clone()), &room)
            .await;
        // 削除されたユーザーの接続はここでルームから外れる
        self.broadcaster
            .broadcast(
                &Event::ParticipantRemoved {
                    chat_id: chat.id.clone(),
                },
                &Target::user(user.id),
            )
            .await;

        Ok(chat)
    }
}
