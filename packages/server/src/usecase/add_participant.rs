//! UseCase: グループへの参加者追加
//!
//! コミット後に以下の順で通知する：
//! 1. システムメッセージ（new_message）をルームへ
//! 2. 更新後のチャット（chat_updated）をルームへ
//! 3. 追加されたユーザーの接続へ chat_created

use std::sync::Arc;

use crate::{
    domain::{Chat, ChatId, ChatStore, Event, Message, MessageContent, Target, Timestamp, UserId},
    infrastructure::realtime::Broadcaster,
};

use super::error::CommandError;

/// 参加者追加のユースケース
pub struct AddParticipantUseCase {
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<Broadcaster>,
}

impl AddParticipantUseCase {
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// 参加者追加を実行（グループのオーナーのみ）
    pub async fn execute(
        &self,
        caller: &UserId,
        chat_id: &ChatId,
        user_id: &UserId,
    ) -> Result<Chat, CommandError> {
        let chat = self.store.find_chat(chat_id).await?;
        if !chat.is_group || !chat.is_owner(caller) {
            return Err(CommandError::Forbidden(
                "Only the group owner can add participants".to_string(),
            ));
        }
        let user = self.store.find_user(user_id).await?;

        let now = Timestamp::now();
        // 参加者リストの変更はストア内で 1 回の更新として適用する
        let chat = self.store.add_participant(&chat.id, &user.id, now).await?;
        let notice = MessageContent::new(format!("{} was added to the group", user.username))?;
        let message = self
            .store
            .insert_message(Message::system(chat.id.clone(), notice, now))
            .await?;
        tracing::info!(chat_id = %chat.id, user_id = %user.id, "Participant added");

        let room = Target::room(&chat.id);
        self.broadcaster
            .broadcast(&Event::MessageCreated(message), &room)
            .await;
        self.broadcaster
            .broadcast(&Event::ChatUpdated(chat.clone()), &room)
            .await;
        self.broadcaster
            .broadcast(&Event::ChatCreated(chat.clone()), &Target::user(user.id))
            .await;

        Ok(chat)
    }
}
