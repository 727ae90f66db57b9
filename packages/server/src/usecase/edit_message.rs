//! UseCase: メッセージ編集処理

use std::sync::Arc;

use crate::{
    domain::{ChatStore, Event, Message, MessageContent, MessageId, Target, UserId},
    infrastructure::realtime::Broadcaster,
};

use super::error::CommandError;

/// メッセージ編集のユースケース
pub struct EditMessageUseCase {
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<Broadcaster>,
}

impl EditMessageUseCase {
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// 送信者本人による編集。保存後に message_updated をルームへ配信する。
    pub async fn execute(
        &self,
        caller: &UserId,
        message_id: &MessageId,
        content: String,
    ) -> Result<Message, CommandError> {
        let content = MessageContent::new(content)?;
        let mut message = self.store.find_message(message_id).await?;
        if !message.is_sent_by(caller) {
            return Err(CommandError::Forbidden(
                "Only the sender can edit this message".to_string(),
            ));
        }

        message.edit(content);
        let message = self.store.update_message(message).await?;
        tracing::info!(message_id = %message.id, chat_id = %message.chat_id, "Message edited");

        self.broadcaster
            .broadcast(
                &Event::MessageUpdated(message.clone()),
                &Target::room(&message.chat_id),
            )
            .await;
        Ok(message)
    }
}
