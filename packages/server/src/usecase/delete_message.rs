//! UseCase: メッセージ削除処理

use std::sync::Arc;

use crate::{
    domain::{ChatStore, Event, Message, MessageId, Target, UserId},
    infrastructure::realtime::Broadcaster,
};

use super::error::CommandError;

/// メッセージ削除のユースケース
pub struct DeleteMessageUseCase {
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<Broadcaster>,
}

impl DeleteMessageUseCase {
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// 送信者本人による削除。削除後に message_deleted をルームへ配信する。
    pub async fn execute(
        &self,
        caller: &UserId,
        message_id: &MessageId,
    ) -> Result<Message, CommandError> {
        let message = self.store.find_message(message_id).await?;
        if !message.is_sent_by(caller) {
            return Err(CommandError::Forbidden(
                "Only the sender can delete this message".to_string(),
            ));
        }

        let message = self.store.delete_message(message_id).await?;
        tracing::info!(message_id = %message.id, chat_id = %message.chat_id, "Message deleted");

        self.broadcaster
            .broadcast(
                &Event::MessageDeleted {
                    message_id: message.id.clone(),
                    chat_id: message.chat_id.clone(),
                },
                &Target::room(&message.chat_id),
            )
            .await;
        Ok(message)
    }
}
