//! ストアの参加者リストに基づく認可チェック

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{ChatId, ChatStore, ParticipantAuthorizer, UserId};

/// 永続化された参加者リストを正とする ParticipantAuthorizer 実装
pub struct StoreParticipantAuthorizer {
    store: Arc<dyn ChatStore>,
}

impl StoreParticipantAuthorizer {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ParticipantAuthorizer for StoreParticipantAuthorizer {
    async fn is_participant(&self, user_id: &UserId, chat_id: &ChatId) -> bool {
        match self.store.find_chat(chat_id).await {
            Ok(chat) => chat.has_participant(user_id),
            Err(_) => false,
        }
    }
}
