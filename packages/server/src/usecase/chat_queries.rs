//! UseCase: 参照系（ユーザー一覧・チャット一覧・チャット詳細・メッセージ履歴）
//!
//! 参照系は状態を変更しないので、配信は行わない。

use std::sync::Arc;

use crate::domain::{Chat, ChatId, ChatStore, Message, User, UserId};

use super::error::CommandError;

/// チャット一覧の 1 件（最新メッセージと、自分以外の参加者の情報付き）
#[derive(Debug, Clone)]
pub struct ChatOverview {
    pub chat: Chat,
    pub last_message: Option<Message>,
    pub participant_details: Vec<User>,
}

/// チャット詳細（参加者全員の情報付き）
#[derive(Debug, Clone)]
pub struct ChatDetail {
    pub chat: Chat,
    pub participant_details: Vec<User>,
}

/// 参照系のユースケース
pub struct ChatQueryUseCase {
    store: Arc<dyn ChatStore>,
}

impl ChatQueryUseCase {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// 自分以外の全ユーザー
    pub async fn list_users(&self, caller: &UserId) -> Vec<User> {
        self.store
            .list_users()
            .await
            .into_iter()
            .filter(|user| &user.id != caller)
            .collect()
    }

    /// 参加中のチャット（最終アクティビティの新しい順）
    pub async fn list_chats(&self, caller: &UserId) -> Vec<ChatOverview> {
        let mut overviews = Vec::new();
        for chat in self.store.chats_of_user(caller).await {
            let last_message = self.store.last_message_of_chat(&chat.id).await;
            let others: Vec<UserId> = chat
                .participants
                .iter()
                .filter(|id| *id != caller)
                .cloned()
                .collect();
            let participant_details = self.users(&others).await;
            overviews.push(ChatOverview {
                chat,
                last_message,
                participant_details,
            });
        }
        overviews
    }

    /// チャット詳細。参加していなければ `NotFound`。
    pub async fn get_chat(
        &self,
        caller: &UserId,
        chat_id: &ChatId,
    ) -> Result<ChatDetail, CommandError> {
        let chat = self.visible_chat(caller, chat_id).await?;
        let participant_details = self.users(&chat.participants).await;
        Ok(ChatDetail {
            chat,
            participant_details,
        })
    }

    /// メッセージ履歴（古い順）。参加していなければ `NotFound`。
    pub async fn list_messages(
        &self,
        caller: &UserId,
        chat_id: &ChatId,
    ) -> Result<Vec<Message>, CommandError> {
        let chat = self.visible_chat(caller, chat_id).await?;
        Ok(self.store.messages_of_chat(&chat.id).await)
    }

    async fn visible_chat(&self, caller: &UserId, chat_id: &ChatId) -> Result<Chat, CommandError> {
        let chat = self.store.find_chat(chat_id).await?;
        if !chat.has_participant(caller) {
            return Err(CommandError::NotFound(format!("Chat not found: {}", chat_id)));
        }
        Ok(chat)
    }

    /// 削除済みなどで見つからないユーザーは読み飛ばす
    async fn users(&self, ids: &[UserId]) -> Vec<User> {
        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            if let Ok(user) = self.store.find_user(id).await {
                users.push(user);
            }
        }
        users
    }
}
