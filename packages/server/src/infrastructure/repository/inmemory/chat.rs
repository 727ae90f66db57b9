//! InMemory ChatStore 実装
//!
//! ドメイン層が定義する ChatStore trait の具体的な実装。
//! HashMap / Vec をインメモリ DB として使用します。
//!
//! 全テーブルを 1 つの Mutex で保護するため、各操作は単一ドキュメントへの
//! アトミックな更新になります。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Chat, ChatId, ChatStore, Message, MessageId, ProfileChanges, RepositoryError, Timestamp, User,
    UserId,
};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    chats: HashMap<ChatId, Chat>,
    /// 挿入順 = 時系列順
    messages: Vec<Message>,
}

/// インメモリ ChatStore 実装
#[derive(Default)]
pub struct InMemoryChatStore {
    tables: Mutex<Tables>,
}

impl InMemoryChatStore {
    /// 新しい InMemoryChatStore を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn insert_user(&self, user: User) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepositoryError::AlreadyExists(user.id.to_string()));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepositoryError::UsernameTaken(user.username.to_string()));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: &UserId) -> Result<User, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_string()))
    }

    async fn list_users(&self) -> Vec<User> {
        let tables = self.tables.lock().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        users
    }

    async fn update_user(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if let Some(username) = &changes.username {
            let taken = tables
                .users
                .values()
                .any(|u| &u.username == username && &u.id != user_id);
            if taken {
                return Err(RepositoryError::UsernameTaken(username.to_string()));
            }
        }
        let stored = tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| RepositoryError::UserNotFound(user_id.to_string()))?;
        Ok(stored.apply(changes).then(|| stored.clone()))
    }

    async fn insert_chat(&self, chat: Chat) -> Result<Chat, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.chats.contains_key(&chat.id) {
            return Err(RepositoryError::AlreadyExists(chat.id.to_string()));
        }
        tables.chats.insert(chat.id.clone(), chat.clone());
        Ok(chat)
    }

    async fn insert_direct_chat(&self, chat: Chat) -> Result<(Chat, bool), RepositoryError> {
        let mut tables = self.tables.lock().await;
        // 同じ 2 人のダイレクトチャットは 1 つだけ
        let existing = tables
            .chats
            .values()
            .find(|c| !c.is_group && chat.participants.iter().all(|p| c.has_participant(p)))
            .cloned();
        if let Some(existing) = existing {
            return Ok((existing, false));
        }
        if tables.chats.contains_key(&chat.id) {
            return Err(RepositoryError::AlreadyExists(chat.id.to_string()));
        }
        tables.chats.insert(chat.id.clone(), chat.clone());
        Ok((chat, true))
    }

    async fn add_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Chat, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| RepositoryError::ChatNotFound(chat_id.to_string()))?;
        stored.add_participant(user_id.clone())?;
        stored.touch(now);
        Ok(stored.clone())
    }

    async fn remove_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Chat, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| RepositoryError::ChatNotFound(chat_id.to_string()))?;
        stored.remove_participant(user_id)?;
        stored.touch(now);
        Ok(stored.clone())
    }

    async fn touch_chat(&self, chat_id: &ChatId, now: Timestamp) -> Result<Chat, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .chats
            .get_mut(chat_id)
            .ok_or_else(|| RepositoryError::ChatNotFound(chat_id.to_string()))?;
        stored.touch(now);
        Ok(stored.clone())
    }

    async fn find_chat(&self, chat_id: &ChatId) -> Result<Chat, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .chats
            .get(chat_id)
            .cloned()
            .ok_or_else(|| RepositoryError::ChatNotFound(chat_id.to_string()))
    }

    async fn chats_of_user(&self, user_id: &UserId) -> Vec<Chat> {
        let tables = self.tables.lock().await;
        let mut chats: Vec<Chat> = tables
            .chats
            .values()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        chats.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        chats
    }

    async fn insert_message(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.chats.contains_key(&message.chat_id) {
            return Err(RepositoryError::ChatNotFound(message.chat_id.to_string()));
        }
        if tables.messages.iter().any(|m| m.id == message.id) {
            return Err(RepositoryError::AlreadyExists(message.id.to_string()));
        }
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn update_message(&self, message: Message) -> Result<Message, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .messages
            .iter_mut()
            .find(|m| m.id == message.id)
            .ok_or_else(|| RepositoryError::MessageNotFound(message.id.to_string()))?;
        *stored = message.clone();
        Ok(message)
    }

    async fn delete_message(&self, message_id: &MessageId) -> Result<Message, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let index = tables
            .messages
            .iter()
            .position(|m| &m.id == message_id)
            .ok_or_else(|| RepositoryError::MessageNotFound(message_id.to_string()))?;
        Ok(tables.messages.remove(index))
    }

    async fn find_message(&self, message_id: &MessageId) -> Result<Message, RepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .messages
            .iter()
            .find(|m| &m.id == message_id)
            .cloned()
            .ok_or_else(|| RepositoryError::MessageNotFound(message_id.to_string()))
    }

    async fn messages_of_chat(&self, chat_id: &ChatId) -> Vec<Message> {
        let tables = self.tables.lock().await;
        tables
            .messages
            .iter()
            .filter(|m| &m.chat_id == chat_id)
            .cloned()
            .collect()
    }

    async fn last_message_of_chat(&self, chat_id: &ChatId) -> Option<Message> {
        let tables = self.tables.lock().await;
        tables
            .messages
            .iter()
            .rev()
            .find(|m| &m.chat_id == chat_id)
            .cloned()
    }
}
