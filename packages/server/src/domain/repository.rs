//! Repository traits for the durable store and the authorization check.
//!
//! The use case layer depends on these traits, not on a concrete store
//! (dependency inversion). Every method returns already-committed records.

use async_trait::async_trait;

use super::{
    entity::{Chat, Message, ProfileChanges, User},
    error::RepositoryError,
    value_object::{ChatId, MessageId, Timestamp, UserId},
};

/// Durable storage of users, chats and messages
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Insert a user. Usernames are unique.
    async fn insert_user(&self, user: User) -> Result<User, RepositoryError>;

    async fn find_user(&self, user_id: &UserId) -> Result<User, RepositoryError>;

    async fn list_users(&self) -> Vec<User>;

    /// Apply profile changes to a stored user. A new username must not
    /// belong to another user.
    ///
    /// Returns `None` when the changes match the stored profile.
    async fn update_user(
        &self,
        user_id: &UserId,
        changes: ProfileChanges,
    ) -> Result<Option<User>, RepositoryError>;

    async fn insert_chat(&self, chat: Chat) -> Result<Chat, RepositoryError>;

    /// Insert a direct chat unless the pair already has one.
    ///
    /// Returns the stored chat and whether it was inserted by this call.
    async fn insert_direct_chat(&self, chat: Chat) -> Result<(Chat, bool), RepositoryError>;

    /// Add a participant to the stored chat and bump its `last_activity`
    /// as one atomic update
    async fn add_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Chat, RepositoryError>;

    /// Remove a participant from the stored chat and bump its
    /// `last_activity` as one atomic update
    async fn remove_participant(
        &self,
        chat_id: &ChatId,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Chat, RepositoryError>;

    /// Bump a chat's `last_activity` in place
    async fn touch_chat(&self, chat_id: &ChatId, now: Timestamp) -> Result<Chat, RepositoryError>;

    async fn find_chat(&self, chat_id: &ChatId) -> Result<Chat, RepositoryError>;

    /// Chats the user participates in, most recently active first
    async fn chats_of_user(&self, user_id: &UserId) -> Vec<Chat>;

    async fn insert_message(&self, message: Message) -> Result<Message, RepositoryError>;

    async fn update_message(&self, message: Message) -> Result<Message, RepositoryError>;

    /// Delete a message, returning the deleted record
    async fn delete_message(&self, message_id: &MessageId) -> Result<Message, RepositoryError>;

    async fn find_message(&self, message_id: &MessageId) -> Result<Message, RepositoryError>;

    /// Messages of a chat in chronological order
    async fn messages_of_chat(&self, chat_id: &ChatId) -> Vec<Message>;

    async fn last_message_of_chat(&self, chat_id: &ChatId) -> Option<Message>;
}

/// Decides whether a user may listen to a chat's room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParticipantAuthorizer: Send + Sync {
    async fn is_participant(&self, user_id: &UserId, chat_id: &ChatId) -> bool;
}
