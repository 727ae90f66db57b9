//! Core domain models for the chat application.
//!
//! These are the persisted records. Events carry clones of them, never
//! references into the store.

use serde::{Deserialize, Serialize};

use super::{
    error::ChatError,
    factory::IdFactory,
    value_object::{ChatId, ChatName, MessageContent, MessageId, Timestamp, UserId, Username},
};

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    /// Free-form picture reference (usually a URL)
    #[serde(default)]
    pub profile_picture: Option<String>,
    pub created_at: Timestamp,
}

impl User {
    /// Create a new user with a generated ID and no picture
    pub fn new(username: Username, created_at: Timestamp) -> Self {
        Self {
            id: IdFactory::user_id(),
            username,
            profile_picture: None,
            created_at,
        }
    }

    /// Apply profile changes. Returns whether any field actually changed.
    pub fn apply(&mut self, changes: ProfileChanges) -> bool {
        let mut changed = false;
        if let Some(username) = changes.username {
            if username != self.username {
                self.username = username;
                changed = true;
            }
        }
        if let Some(picture) = changes.profile_picture {
            if self.profile_picture.as_ref() != Some(&picture) {
                self.profile_picture = Some(picture);
                changed = true;
            }
        }
        changed
    }
}

/// Requested profile edits. A `None` field is left as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub username: Option<Username>,
    pub profile_picture: Option<String>,
}

/// A direct (two-person) or group chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: ChatId,
    /// Group name; direct chats have none
    pub name: Option<ChatName>,
    pub is_group: bool,
    pub participants: Vec<UserId>,
    /// Group owner; direct chats have none
    pub owner: Option<UserId>,
    pub created_at: Timestamp,
    pub last_activity: Timestamp,
}

impl Chat {
    /// Create a direct chat between two different users
    ///
    /// # Errors
    ///
    /// Returns `ChatError::DirectChatWithSelf` if both users are the same
    pub fn direct(first: UserId, second: UserId, now: Timestamp) -> Result<Self, ChatError> {
        if first == second {
            return Err(ChatError::DirectChatWithSelf);
        }
        Ok(Self {
            id: IdFactory::chat_id(),
            name: None,
            is_group: false,
            participants: vec![first, second],
            owner: None,
            created_at: now,
            last_activity: now,
        })
    }

    /// Create a group chat. The owner is always a participant and duplicates are dropped.
    pub fn group(
        name: ChatName,
        owner: UserId,
        participants: impl IntoIterator<Item = UserId>,
        now: Timestamp,
    ) -> Self {
        let mut members: Vec<UserId> = Vec::new();
        for user_id in participants {
            if !members.contains(&user_id) {
                members.push(user_id);
            }
        }
        if !members.contains(&owner) {
            members.push(owner.clone());
        }
        Self {
            id: IdFactory::chat_id(),
            name: Some(name),
            is_group: true,
            participants: members,
            owner: Some(owner),
            created_at: now,
            last_activity: now,
        }
    }

    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participants.contains(user_id)
    }

    pub fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner.as_ref() == Some(user_id)
    }

    /// Add a participant to a group chat
    ///
    /// # Errors
    ///
    /// `NotGroup` for direct chats, `AlreadyParticipant` if the user is already in
    pub fn add_participant(&mut self, user_id: UserId) -> Result<(), ChatError> {
        if !self.is_group {
            return Err(ChatError::NotGroup(self.id.to_string()));
        }
        if self.has_participant(&user_id) {
            return Err(ChatError::AlreadyParticipant {
                chat_id: self.id.to_string(),
                user_id: user_id.into_string(),
            });
        }
        self.participants.push(user_id);
        Ok(())
    }

    /// Remove a participant from a group chat
    ///
    /// # Errors
    ///
    /// `NotGroup` for direct chats, `NotParticipant` if the user is not in,
    /// `OwnerCannotBeRemoved` when targeting the owner
    pub fn remove_participant(&mut self, user_id: &UserId) -> Result<(), ChatError> {
        if !self.is_group {
            return Err(ChatError::NotGroup(self.id.to_string()));
        }
        if !self.has_participant(user_id) {
            return Err(ChatError::NotParticipant {
                chat_id: self.id.to_string(),
                user_id: user_id.to_string(),
            });
        }
        if self.is_owner(user_id) {
            return Err(ChatError::OwnerCannotBeRemoved(self.id.to_string()));
        }
        self.participants.retain(|p| p != user_id);
        Ok(())
    }

    /// Record activity in the chat
    pub fn touch(&mut self, now: Timestamp) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }
}

/// A chat message. System messages have no sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub chat_id: ChatId,
    pub sender_id: Option<UserId>,
    pub content: MessageContent,
    pub timestamp: Timestamp,
    pub edited: bool,
    pub read: bool,
    pub is_system: bool,
}

impl Message {
    /// Create a message sent by a user
    pub fn new(
        chat_id: ChatId,
        sender_id: UserId,
        content: MessageContent,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id: IdFactory::message_id(),
            chat_id,
            sender_id: Some(sender_id),
            content,
            timestamp,
            edited: false,
            read: false,
            is_system: false,
        }
    }

    /// Create a system message (membership changes and the like)
    pub fn system(chat_id: ChatId, content: MessageContent, timestamp: Timestamp) -> Self {
        Self {
            id: IdFactory::message_id(),
            chat_id,
            sender_id: None,
            content,
            timestamp,
            edited: false,
            read: false,
            is_system: true,
        }
    }

    pub fn is_sent_by(&self, user_id: &UserId) -> bool {
        self.sender_id.as_ref() == Some(user_id)
    }

    /// Replace the content and mark the message as edited
    pub fn edit(&mut self, content: MessageContent) {
        self.content = content;
        self.edited = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn group_of(owner: &str, others: &[&str]) -> Chat {
        Chat::group(
            ChatName::new("team".to_string()).unwrap(),
            user(owner),
            others.iter().map(|id| user(id)),
            Timestamp::now(),
        )
    }

    #[test]
    fn test_profile_changes_report_only_real_differences() {
        // テスト項目: 現在と同じ値の変更は「変更なし」、異なる値だけが反映される
        // given (前提条件):
        let mut profile = User::new(Username::new("alice".to_string()).unwrap(), Timestamp::now());

        // when (操作):
        let same = profile.apply(ProfileChanges {
            username: Some(Username::new("alice".to_string()).unwrap()),
            profile_picture: None,
        });
        let picture = profile.apply(ProfileChanges {
            username: None,
            profile_picture: Some("https://img.example/alice.png".to_string()),
        });
        let again = profile.apply(ProfileChanges {
            username: None,
            profile_picture: Some("https://img.example/alice.png".to_string()),
        });

        // then (期待する結果):
        assert!(!same);
        assert!(picture);
        assert!(!again);
        assert_eq!(profile.username.as_str(), "alice");
        assert_eq!(
            profile.profile_picture.as_deref(),
            Some("https://img.example/alice.png")
        );
    }

    #[test]
    fn test_direct_chat_has_two_participants_and_no_owner() {
        // テスト項目: ダイレクトチャットは 2 人の参加者を持ち、オーナーはいない
        // when (操作):
        let chat = Chat::direct(user("alice"), user("bob"), Timestamp::now()).unwrap();

        // then (期待する結果):
        assert!(!chat.is_group);
        assert_eq!(chat.participants, vec![user("alice"), user("bob")]);
        assert!(chat.owner.is_none());
        assert!(chat.name.is_none());
    }

    #[test]
    fn test_direct_chat_with_self_fails() {
        // テスト項目: 自分自身とのダイレクトチャットは作成できない
        let result = Chat::direct(user("alice"), user("alice"), Timestamp::now());
        assert_eq!(result.unwrap_err(), ChatError::DirectChatWithSelf);
    }

    #[test]
    fn test_group_chat_includes_owner_once() {
        // テスト項目: グループチャットにはオーナーが必ず 1 回だけ含まれる
        // when (操作):
        let chat = group_of("alice", &["bob", "bob", "carol"]);

        // then (期待する結果):
        assert_eq!(
            chat.participants,
            vec![user("bob"), user("carol"), user("alice")]
        );
        assert!(chat.is_owner(&user("alice")));
    }

    #[test]
    fn test_add_participant_rejects_duplicate() {
        // テスト項目: 既存の参加者は追加できない
        // given (前提条件):
        let mut chat = group_of("alice", &["bob"]);

        // when (操作):
        let result = chat.add_participant(user("bob"));

        // then (期待する結果):
        assert!(matches!(result, Err(ChatError::AlreadyParticipant { .. })));
        assert_eq!(chat.participants.len(), 2);
    }

    #[test]
    fn test_add_participant_to_direct_chat_fails() {
        // テスト項目: ダイレクトチャットには参加者を追加できない
        let mut chat = Chat::direct(user("alice"), user("bob"), Timestamp::now()).unwrap();
        let result = chat.add_participant(user("carol"));
        assert!(matches!(result, Err(ChatError::NotGroup(_))));
    }

    #[test]
    fn test_remove_participant_rules() {
        // テスト項目: 参加者は削除でき、オーナーと非参加者は削除できない
        // given (前提条件):
        let mut chat = group_of("alice", &["bob"]);

        // when / then:
        assert!(matches!(
            chat.remove_participant(&user("alice")),
            Err(ChatError::OwnerCannotBeRemoved(_))
        ));
        assert!(matches!(
            chat.remove_participant(&user("zed")),
            Err(ChatError::NotParticipant { .. })
        ));
        assert!(chat.remove_participant(&user("bob")).is_ok());
        assert_eq!(chat.participants, vec![user("alice")]);
    }

    #[test]
    fn test_message_edit_sets_flag() {
        // テスト項目: メッセージを編集すると edited フラグが立つ
        // given (前提条件):
        let mut message = Message::new(
            ChatId::new("c1".to_string()).unwrap(),
            user("alice"),
            MessageContent::new("Hello!".to_string()).unwrap(),
            Timestamp::now(),
        );

        // when (操作):
        message.edit(MessageContent::new("Hello, world!".to_string()).unwrap());

        // then (期待する結果):
        assert!(message.edited);
        assert_eq!(message.content.as_str(), "Hello, world!");
        assert!(message.is_sent_by(&user("alice")));
    }

    #[test]
    fn test_system_message_has_no_sender() {
        // テスト項目: システムメッセージは送信者を持たず、null として直列化される
        // given (前提条件):
        let message = Message::system(
            ChatId::new("c1".to_string()).unwrap(),
            MessageContent::new("bob was added to the group".to_string()).unwrap(),
            Timestamp::now(),
        );

        // when (操作):
        let json = serde_json::to_value(&message).unwrap();

        // then (期待する結果):
        assert!(message.is_system);
        assert!(json["sender_id"].is_null());
        assert_eq!(json["chat_id"], "c1");
    }
}
