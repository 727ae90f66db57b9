//! Domain factories for creating identifiers.

use super::{ChatId, ConnectionId, MessageId, UserId};

/// Factory for generating identifiers.
///
/// Keeps the generation concern (random UUID v4) apart from the validation
/// logic in the identifier value objects. A UUID string is always a valid
/// identifier, so generation cannot fail.
pub struct IdFactory;

impl IdFactory {
    fn uuid_string() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn user_id() -> UserId {
        UserId::try_from(Self::uuid_string()).unwrap_or_else(|_| unreachable!("uuid is a valid id"))
    }

    pub fn chat_id() -> ChatId {
        ChatId::try_from(Self::uuid_string()).unwrap_or_else(|_| unreachable!("uuid is a valid id"))
    }

    pub fn message_id() -> MessageId {
        MessageId::try_from(Self::uuid_string())
            .unwrap_or_else(|_| unreachable!("uuid is a valid id"))
    }

    pub fn connection_id() -> ConnectionId {
        ConnectionId::try_from(Self::uuid_string())
            .unwrap_or_else(|_| unreachable!("uuid is a valid id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_factory_generates_uuid_v4() {
        // テスト項目: IdFactory は UUID v4 形式の ID を生成できる
        // when (操作):
        let chat_id = IdFactory::chat_id();

        // then (期待する結果): UUID v4 の標準長（ハイフン含む）
        assert_eq!(chat_id.as_str().len(), 36);
        assert!(uuid::Uuid::parse_str(chat_id.as_str()).is_ok());
    }

    #[test]
    fn test_id_factory_generate_uniqueness() {
        // テスト項目: IdFactory は毎回異なる ID を生成する
        let first = IdFactory::connection_id();
        let second = IdFactory::connection_id();
        assert_ne!(first, second);
    }
}
