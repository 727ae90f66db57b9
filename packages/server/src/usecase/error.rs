//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{ChatError, RepositoryError, SessionError, ValueObjectError};

/// 接続確立時のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// チャット・メッセージの変更系ユースケースのエラー
///
/// ブロードキャストの失敗はここに含まれない（コミット成功がそのまま結果になる）。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Conflict(String),
}

impl From<RepositoryError> for CommandError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::UserNotFound(_)
            | RepositoryError::ChatNotFound(_)
            | RepositoryError::MessageNotFound(_) => CommandError::NotFound(error.to_string()),
            RepositoryError::UsernameTaken(_) | RepositoryError::AlreadyExists(_) => {
                CommandError::Conflict(error.to_string())
            }
            RepositoryError::Rule(rule) => CommandError::from(rule),
        }
    }
}

impl From<ChatError> for CommandError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::OwnerCannotBeRemoved(_) => CommandError::Forbidden(error.to_string()),
            ChatError::NotGroup(_)
            | ChatError::AlreadyParticipant { .. }
            | ChatError::NotParticipant { .. }
            | ChatError::DirectChatWithSelf => CommandError::InvalidRequest(error.to_string()),
        }
    }
}

impl From<ValueObjectError> for CommandError {
    fn from(error: ValueObjectError) -> Self {
        CommandError::InvalidRequest(error.to_string())
    }
}
