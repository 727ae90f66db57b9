//! UseCase: ユーザー登録処理

use std::sync::Arc;

use crate::domain::{ChatStore, Timestamp, User, Username};

use super::error::CommandError;

/// ユーザー登録のユースケース
pub struct RegisterUserUseCase {
    store: Arc<dyn ChatStore>,
}

impl RegisterUserUseCase {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// ユーザーを登録する。ユーザー名が重複していれば `Conflict`。
    pub async fn execute(&self, username: String) -> Result<User, CommandError> {
        let username = Username::new(username)?;
        let user = self
            .store
            .insert_user(User::new(username, Timestamp::now()))
            .await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RepositoryError, repository::MockChatStore};

    #[tokio::test]
    async fn test_register_user_success() {
        // テスト項目: ユーザー名を正規化して保存する
        // given (前提条件):
        let mut store = MockChatStore::new();
        store
            .expect_insert_user()
            .withf(|user| user.username.as_str() == "alice")
            .times(1)
            .returning(Ok);
        let usecase = RegisterUserUseCase::new(Arc::new(store));

        // when (操作):
        let result = usecase.execute("  alice ".to_string()).await;

        // then (期待する結果):
        assert_eq!(result.unwrap().username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_register_user_duplicate_is_conflict() {
        // テスト項目: 重複したユーザー名は Conflict になる
        let mut store = MockChatStore::new();
        store
            .expect_insert_user()
            .returning(|user| Err(RepositoryError::UsernameTaken(user.username.to_string())));
        let usecase = RegisterUserUseCase::new(Arc::new(store));

        let result = usecase.execute("alice".to_string()).await;

        assert!(matches!(result, Err(CommandError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_user_blank_name_is_rejected() {
        // テスト項目: 空のユーザー名はストアに到達せず InvalidRequest になる
        let store = MockChatStore::new();
        let usecase = RegisterUserUseCase::new(Arc::new(store));

        let result = usecase.execute("   ".to_string()).await;

        assert!(matches!(result, Err(CommandError::InvalidRequest(_))));
    }
}
