//! UseCase: 自分のプロフィール更新処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UpdateProfileUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ユーザー名は一意であり、他のユーザーの名前には変更できないことを保証
//! - 変更内容が現在の値と同じ場合は「変更なし」として区別して返すことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ユーザー名・プロフィール画像の変更
//! - エッジケース：現在と同じ値での更新（変更なし）
//! - 異常系：他のユーザーが使っているユーザー名、不正なユーザー名

use std::sync::Arc;

use crate::domain::{ChatStore, ProfileChanges, User, UserId, Username};

use super::error::CommandError;

/// プロフィール更新のユースケース
pub struct UpdateProfileUseCase {
    store: Arc<dyn ChatStore>,
}

impl UpdateProfileUseCase {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self { store }
    }

    /// 呼び出し元のプロフィールを更新する
    ///
    /// # Returns
    ///
    /// * `Ok(Some(user))` - 更新後のユーザー
    /// * `Ok(None)` - 変更なし（すべて現在の値と同じ）
    /// * `Err(CommandError::Conflict)` - ユーザー名が他のユーザーと重複
    pub async fn execute(
        &self,
        caller: &UserId,
        username: Option<String>,
        profile_picture: Option<String>,
    ) -> Result<Option<User>, CommandError> {
        let changes = ProfileChanges {
            username: username.map(Username::new).transpose()?,
            profile_picture,
        };
        let updated = self.store.update_user(caller, changes).await?;
        match &updated {
            Some(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "Profile updated")
            }
            None => tracing::debug!(user_id = %caller, "Profile unchanged"),
        }
        Ok(updated)
    }
}
