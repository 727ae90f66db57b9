//! UseCase: チャット作成処理（ダイレクト / グループ）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateChatUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ダイレクトチャットは 2 人の間で 1 つだけであることを保証
//! - 作成したチャットが参加者全員の接続に chat_created として届くことを確認
//!   （まだルームに参加していないので、ユーザー宛てに配信される）
//!
//! ### どのような状況を想定しているか
//! - 正常系：ダイレクトチャット・グループチャットの新規作成
//! - エッジケース：既存のダイレクトチャットがある場合（新規作成しない）
//! - 異常系：存在しないユーザー、自分自身とのダイレクトチャット

use std::sync::Arc;

use crate::{
    domain::{Chat, ChatName, ChatStore, Event, Target, Timestamp, UserId},
    infrastructure::realtime::Broadcaster,
};

use super::error::CommandError;

/// 作成するチャットの種類
#[derive(Debug, Clone)]
pub enum NewChat {
    Direct { user_id: UserId },
    Group {
        name: ChatName,
        participants: Vec<UserId>,
    },
}

/// 作成結果。既存のダイレクトチャットを返した場合は `created == false`
#[derive(Debug, Clone)]
pub struct CreatedChat {
    pub chat: Chat,
    pub created: bool,
}

/// チャット作成のユースケース
pub struct CreateChatUseCase {
    store: Arc<dyn ChatStore>,
    broadcaster: Arc<Broadcaster>,
}

impl CreateChatUseCase {
    pub fn new(store: Arc<dyn ChatStore>, broadcaster: Arc<Broadcaster>) -> Self {
        Self { store, broadcaster }
    }

    /// チャット作成を実行
    ///
    /// # Arguments
    ///
    /// * `caller` - 作成者（グループではオーナーになる）
    /// * `request` - ダイレクトかグループか
    pub async fn execute(
        &self,
        caller: &UserId,
        request: NewChat,
    ) -> Result<CreatedChat, CommandError> {
        let now = Timestamp::now();
        let chat = match request {
            NewChat::Direct { user_id } => {
                self.store.find_user(&user_id).await?;
                let chat = Chat::direct(caller.clone(), user_id, now)?;
                // 1. 永続化（同じ 2 人のチャットがあればそれを返す）
                let (chat, created) = self.store.insert_direct_chat(chat).await?;
                if !created {
                    return Ok(CreatedChat {
                        chat,
                        created: false,
                    });
                }
                chat
            }
            NewChat::Group { name, participants } => {
                for user_id in &participants {
                    self.store.find_user(user_id).await?;
                }
                // 1. 永続化（コミット）
                self.store
                    .insert_chat(Chat::group(name, caller.clone(), participants, now))
                    .await?
            }
        };
        tracing::info!(chat_id = %chat.id, is_group = chat.is_group, "Chat created");

        // 2. 参加者全員の接続へ通知
        self.broadcaster
            .broadcast(
                &Event::ChatCreated(chat.clone()),
                &Target::Users(chat.participants.clone()),
            )
            .await;

        Ok(CreatedChat {
            chat,
            created: true,
        })
    }
}
