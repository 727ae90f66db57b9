//! UseCase テスト用の共通ヘルパー

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{Chat, ChatName, ChatStore, ConnectionId, RoomId, Timestamp, User, Username},
    infrastructure::{
        realtime::{Broadcaster, ConnectionHandle, OutboundFrame, RoomHub},
        repository::InMemoryChatStore,
    },
};

pub(crate) struct Fixture {
    pub store: Arc<InMemoryChatStore>,
    pub hub: Arc<RoomHub>,
    pub broadcaster: Arc<Broadcaster>,
}

impl Fixture {
    pub fn new() -> Self {
        let hub = Arc::new(RoomHub::new());
        Self {
            store: Arc::new(InMemoryChatStore::new()),
            broadcaster: Arc::new(Broadcaster::new(Arc::clone(&hub))),
            hub,
        }
    }

    pub fn store(&self) -> Arc<dyn ChatStore> {
        self.store.clone()
    }

    pub async fn user(&self, name: &str) -> User {
        let user = User::new(Username::new(name.to_string()).unwrap(), Timestamp::now());
        self.store.insert_user(user).await.unwrap()
    }

    pub async fn group(&self, name: &str, owner: &User, others: &[&User]) -> Chat {
        let chat = Chat::group(
            ChatName::new(name.to_string()).unwrap(),
            owner.id.clone(),
            others.iter().map(|u| u.id.clone()),
            Timestamp::now(),
        );
        self.store.insert_chat(chat).await.unwrap()
    }

    /// 接続を登録する（ルームには参加しない）
    pub fn connect(&self, user: &User) -> (ConnectionId, mpsc::Receiver<OutboundFrame>) {
        let (handle, rx) = ConnectionHandle::channel(16);
        let connection_id = self.hub.register(user.id.clone(), handle).unwrap();
        (connection_id, rx)
    }

    /// 接続を登録してチャットのルームに参加させる
    pub async fn listen(&self, user: &User, chat: &Chat) -> (ConnectionId, mpsc::Receiver<OutboundFrame>) {
        let (connection_id, rx) = self.connect(user);
        self.hub
            .join(&RoomId::from(&chat.id), &connection_id)
            .await
            .unwrap();
        (connection_id, rx)
    }
}

/// 受信済みのフレームをすべて取り出す
pub(crate) fn drain(rx: &mut mpsc::Receiver<OutboundFrame>) -> Vec<serde_json::Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(serde_json::from_str(&frame).unwrap());
    }
    frames
}

/// フレームの type 一覧
pub(crate) fn types(frames: &[serde_json::Value]) -> Vec<String> {
    frames
        .iter()
        .map(|f| f["type"].as_str().unwrap_or_default().to_string())
        .collect()
}
