//! Test fixtures: an in-process server on a free port, plus small HTTP and
//! WebSocket helpers.

#![allow(dead_code)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use roomcast_server::{ServerConfig, runner};
use serde_json::{Value, json};
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    addr: std::net::SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        let config = ServerConfig {
            port: 0,
            outbound_buffer: 64,
            ..ServerConfig::default()
        };
        let listener = runner::bind(&config).await.expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        let state = runner::build_state(&config);
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            runner::serve(listener, state, shutdown)
                .await
                .expect("Server failed");
        });
        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, user_id: &str) -> String {
        format!("ws://{}/ws?user_id={}", self.addr, user_id)
    }

    /// Register a user and return its id
    pub async fn create_user(&self, client: &reqwest::Client, username: &str) -> String {
        let response = client
            .post(format!("{}/api/users", self.base_url()))
            .json(&json!({ "username": username }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["id"].as_str().expect("user id").to_string()
    }

    /// Create a group chat owned by `owner` and return its id
    pub async fn create_group(
        &self,
        client: &reqwest::Client,
        owner: &str,
        name: &str,
        participants: &[&str],
    ) -> String {
        let response = client
            .post(format!("{}/api/chats", self.base_url()))
            .header("x-user-id", owner)
            .json(&json!({ "name": name, "participants": participants }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
        let body: Value = response.json().await.expect("Failed to parse JSON");
        body["id"].as_str().expect("chat id").to_string()
    }

    /// Connect and wait for the greeting, so the connection is registered
    pub async fn connect(&self, user_id: &str) -> WsStream {
        let (mut stream, _) = connect_async(self.ws_url(user_id))
            .await
            .expect("Failed to connect WebSocket");
        let greeting = next_event(&mut stream, Duration::from_secs(2))
            .await
            .expect("No greeting");
        assert_eq!(greeting["payload"]["msg"], "Connected");
        stream
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame as JSON, or None if nothing arrives in time
pub async fn next_event(ws: &mut WsStream, wait: Duration) -> Option<Value> {
    loop {
        match tokio::time::timeout(wait, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                return Some(serde_json::from_str(text.as_str()).expect("Invalid JSON frame"));
            }
            Ok(Some(Ok(_))) => continue,
            _ => return None,
        }
    }
}

/// Join a room and wait for the acknowledgement
pub async fn join(ws: &mut WsStream, chat_id: &str) -> Value {
    send_json(ws, json!({ "type": "join", "chat_id": chat_id })).await;
    next_event(ws, Duration::from_secs(2))
        .await
        .expect("No reply to join")
}
