//! WebSocket connection handlers.
//!
//! One connection runs two tasks: a writer draining the connection's bounded
//! outbound queue into the socket, and a reader turning inbound join/leave
//! requests into session transitions. When either ends, the session is
//! unregistered in one step.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};

use crate::{
    domain::{ChatId, ConnectionId, Event, UserId},
    infrastructure::{
        dto::websocket::ClientRequest,
        realtime::{Broadcaster, ConnectionHandle},
    },
    ui::{
        error::ApiError,
        state::{AppState, ConnectQuery},
    },
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Convert String -> UserId (Domain Model)
    let user_id = UserId::try_from(query.user_id.clone()).map_err(|e| {
        tracing::warn!("Invalid user_id format: '{}'", query.user_id);
        ApiError::from(e)
    })?;

    // Reject unknown users before the upgrade
    let connect_usecase = ConnectSessionUseCase::new(state.store.clone(), state.hub.clone());
    if let Err(e) = connect_usecase.ensure_user(&user_id).await {
        tracing::warn!("Rejecting WebSocket for '{}': {}", user_id, e);
        return Err(e.into());
    }

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (handle, mut rx) = ConnectionHandle::channel(state.outbound_buffer);

    // Connecting -> Connected
    let connect_usecase = ConnectSessionUseCase::new(state.store.clone(), state.hub.clone());
    let connection_id = match connect_usecase.execute(user_id.clone(), handle).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("Failed to register connection for '{}': {}", user_id, e);
            return;
        }
    };

    // Greet the client so it knows events will now reach it
    state
        .broadcaster
        .send(&connection_id, &Event::status("Connected"));

    let (mut sender, mut receiver) = socket.split();

    // Spawn a task to push queued frames to this client
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender
                .send(Message::Text(frame.to_string().into()))
                .await
                .is_err()
            {
                break;
            }
        }
    });

    // Spawn a task to receive requests from this client
    let reader_state = state.clone();
    let reader_connection_id = connection_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_request(&reader_state, &reader_connection_id, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", reader_connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // * -> Disconnected
    DisconnectSessionUseCase::new(state.hub.clone())
        .execute(&connection_id)
        .await;
}

/// Apply one inbound request. Failures go back to this connection only.
async fn handle_request(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let request = match serde_json::from_str::<ClientRequest>(text) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Failed to parse request from '{}': {}", connection_id, e);
            reply_error(&state.broadcaster, connection_id, "Invalid request");
            return;
        }
    };

    match request {
        ClientRequest::Join { chat_id } => {
            let chat_id = match ChatId::new(chat_id) {
                Ok(id) => id,
                Err(e) => {
                    reply_error(&state.broadcaster, connection_id, &e.to_string());
                    return;
                }
            };
            let join_usecase =
                JoinRoomUseCase::new(state.authorizer.clone(), state.broadcaster.clone());
            if let Err(e) = join_usecase.execute(connection_id, chat_id).await {
                reply_error(&state.broadcaster, connection_id, &e.to_string());
            }
        }
        ClientRequest::Leave { chat_id } => match ChatId::new(chat_id) {
            Ok(chat_id) => {
                LeaveRoomUseCase::new(state.broadcaster.clone())
                    .execute(connection_id, chat_id)
                    .await;
            }
            Err(e) => reply_error(&state.broadcaster, connection_id, &e.to_string()),
        },
    }
}

fn reply_error(broadcaster: &Broadcaster, connection_id: &ConnectionId, msg: &str) {
    broadcaster.send(connection_id, &Event::status(format!("Error: {}", msg)));
}
