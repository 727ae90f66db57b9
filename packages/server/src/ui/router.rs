//! Route table.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use super::{handler, state::AppState};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/health", get(handler::health_check))
        .route(
            "/api/users",
            get(handler::list_users).post(handler::create_user),
        )
        .route(
            "/api/users/me",
            get(handler::get_me).put(handler::update_me),
        )
        .route(
            "/api/chats",
            get(handler::list_chats).post(handler::create_chat),
        )
        .route("/api/chats/{chat_id}", get(handler::get_chat))
        .route(
            "/api/chats/{chat_id}/participants",
            post(handler::add_participant),
        )
        .route(
            "/api/chats/{chat_id}/participants/{user_id}",
            delete(handler::remove_participant),
        )
        .route(
            "/api/chats/{chat_id}/messages",
            get(handler::list_messages).post(handler::send_message),
        )
        .route(
            "/api/messages/{message_id}",
            put(handler::edit_message).delete(handler::delete_message),
        );

    // WebSocket endpoint (identity via query param, not header)
    let ws_routes = Router::new().route("/ws", get(handler::websocket_handler));

    Router::new()
        .merge(api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
