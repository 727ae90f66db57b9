//! HTTP API endpoint handlers.
//!
//! Each handler parses its input into domain types, runs one use case and
//! maps the result to a response. Mutating use cases broadcast on their own
//! after committing.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    domain::{Chat, ChatId, ChatName, Message, MessageId, User, UserId},
    infrastructure::dto::http::{
        AddParticipantRequest, ChatDetailDto, ChatSummaryDto, ChatsResponse, CreateChatRequest,
        CreateUserRequest, MessageContentRequest, MessagesResponse, MsgResponse,
        UpdateProfileRequest, UsersResponse,
    },
    ui::{error::ApiError, extract::CurrentUser, state::AppState},
    usecase::{
        AddParticipantUseCase, ChatQueryUseCase, CreateChatUseCase, DeleteMessageUseCase,
        EditMessageUseCase, NewChat, RegisterUserUseCase, RemoveParticipantUseCase,
        SendMessageUseCase, UpdateProfileUseCase,
    },
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Register a user (no identity required)
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let usecase = RegisterUserUseCase::new(state.store.clone());
    let user = usecase.execute(body.username).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// The caller's own profile
pub async fn get_me(CurrentUser(caller): CurrentUser) -> Json<User> {
    Json(caller)
}

/// Update the caller's username and/or picture; 304 when nothing changed
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    let usecase = UpdateProfileUseCase::new(state.store.clone());
    let response = match usecase
        .execute(&caller.id, body.username, body.profile_picture)
        .await?
    {
        Some(user) => Json(user).into_response(),
        None => StatusCode::NOT_MODIFIED.into_response(),
    };
    Ok(response)
}

/// Every user except the caller
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Json<UsersResponse> {
    let users = ChatQueryUseCase::new(state.store.clone())
        .list_users(&caller.id)
        .await;
    Json(UsersResponse { users })
}

/// The caller's chats, most recently active first
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
) -> Json<ChatsResponse> {
    let chats = ChatQueryUseCase::new(state.store.clone())
        .list_chats(&caller.id)
        .await
        .into_iter()
        .map(|overview| ChatSummaryDto {
            chat: overview.chat,
            last_message: overview.last_message,
            participant_details: overview.participant_details,
        })
        .collect();
    Json(ChatsResponse { chats })
}

/// Create a direct chat (200 when it already exists) or a group chat
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(body): Json<CreateChatRequest>,
) -> Result<(StatusCode, Json<Chat>), ApiError> {
    let request = match body {
        CreateChatRequest::Direct { user_id } => NewChat::Direct {
            user_id: UserId::new(user_id)?,
        },
        CreateChatRequest::Group { name, participants } => NewChat::Group {
            name: ChatName::new(name)?,
            participants: participants
                .into_iter()
                .map(UserId::new)
                .collect::<Result<Vec<_>, _>>()?,
        },
    };

    let usecase = CreateChatUseCase::new(state.store.clone(), state.broadcaster.clone());
    let result = usecase.execute(&caller.id, request).await?;
    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(result.chat)))
}

/// Chat detail, visible to participants only
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatDetailDto>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let detail = ChatQueryUseCase::new(state.store.clone())
        .get_chat(&caller.id, &chat_id)
        .await?;
    Ok(Json(ChatDetailDto {
        chat: detail.chat,
        participant_details: detail.participant_details,
    }))
}

/// Owner adds a participant to a group
pub async fn add_participant(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(chat_id): Path<String>,
    Json(body): Json<AddParticipantRequest>,
) -> Result<Json<Chat>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let user_id = UserId::new(body.user_id)?;
    let usecase = AddParticipantUseCase::new(state.store.clone(), state.broadcaster.clone());
    let chat = usecase.execute(&caller.id, &chat_id, &user_id).await?;
    Ok(Json(chat))
}

/// Owner removes a participant from a group
pub async fn remove_participant(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path((chat_id, user_id)): Path<(String, String)>,
) -> Result<Json<Chat>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let user_id = UserId::new(user_id)?;
    let usecase = RemoveParticipantUseCase::new(state.store.clone(), state.broadcaster.clone());
    let chat = usecase.execute(&caller.id, &chat_id, &user_id).await?;
    Ok(Json(chat))
}

/// Message history in chronological order
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(chat_id): Path<String>,
) -> Result<Json<MessagesResponse>, ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let messages = ChatQueryUseCase::new(state.store.clone())
        .list_messages(&caller.id, &chat_id)
        .await?;
    Ok(Json(MessagesResponse { messages }))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(chat_id): Path<String>,
    Json(body): Json<MessageContentRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let chat_id = ChatId::new(chat_id)?;
    let usecase = SendMessageUseCase::new(state.store.clone(), state.broadcaster.clone());
    let message = usecase.execute(&caller.id, &chat_id, body.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn edit_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(message_id): Path<String>,
    Json(body): Json<MessageContentRequest>,
) -> Result<Json<Message>, ApiError> {
    let message_id = MessageId::new(message_id)?;
    let usecase = EditMessageUseCase::new(state.store.clone(), state.broadcaster.clone());
    let message = usecase.execute(&caller.id, &message_id, body.content).await?;
    Ok(Json(message))
}

pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Path(message_id): Path<String>,
) -> Result<Json<MsgResponse>, ApiError> {
    let message_id = MessageId::new(message_id)?;
    let usecase = DeleteMessageUseCase::new(state.store.clone(), state.broadcaster.clone());
    usecase.execute(&caller.id, &message_id).await?;
    Ok(Json(MsgResponse::new("Message deleted")))
}
