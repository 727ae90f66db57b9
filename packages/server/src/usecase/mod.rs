//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。
//! 変更系のユースケースは「永続化（コミット）→ 配信」の順で処理し、
//! 配信の失敗が結果に影響することはありません。

pub mod add_participant;
pub mod chat_queries;
pub mod connect_session;
pub mod create_chat;
pub mod delete_message;
pub mod disconnect_session;
pub mod edit_message;
pub mod error;
pub mod join_room;
pub mod leave_room;
pub mod register_user;
pub mod remove_participant;
pub mod send_message;
pub mod update_profile;

#[cfg(test)]
pub(crate) mod test_support;

pub use add_participant::AddParticipantUseCase;
pub use chat_queries::{ChatDetail, ChatOverview, ChatQueryUseCase};
pub use connect_session::ConnectSessionUseCase;
pub use create_chat::{CreateChatUseCase, CreatedChat, NewChat};
pub use delete_message::DeleteMessageUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use edit_message::EditMessageUseCase;
pub use error::{CommandError, ConnectError};
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use register_user::RegisterUserUseCase;
pub use remove_participant::RemoveParticipantUseCase;
pub use send_message::SendMessageUseCase;
pub use update_profile::UpdateProfileUseCase;
