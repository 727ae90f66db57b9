//! Domain layer for the chat application.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{Chat, Message, ProfileChanges, User};
pub use error::{
    ChatError, InvariantViolation, RepositoryError, SessionError, ValueObjectError,
};
pub use event::{Event, Target};
pub use factory::IdFactory;
pub use repository::{ChatStore, ParticipantAuthorizer};
pub use session::{Session, SessionPhase};
pub use value_object::{
    ChatId, ChatName, ConnectionId, MessageContent, MessageId, RoomId, Timestamp, UserId,
    Username,
};
