//! Realtime layer: live connections, rooms, and event fan-out.

mod broadcaster;
mod connection;
mod directory;
mod hub;
mod registry;

pub use broadcaster::{Broadcaster, DeliveryReport};
pub use connection::{ConnectionHandle, Delivery, DropReason, OutboundFrame};
pub use directory::RoomDirectory;
pub use hub::RoomHub;
pub use registry::ConnectionRegistry;
