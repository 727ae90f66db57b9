//! Infrastructure layer: concrete stores, the realtime hub, and wire DTOs.

pub mod dto;
pub mod realtime;
pub mod repository;
