//! Shared utilities for roomcast: logging setup and time helpers.

pub mod logger;
pub mod time;
