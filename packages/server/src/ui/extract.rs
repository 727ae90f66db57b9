//! Caller identity.
//!
//! Authentication is out of scope; the caller names itself with the
//! `x-user-id` header and must be a registered user.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::domain::{ChatStore, User, UserId};

use super::{error::ApiError, state::AppState};

pub const USER_ID_HEADER: &str = "x-user-id";

/// The registered user making the request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing x-user-id header"))?;
        let user_id = UserId::new(raw.to_string())
            .map_err(|_| ApiError::unauthorized("Invalid x-user-id header"))?;
        let user = state
            .store
            .find_user(&user_id)
            .await
            .map_err(|_| ApiError::unauthorized(format!("Unknown user: {}", user_id)))?;
        Ok(CurrentUser(user))
    }
}
