use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::User;
use crate::state::AppState;

/// Validated actor context for a lifecycle call. Session validation itself
/// is an upstream collaborator; this boundary resolves the authenticated
/// user id it forwards (`x-user-id`) against the registry and hands the
/// handlers a `{user, role}` they can run their own checks on.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Forbidden("missing x-user-id header".to_string()))?;

        let user_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::Forbidden("malformed x-user-id header".to_string()))?;

        let user = state
            .users
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::Forbidden(format!("unknown user {user_id}")))?;

        Ok(Self { user })
    }
}
