use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::ApiResponse;
use crate::auth::AuthContext;
use crate::error::AppError;
use crate::models::user::{Role, User};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/verify", patch(verify_user))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub role: Role,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidRequest("name cannot be empty".to_string()));
    }

    let user = User {
        id: Uuid::new_v4(),
        name: payload.name,
        role: payload.role,
        verified: payload.role != Role::Recycler,
        created_at: Utc::now(),
    };

    state.users.insert(user.id, user.clone());
    Ok(ApiResponse::ok("user created", user))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    _auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state
        .users
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;

    Ok(ApiResponse::ok("user", user))
}

async fn verify_user(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    if !auth.user.is_admin() {
        return Err(AppError::Forbidden("only admins verify collectors".to_string()));
    }

    let mut user = state
        .users
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("user {id} not found")))?;

    user.verified = true;
    Ok(ApiResponse::ok("collector verified", user.clone()))
}
