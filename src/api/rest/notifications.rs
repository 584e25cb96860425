use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use uuid::Uuid;

use crate::api::rest::ApiResponse;
use crate::auth::AuthContext;
use crate::error::AppError;
use crate::models::notification::Notification;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id/read", post(mark_read))
}

async fn list_notifications(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Json<ApiResponse<Vec<Notification>>> {
    let db = state.db.read().await;

    let mut notifications: Vec<Notification> = db
        .notifications
        .iter()
        .filter(|n| n.user_id == auth.user.id)
        .cloned()
        .collect();
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    ApiResponse::ok("notifications", notifications)
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Notification>>, AppError> {
    let mut db = state.db.write().await;

    let notification = db
        .notifications
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(|| AppError::NotFound(format!("notification {id} not found")))?;

    if notification.user_id != auth.user.id {
        return Err(AppError::Forbidden(
            "notification belongs to another user".to_string(),
        ));
    }

    notification.is_read = true;
    Ok(ApiResponse::ok("notification read", notification.clone()))
}
