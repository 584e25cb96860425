use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::ApiResponse;
use crate::auth::AuthContext;
use crate::engine::orchestrator::{self, PickupDraft, TrackingView};
use crate::error::AppError;
use crate::models::pickup::{Address, Pickup, PickupSlot, PickupStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/pickups", post(create_pickup).get(list_pickups))
        .route("/pickups/:id", get(get_pickup))
        .route("/pickups/:id/accept", post(accept_pickup))
        .route("/pickups/:id/status", post(advance_pickup))
        .route("/pickups/:id/cancel", post(cancel_pickup))
        .route("/track/:code", get(track_pickup))
}

#[derive(Deserialize)]
pub struct CreatePickupRequest {
    pub package_ids: Vec<Uuid>,
    pub scheduled_date: NaiveDate,
    pub scheduled_slot: PickupSlot,
    pub address: Address,
}

#[derive(Deserialize)]
pub struct AdvanceRequest {
    pub target: PickupStatus,
}

async fn create_pickup(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<CreatePickupRequest>,
) -> Result<Json<ApiResponse<Pickup>>, AppError> {
    let pickup = orchestrator::create_pickup(
        &state,
        &auth.user,
        PickupDraft {
            package_ids: payload.package_ids,
            scheduled_date: payload.scheduled_date,
            scheduled_slot: payload.scheduled_slot,
            address: payload.address,
        },
    )
    .await?;

    Ok(ApiResponse::ok("pickup scheduled", pickup))
}

async fn list_pickups(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Json<ApiResponse<Vec<Pickup>>> {
    let pickups = orchestrator::list_pickups(&state, &auth.user).await;
    ApiResponse::ok("pickups", pickups)
}

async fn get_pickup(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Pickup>>, AppError> {
    let pickup = orchestrator::get_pickup(&state, id, &auth.user).await?;
    Ok(ApiResponse::ok("pickup", pickup))
}

async fn accept_pickup(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Pickup>>, AppError> {
    let pickup = orchestrator::accept_pickup(&state, id, &auth.user).await?;
    Ok(ApiResponse::ok("pickup accepted", pickup))
}

async fn advance_pickup(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdvanceRequest>,
) -> Result<Json<ApiResponse<Pickup>>, AppError> {
    let pickup = orchestrator::advance_pickup(&state, id, payload.target, &auth.user).await?;
    Ok(ApiResponse::ok("pickup updated", pickup))
}

async fn cancel_pickup(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Pickup>>, AppError> {
    let pickup =
        orchestrator::advance_pickup(&state, id, PickupStatus::Cancelled, &auth.user).await?;
    Ok(ApiResponse::ok("pickup cancelled", pickup))
}

async fn track_pickup(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<TrackingView>>, AppError> {
    let view = orchestrator::track_pickup(&state, &code).await?;
    Ok(ApiResponse::ok("tracking", view))
}
