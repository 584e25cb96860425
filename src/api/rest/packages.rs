use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::ApiResponse;
use crate::auth::AuthContext;
use crate::engine::registry::{self, PackageChanges};
use crate::error::AppError;
use crate::models::package::{Package, PackageCondition, PackageKind};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/packages", post(create_package).get(list_packages))
        .route(
            "/packages/:id",
            get(get_package).patch(update_package).delete(delete_package),
        )
}

#[derive(Deserialize)]
pub struct CreatePackageRequest {
    pub kind: PackageKind,
    pub condition: PackageCondition,
    pub quantity: u32,
    pub weight_kg: Option<f64>,
}

#[derive(Deserialize)]
pub struct UpdatePackageRequest {
    pub kind: Option<PackageKind>,
    pub condition: Option<PackageCondition>,
    pub quantity: Option<u32>,
    pub weight_kg: Option<f64>,
}

async fn create_package(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<CreatePackageRequest>,
) -> Result<Json<ApiResponse<Package>>, AppError> {
    let mut db = state.db.write().await;
    let package = registry::create_package(
        &mut db,
        auth.user.id,
        payload.kind,
        payload.condition,
        payload.quantity,
        payload.weight_kg,
        Utc::now(),
    )?;

    Ok(ApiResponse::ok("package listed", package))
}

async fn list_packages(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Json<ApiResponse<Vec<Package>>> {
    let db = state.db.read().await;

    let mut packages: Vec<Package> = db
        .packages
        .values()
        .filter(|p| auth.user.is_admin() || p.owner_id == auth.user.id)
        .cloned()
        .collect();
    packages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    ApiResponse::ok("packages", packages)
}

async fn get_package(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Package>>, AppError> {
    let db = state.db.read().await;
    let package = db.package(id)?;

    if !auth.user.is_admin() && package.owner_id != auth.user.id {
        return Err(AppError::Forbidden("package belongs to another owner".to_string()));
    }

    Ok(ApiResponse::ok("package", package.clone()))
}

async fn update_package(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePackageRequest>,
) -> Result<Json<ApiResponse<Package>>, AppError> {
    let mut db = state.db.write().await;
    let package = registry::update_package(
        &mut db,
        id,
        auth.user.id,
        PackageChanges {
            kind: payload.kind,
            condition: payload.condition,
            quantity: payload.quantity,
            weight_kg: payload.weight_kg,
        },
        Utc::now(),
    )?;

    Ok(ApiResponse::ok("package updated", package))
}

async fn delete_package(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let mut db = state.db.write().await;
    registry::delete_package(&mut db, id, auth.user.id)?;

    Ok(ApiResponse::ok("package deleted", ()))
}
