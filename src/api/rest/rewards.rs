use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::rest::ApiResponse;
use crate::auth::AuthContext;
use crate::engine::orchestrator;
use crate::error::AppError;
use crate::models::rewards::{LedgerEntry, RewardAccount};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rewards", get(reward_summary))
        .route("/rewards/ledger", get(ledger_history))
        .route("/rewards/redeem", post(redeem))
}

#[derive(Serialize)]
struct RewardSummary {
    account: RewardAccount,
    bonus_multiplier: f64,
    next_tier_at: Option<i64>,
}

#[derive(Deserialize)]
pub struct RedeemRequest {
    pub points: i64,
    pub description: Option<String>,
}

async fn reward_summary(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Json<ApiResponse<RewardSummary>> {
    let db = state.db.read().await;

    let account = db
        .reward_accounts
        .get(&auth.user.id)
        .cloned()
        .unwrap_or_else(|| RewardAccount::new(auth.user.id, Utc::now()));

    let summary = RewardSummary {
        bonus_multiplier: account.tier.bonus_multiplier(),
        next_tier_at: account.tier.next_threshold(),
        account,
    };

    ApiResponse::ok("rewards", summary)
}

async fn ledger_history(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Json<ApiResponse<Vec<LedgerEntry>>> {
    let db = state.db.read().await;

    let mut entries: Vec<LedgerEntry> = db
        .ledger
        .iter()
        .filter(|entry| entry.user_id == auth.user.id)
        .cloned()
        .collect();
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    ApiResponse::ok("ledger", entries)
}

async fn redeem(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<ApiResponse<RewardAccount>>, AppError> {
    let account =
        orchestrator::redeem_points(&state, &auth.user, payload.points, payload.description)
            .await?;

    Ok(ApiResponse::ok("points redeemed", account))
}
