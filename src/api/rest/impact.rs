use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use chrono::Utc;

use crate::api::rest::ApiResponse;
use crate::auth::AuthContext;
use crate::models::impact::ImpactAccount;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/impact", get(impact_summary))
}

async fn impact_summary(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
) -> Json<ApiResponse<ImpactAccount>> {
    let db = state.db.read().await;

    let account = db
        .impact_accounts
        .get(&auth.user.id)
        .cloned()
        .unwrap_or_else(|| ImpactAccount::new(auth.user.id, Utc::now()));

    ApiResponse::ok("impact", account)
}
