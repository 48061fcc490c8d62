use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::{db, error::AppResult, seed, AppState};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SeedParams {
    /// Number of products to seed (default: 100, max: 10 000)
    pub count: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedOutcome {
    pub seeded: usize,
    pub total_in_db: i64,
}

// ── POST /api/seed ────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/seed",
    tag = "demo",
    params(SeedParams),
    responses((status = 200, description = "Random demo products inserted", body = SeedOutcome))
)]
pub async fn seed_data(
    State(state): State<AppState>,
    Query(params): Query<SeedParams>,
) -> AppResult<(StatusCode, Json<SeedOutcome>)> {
    let count = params.count.unwrap_or(100).min(10_000);

    let products = seed::seed_products(&state.db, count).await?;
    let total_in_db = db::count_products(&state.db).await?;

    info!(seeded = products.len(), total_in_db, "Seeding complete");

    Ok((
        StatusCode::OK,
        Json(SeedOutcome {
            seeded: products.len(),
            total_in_db,
        }),
    ))
}
