//! Price manager: a REST API over a SQLite catalog of products, with a
//! per-product price history and percentage-based bulk increases.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod export;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod seed;

/// Shared application state. The pool is the only thing requests share.
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::SqlitePool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(handlers::health))

        // ── Products CRUD ───────────────────────────────────────────────────
        .route(
            "/api/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/api/products/:id",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .patch(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )

        // ── Pricing ─────────────────────────────────────────────────────────
        .route("/api/products/increase", post(handlers::products::bulk_increase))
        .route(
            "/api/products/:id/history",
            get(handlers::products::price_history),
        )

        // ── Export / demo data ──────────────────────────────────────────────
        .route("/api/products/export/csv", get(handlers::products::export_csv))
        .route("/api/seed", post(handlers::seed::seed_data))

        // ── Docs ────────────────────────────────────────────────────────────
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
