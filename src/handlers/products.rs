use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::{
    db,
    error::{AppError, AppResult, ErrorBody},
    export,
    models::{
        BulkIncrease, BulkIncreaseOutcome, CreateProduct, DeletedProduct, PriceHistory,
        ProductFilters, ProductRead, UpdateProduct,
    },
    pricing, AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(ProductFilters),
    responses((status = 200, description = "Matching products, ordered by id", body = [ProductRead]))
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilters>,
) -> AppResult<(StatusCode, Json<Vec<ProductRead>>)> {
    let products = db::fetch_all_products(&state.db, &filters).await?;

    info!(
        count = products.len(),
        category = filters.category.as_deref(),
        name = filters.name.as_deref(),
        "Listed products"
    );

    Ok((
        StatusCode::OK,
        Json(products.into_iter().map(ProductRead::from).collect()),
    ))
}

// ── Create ────────────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = ProductRead),
        (status = 400, description = "Out-of-range field", body = ErrorBody),
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<ProductRead>)> {
    payload.validate().map_err(AppError::BadRequest)?;

    let product = db::insert_product(&state.db, &payload).await?;

    info!(id = product.id, name = %product.name, category = %product.category, "Created product");

    Ok((StatusCode::CREATED, Json(product.into())))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, body = ProductRead),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<ProductRead>)> {
    let product = db::fetch_product_by_id(&state.db, id).await?;

    info!(id, "Fetched product");

    Ok((StatusCode::OK, Json(product.into())))
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Partial update. A price change is logged to the product's history.
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    request_body = UpdateProduct,
    responses(
        (status = 200, body = ProductRead),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProduct>,
) -> AppResult<(StatusCode, Json<ProductRead>)> {
    let product = pricing::apply_price_update(&state.db, id, &payload).await?;

    info!(id, price = product.price, "Updated product");

    Ok((StatusCode::OK, Json(product.into())))
}

// ── Delete ────────────────────────────────────────────────────────────────────

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, body = DeletedProduct),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<DeletedProduct>)> {
    db::delete_product(&state.db, id).await?;

    info!(id, "Deleted product");

    Ok((
        StatusCode::OK,
        Json(DeletedProduct {
            message: "Product deleted".to_string(),
            id,
        }),
    ))
}

// ── Bulk increase ─────────────────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/products/increase",
    tag = "pricing",
    request_body = BulkIncrease,
    responses(
        (status = 200, description = "Number of products raised", body = BulkIncreaseOutcome),
        (status = 400, description = "Percentage not > 0", body = ErrorBody),
    )
)]
pub async fn bulk_increase(
    State(state): State<AppState>,
    Json(payload): Json<BulkIncrease>,
) -> AppResult<(StatusCode, Json<BulkIncreaseOutcome>)> {
    let outcome = pricing::bulk_increase(&state.db, &payload).await?;
    Ok((StatusCode::OK, Json(outcome)))
}

// ── History ───────────────────────────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/products/{id}/history",
    tag = "pricing",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Price changes, newest first", body = [PriceHistory]),
        (status = 404, body = ErrorBody),
    )
)]
pub async fn price_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<Vec<PriceHistory>>)> {
    db::fetch_product_by_id(&state.db, id).await?;
    let history = db::fetch_price_history(&state.db, id).await?;

    info!(id, count = history.len(), "Listed price history");

    Ok((StatusCode::OK, Json(history)))
}

// ── GET /api/products/export/csv ──────────────────────────────────────────────

#[utoipa::path(
    get,
    path = "/api/products/export/csv",
    tag = "products",
    responses((status = 200, description = "Whole catalog as CSV", content_type = "text/csv", body = String))
)]
pub async fn export_csv(State(state): State<AppState>) -> AppResult<Response> {
    let products = db::fetch_products_in_scope(&state.db, None).await?;
    let rows: Vec<ProductRead> = products.into_iter().map(ProductRead::from).collect();
    let csv = export::products_to_csv(&rows)?;

    info!(count = rows.len(), "Exported catalog");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"products.csv\""),
        ],
        csv,
    )
        .into_response())
}
