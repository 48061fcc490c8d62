//! HTTP-level tests for the product, pricing and docs endpoints.
//!
//! Requests go straight into the router through tower::ServiceExt, each test
//! on its own in-memory store.

mod common;

use axum::http::{header, StatusCode};
use common::{body_bytes, body_json, create_product, delete, get, patch_json, post_json, put_json};
use serde_json::json;

// ---------------------------------------------------------------------------
// Health & docs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_store_status() {
    let (app, _pool) = common::test_app().await;
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (app, _pool) = common::test_app().await;
    let response = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["paths"]["/api/products/increase"]["post"].is_object());
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_returns_201_and_round_trips() {
    let (app, _pool) = common::test_app().await;
    let response = post_json(
        &app,
        "/api/products",
        json!({ "name": "Cola", "category": "drinks", "cost": 40.0, "price": 100.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert!(created["id"].is_number());
    assert_eq!(created["margin"], 150.0);

    let id = created["id"].as_i64().unwrap();
    let response = get(&app, &format!("/api/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, created);
}

#[tokio::test]
async fn create_with_blank_name_is_400() {
    let (app, _pool) = common::test_app().await;
    let response = post_json(
        &app,
        "/api/products",
        json!({ "name": " ", "category": "drinks", "cost": 1.0, "price": 2.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn create_with_missing_field_is_rejected_by_shape_validation() {
    let (app, _pool) = common::test_app().await;
    let response = post_json(&app, "/api/products", json!({ "name": "Cola", "price": 2.0 })).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_with_wrong_type_is_rejected_by_shape_validation() {
    let (app, _pool) = common::test_app().await;
    let response = post_json(
        &app,
        "/api/products",
        json!({ "name": "Cola", "category": "drinks", "cost": "cheap", "price": 2.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_missing_product_is_404() {
    let (app, _pool) = common::test_app().await;
    let response = get(&app, "/api/products/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn list_filters_by_category_in_stable_order() {
    let (app, _pool) = common::test_app().await;
    create_product(&app, "Cola", "drinks", 1.0, 2.0).await;
    create_product(&app, "Bread", "food", 1.0, 2.0).await;
    create_product(&app, "Juice", "drinks", 1.0, 3.0).await;

    let first = body_json(get(&app, "/api/products?category=drinks").await).await;
    let second = body_json(get(&app, "/api/products?category=drinks").await).await;

    let names: Vec<&str> = first
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Cola", "Juice"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn list_filters_by_name_substring() {
    let (app, _pool) = common::test_app().await;
    create_product(&app, "Orange Juice", "drinks", 1.0, 2.0).await;
    create_product(&app, "Bread", "food", 1.0, 2.0).await;

    let json = body_json(get(&app, "/api/products?name=Juice").await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["name"], "Orange Juice");
}

#[tokio::test]
async fn put_updates_fields_and_logs_price_change() {
    let (app, _pool) = common::test_app().await;
    let id = create_product(&app, "Cola", "drinks", 40.0, 100.0).await;

    let response = put_json(&app, &format!("/api/products/{id}"), json!({ "price": 120.0 })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["price"], 120.0);
    assert_eq!(json["name"], "Cola");

    let history = body_json(get(&app, &format!("/api/products/{id}/history")).await).await;
    let rows = history.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["previous_price"], 100.0);
    assert_eq!(rows[0]["new_price"], 120.0);
    assert_eq!(rows[0]["reason"], "manual update");
}

#[tokio::test]
async fn patch_with_same_price_logs_nothing() {
    let (app, _pool) = common::test_app().await;
    let id = create_product(&app, "Cola", "drinks", 40.0, 100.0).await;

    let response = patch_json(
        &app,
        &format!("/api/products/{id}"),
        json!({ "price": 100.0, "category": "sodas" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["category"], "sodas");

    let history = body_json(get(&app, &format!("/api/products/{id}/history")).await).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn history_lists_newest_first() {
    let (app, _pool) = common::test_app().await;
    let id = create_product(&app, "Cola", "drinks", 40.0, 100.0).await;
    put_json(&app, &format!("/api/products/{id}"), json!({ "price": 110.0 })).await;
    put_json(&app, &format!("/api/products/{id}"), json!({ "price": 130.0 })).await;

    let history = body_json(get(&app, &format!("/api/products/{id}/history")).await).await;
    let new_prices: Vec<f64> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["new_price"].as_f64().unwrap())
        .collect();
    assert_eq!(new_prices, vec![130.0, 110.0]);
}

#[tokio::test]
async fn update_missing_product_is_404() {
    let (app, _pool) = common::test_app().await;
    let response = put_json(&app, "/api/products/12", json!({ "price": 1.0 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_of_missing_product_is_404() {
    let (app, _pool) = common::test_app().await;
    let response = get(&app, "/api/products/12/history").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_the_product() {
    let (app, _pool) = common::test_app().await;
    let id = create_product(&app, "Cola", "drinks", 1.0, 2.0).await;

    let response = delete(&app, &format!("/api/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id);

    let response = get(&app, &format!("/api/products/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_missing_product_is_404_and_changes_nothing() {
    let (app, pool) = common::test_app().await;
    create_product(&app, "Cola", "drinks", 1.0, 2.0).await;

    let response = delete(&app, "/api/products/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(price_manager::db::count_products(&pool).await.unwrap(), 1);
}

// ---------------------------------------------------------------------------
// Bulk increase
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_increase_raises_only_the_category() {
    let (app, _pool) = common::test_app().await;
    let drink = create_product(&app, "Cola", "drinks", 40.0, 100.0).await;
    let food = create_product(&app, "Bread", "food", 20.0, 50.0).await;

    let response = post_json(
        &app,
        "/api/products/increase",
        json!({ "percentage": 10, "category": "drinks" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["updated"], 1);
    assert_eq!(outcome["category"], "drinks");

    let drink_json = body_json(get(&app, &format!("/api/products/{drink}")).await).await;
    let food_json = body_json(get(&app, &format!("/api/products/{food}")).await).await;
    assert_eq!(drink_json["price"], 110.0);
    assert_eq!(food_json["price"], 50.0);

    let drink_history = body_json(get(&app, &format!("/api/products/{drink}/history")).await).await;
    let food_history = body_json(get(&app, &format!("/api/products/{food}/history")).await).await;
    assert_eq!(drink_history.as_array().unwrap().len(), 1);
    assert_eq!(drink_history[0]["reason"], "bulk increase 10% [drinks]");
    assert!(food_history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn bulk_increase_with_zero_percentage_is_400() {
    let (app, _pool) = common::test_app().await;
    let id = create_product(&app, "Cola", "drinks", 40.0, 100.0).await;

    let response = post_json(&app, "/api/products/increase", json!({ "percentage": 0 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let product = body_json(get(&app, &format!("/api/products/{id}")).await).await;
    assert_eq!(product["price"], 100.0);
}

// ---------------------------------------------------------------------------
// Export & seed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn export_csv_has_one_line_per_product() {
    let (app, _pool) = common::test_app().await;
    create_product(&app, "Cola", "drinks", 1.0, 2.0).await;
    create_product(&app, "Bread", "food", 1.0, 2.0).await;

    let response = get(&app, "/api/products/export/csv").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert_eq!(body.lines().count(), 3);
    assert!(body.starts_with("id,name,category,cost,price,margin"));
}

#[tokio::test]
async fn seed_inserts_requested_count() {
    let (app, _pool) = common::test_app().await;
    let response = post_json(&app, "/api/seed?count=12", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["seeded"], 12);
    assert_eq!(json["total_in_db"], 12);

    let products = body_json(get(&app, "/api/products").await).await;
    assert_eq!(products.as_array().unwrap().len(), 12);
}
