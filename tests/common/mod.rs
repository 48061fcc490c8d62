#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, Response};
use axum::Router;
use sqlx::SqlitePool;
use tower::ServiceExt;

use price_manager::{build_router, db, AppState};

/// Fresh in-memory store plus the production router on top of it.
pub async fn test_app() -> (Router, SqlitePool) {
    let pool = db::connect_in_memory().await.unwrap();
    let app = build_router(AppState { db: pool.clone() });
    (app, pool)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(json)).await
}

pub async fn put_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(json)).await
}

pub async fn patch_json(app: &Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(json)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Create a product through the API and return its id.
pub async fn create_product(app: &Router, name: &str, category: &str, cost: f64, price: f64) -> i64 {
    let response = post_json(
        app,
        "/api/products",
        serde_json::json!({ "name": name, "category": category, "cost": cost, "price": price }),
    )
    .await;
    body_json(response).await["id"].as_i64().unwrap()
}
