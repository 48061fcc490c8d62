//! Persistence layer: pool setup and row-level queries for `products` and
//! `price_history`.
//!
//! Query functions take any sqlx executor, so the same call works against the
//! pool or inside a transaction opened by the pricing layer.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::*;

const PRODUCT_COLUMNS: &str = "id, name, category, cost, price, created_at, updated_at";
const HISTORY_COLUMNS: &str = "id, product_id, previous_price, new_price, reason, created_at";

// ── Pool ──────────────────────────────────────────────────────────────────────

/// Open (creating if missing) the database file and apply pending migrations.
pub async fn connect(database_url: &str, max_connections: u32) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await?;
    info!(url = %database_url, max_connections, "Database pool established");

    migrate(&pool).await?;
    Ok(pool)
}

/// Isolated in-memory store with the full schema. An in-memory database lives
/// only as long as its connection, so the pool holds exactly one forever.
pub async fn connect_in_memory() -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> AppResult<()> {
    info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    info!("Migrations complete.");
    Ok(())
}

// ── Products ──────────────────────────────────────────────────────────────────

pub async fn fetch_all_products<'e, E>(executor: E, filters: &ProductFilters) -> AppResult<Vec<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let limit = filters.limit.unwrap_or(1000).clamp(1, 10_000);
    let offset = filters.offset.unwrap_or(0).max(0);

    let products = sqlx::query_as::<_, Product>(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}
        FROM products
        WHERE (?1 IS NULL OR category = ?1)
          AND (?2 IS NULL OR name LIKE '%' || ?2 || '%')
          AND (?3 IS NULL OR price >= ?3)
          AND (?4 IS NULL OR price <= ?4)
        ORDER BY id ASC
        LIMIT ?5 OFFSET ?6
        "#
    ))
    .bind(filters.category.as_deref())
    .bind(filters.name.as_deref())
    .bind(filters.min_price)
    .bind(filters.max_price)
    .bind(limit)
    .bind(offset)
    .fetch_all(executor)
    .await?;

    Ok(products)
}

/// Every product in `category`, or the whole catalog when `None`. Unbounded.
pub async fn fetch_products_in_scope<'e, E>(executor: E, category: Option<&str>) -> AppResult<Vec<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products
         WHERE (?1 IS NULL OR category = ?1)
         ORDER BY id ASC"
    ))
    .bind(category)
    .fetch_all(executor)
    .await?;

    Ok(products)
}

pub async fn fetch_product_by_id<'e, E>(executor: E, id: i64) -> AppResult<Product>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| product_not_found(id))
}

pub async fn insert_product<'e, E>(executor: E, payload: &CreateProduct) -> AppResult<Product>
where
    E: Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        INSERT INTO products (name, category, cost, price, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(payload.name.trim())
    .bind(&payload.category)
    .bind(payload.cost)
    .bind(payload.price)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(product)
}

/// Partial update; `None` fields keep the stored value.
pub async fn update_product<'e, E>(executor: E, id: i64, payload: &UpdateProduct) -> AppResult<Product>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET name       = COALESCE(?1, name),
            category   = COALESCE(?2, category),
            cost       = COALESCE(?3, cost),
            price      = COALESCE(?4, price),
            updated_at = ?5
        WHERE id = ?6
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(payload.name.as_deref().map(str::trim))
    .bind(payload.category.as_deref())
    .bind(payload.cost)
    .bind(payload.price)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| product_not_found(id))
}

pub async fn delete_product<'e, E>(executor: E, id: i64) -> AppResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM products WHERE id = ?1")
        .bind(id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(product_not_found(id));
    }
    Ok(())
}

pub async fn count_products<'e, E>(executor: E) -> AppResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

/// Set the price of one product to `ROUND(price * factor, 2)`.
/// Returns `None` when the product no longer exists.
pub async fn apply_scaled_price<'e, E>(executor: E, id: i64, factor: f64) -> AppResult<Option<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let product = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET price      = ROUND(price * ?1, 2),
            updated_at = ?2
        WHERE id = ?3
        RETURNING {PRODUCT_COLUMNS}
        "#
    ))
    .bind(factor)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(product)
}

fn product_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Product {} not found", id))
}

// ── Price history ─────────────────────────────────────────────────────────────

pub async fn insert_price_history<'e, E>(
    executor: E,
    product_id: i64,
    previous_price: f64,
    new_price: f64,
    reason: &str,
) -> AppResult<PriceHistory>
where
    E: Executor<'e, Database = Sqlite>,
{
    let entry = sqlx::query_as::<_, PriceHistory>(&format!(
        r#"
        INSERT INTO price_history (product_id, previous_price, new_price, reason, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING {HISTORY_COLUMNS}
        "#
    ))
    .bind(product_id)
    .bind(previous_price)
    .bind(new_price)
    .bind(reason)
    .bind(Utc::now())
    .fetch_one(executor)
    .await?;

    Ok(entry)
}

/// Log a manual move to `new_price`, reading the current price in the same
/// statement. Writes nothing when the product is gone or already at that price.
pub async fn record_manual_price<'e, E>(
    executor: E,
    product_id: i64,
    new_price: f64,
    reason: &str,
    at: DateTime<Utc>,
) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO price_history (product_id, previous_price, new_price, reason, created_at)
        SELECT id, price, ?2, ?3, ?4
        FROM products
        WHERE id = ?1 AND price <> ?2
        "#,
    )
    .bind(product_id)
    .bind(new_price)
    .bind(reason)
    .bind(at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Log the change [`apply_scaled_price`] is about to make, reading the current
/// price in the same statement. Returns the number of rows written (0 when the
/// product is gone).
pub async fn record_scaled_price<'e, E>(
    executor: E,
    product_id: i64,
    factor: f64,
    reason: &str,
    at: DateTime<Utc>,
) -> AppResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO price_history (product_id, previous_price, new_price, reason, created_at)
        SELECT id, price, ROUND(price * ?2, 2), ?3, ?4
        FROM products
        WHERE id = ?1
        "#,
    )
    .bind(product_id)
    .bind(factor)
    .bind(reason)
    .bind(at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// History of one product, newest first.
pub async fn fetch_price_history<'e, E>(executor: E, product_id: i64) -> AppResult<Vec<PriceHistory>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, PriceHistory>(&format!(
        "SELECT {HISTORY_COLUMNS} FROM price_history
         WHERE product_id = ?1
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(product_id)
    .fetch_all(executor)
    .await?;

    Ok(rows)
}
