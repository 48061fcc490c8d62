//! Price-changing operations. Each one logs a `price_history` row before the
//! product row it describes is written, inside the same transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{BulkIncrease, BulkIncreaseOutcome, Product, UpdateProduct};

pub const MANUAL_UPDATE_REASON: &str = "manual update";

/// Apply a partial update, logging the old and new price when the price moves.
///
/// The transaction opens with a write so SQLite takes the write lock up front
/// and concurrent edits queue on the busy timeout instead of failing.
pub async fn apply_price_update(pool: &SqlitePool, id: i64, changes: &UpdateProduct) -> AppResult<Product> {
    changes.validate().map_err(AppError::BadRequest)?;

    let mut tx = pool.begin().await?;

    if let Some(new_price) = changes.price {
        let logged = db::record_manual_price(&mut *tx, id, new_price, MANUAL_UPDATE_REASON, Utc::now()).await?;
        if logged > 0 {
            debug!(id, new = new_price, "Recorded price change");
        }
    }

    // NotFound here drops `tx`, rolling back any history row.
    let updated = db::update_product(&mut *tx, id, changes).await?;
    tx.commit().await?;

    Ok(updated)
}

/// Raise the price of every product in `request.category` (or the whole
/// catalog) by `request.percentage` percent.
///
/// Each product is committed on its own: if a later product fails, the ones
/// already raised stay raised.
pub async fn bulk_increase(pool: &SqlitePool, request: &BulkIncrease) -> AppResult<BulkIncreaseOutcome> {
    if !request.percentage.is_finite() || request.percentage <= 0.0 {
        return Err(AppError::BadRequest("percentage must be a number > 0".to_string()));
    }

    let category = request.category.as_deref();
    let factor = 1.0 + request.percentage / 100.0;
    let reason = bulk_reason(request.percentage, category, request.reason.as_deref());

    let products = db::fetch_products_in_scope(pool, category).await?;
    if let Some(product) = products.iter().find(|p| !(p.price * factor).is_finite()) {
        return Err(AppError::BadRequest(format!(
            "percentage {} would push the price of product {} out of range",
            request.percentage, product.id
        )));
    }
    let mut updated = 0_u64;

    for product in &products {
        let mut tx = pool.begin().await?;
        let logged = db::record_scaled_price(&mut *tx, product.id, factor, &reason, Utc::now()).await?;
        if logged == 0 {
            // Deleted since selection.
            warn!(id = product.id, "Product vanished during bulk increase, skipped");
            continue;
        }
        if db::apply_scaled_price(&mut *tx, product.id, factor).await?.is_some() {
            tx.commit().await?;
            updated += 1;
        }
    }

    info!(
        updated,
        selected = products.len(),
        percentage = request.percentage,
        category = category.unwrap_or("all"),
        "Bulk increase applied"
    );

    Ok(BulkIncreaseOutcome {
        updated,
        percentage: request.percentage,
        category: request.category.clone(),
    })
}

fn bulk_reason(percentage: f64, category: Option<&str>, note: Option<&str>) -> String {
    let base = format!("bulk increase {}% [{}]", percentage, category.unwrap_or("all"));
    match note.map(str::trim) {
        Some(note) if !note.is_empty() => format!("{base}: {note}"),
        _ => base,
    }
}
