use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One price change. Rows are written once and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct PriceHistory {
    pub id: i64,
    /// Lookup key of the product; not enforced as a foreign key
    pub product_id: i64,
    pub previous_price: f64,
    pub new_price: f64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}
