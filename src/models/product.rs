use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Core product entity, one row of the `products` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub cost: f64,
    /// Sale price
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Markup over cost as a percentage, rounded to two decimals.
    /// Zero when the product has no cost.
    pub fn margin(&self) -> f64 {
        compute_margin(self.cost, self.price)
    }
}

/// Zero when `cost` is zero or the ratio overflows `f64`, so the value always
/// serializes as a JSON number.
pub fn compute_margin(cost: f64, price: f64) -> f64 {
    if cost == 0.0 {
        return 0.0;
    }
    let margin = round2((price - cost) / cost * 100.0);
    if margin.is_finite() {
        margin
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A product as returned by the API, with its derived margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductRead {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub cost: f64,
    pub price: f64,
    /// (price - cost) / cost, in percent
    pub margin: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductRead {
    fn from(p: Product) -> Self {
        let margin = p.margin();
        Self {
            id: p.id,
            name: p.name,
            category: p.category,
            cost: p.cost,
            price: p.price,
            margin,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProduct {
    pub name: String,
    pub category: String,
    pub cost: f64,
    pub price: f64,
}

impl CreateProduct {
    /// Range checks the JSON extractor cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        check_amount("cost", self.cost)?;
        check_amount("price", self.price)
    }
}

/// Partial update: absent fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub category: Option<String>,
    pub cost: Option<f64>,
    pub price: Option<f64>,
}

impl UpdateProduct {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err("name must not be empty".to_string());
            }
        }
        if let Some(cost) = self.cost {
            check_amount("cost", cost)?;
        }
        if let Some(price) = self.price {
            check_amount("price", price)?;
        }
        Ok(())
    }
}

fn check_amount(field: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{field} must be a finite number >= 0"));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkIncrease {
    /// Percentage to add to every selected price, e.g. 10 for +10%
    pub percentage: f64,
    /// Restrict the increase to one category; the whole catalog when absent
    pub category: Option<String>,
    /// Free-text note appended to each history row
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkIncreaseOutcome {
    pub updated: u64,
    pub percentage: f64,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletedProduct {
    pub message: String,
    pub id: i64,
}

// ── Query parameters ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilters {
    /// Exact category match
    pub category: Option<String>,
    /// Substring of the product name
    pub name: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Page size (default 1000, between 1 and 10 000)
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
