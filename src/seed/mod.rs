use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;
use tracing::info;

use crate::db;
use crate::error::AppResult;
use crate::models::{CreateProduct, Product};

static CATEGORIES: &[&str] = &[
    "drinks",
    "food",
    "cleaning",
    "electronics",
    "clothing",
    "home",
    "toys",
    "books",
    "pets",
    "office",
];

static ADJECTIVES: &[&str] = &[
    "Premium", "Classic", "Eco", "Compact", "Deluxe", "Smart", "Basic", "Pro",
    "Family", "Mini", "Organic", "Light", "Extra", "Signature", "Essential",
];

static NOUNS: &[&str] = &[
    "Soda", "Coffee", "Snack", "Detergent", "Charger", "Shirt", "Lamp", "Puzzle",
    "Notebook", "Leash", "Stapler", "Juice", "Cereal", "Sponge", "Headphones",
];

/// Random product name: adjective + noun + serial suffix.
fn random_product_name(rng: &mut impl Rng, serial: usize) -> String {
    let adj = ADJECTIVES.choose(rng).unwrap_or(&"Standard");
    let noun = NOUNS.choose(rng).unwrap_or(&"Item");
    format!("{} {} #{:05}", adj, noun, serial)
}

fn random_product(rng: &mut impl Rng, serial: usize) -> CreateProduct {
    let cost: f64 = rng.gen_range(0.5..500.0);
    let markup: f64 = rng.gen_range(1.05..2.0);
    CreateProduct {
        name: random_product_name(rng, serial),
        category: CATEGORIES.choose(rng).unwrap_or(&"misc").to_string(),
        cost: (cost * 100.0).round() / 100.0,
        price: (cost * markup * 100.0).round() / 100.0,
    }
}

/// Insert `count` random products in a single transaction.
pub async fn seed_products(pool: &SqlitePool, count: usize) -> AppResult<Vec<Product>> {
    info!("Seeding {} products...", count);

    let mut rng = StdRng::from_entropy();
    let offset = db::count_products(pool).await?.max(0) as usize;
    let mut products = Vec::with_capacity(count);

    let mut tx = pool.begin().await?;
    for i in 0..count {
        let payload = random_product(&mut rng, offset + i);
        products.push(db::insert_product(&mut *tx, &payload).await?);
    }
    tx.commit().await?;

    info!("Seeding complete. Total: {} products", products.len());
    Ok(products)
}
