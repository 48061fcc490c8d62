use utoipa::OpenApi;

use crate::error::ErrorBody;
use crate::handlers::{products, seed};
use crate::models::{
    BulkIncrease, BulkIncreaseOutcome, CreateProduct, DeletedProduct, PriceHistory, ProductRead,
    UpdateProduct,
};

/// OpenAPI document served at `/api-docs/openapi.json` and browsed at `/docs`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Price manager",
        description = "REST API for products, prices and bulk price increases."
    ),
    paths(
        products::list_products,
        products::create_product,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::bulk_increase,
        products::price_history,
        products::export_csv,
        seed::seed_data,
    ),
    components(schemas(
        ProductRead,
        CreateProduct,
        UpdateProduct,
        DeletedProduct,
        BulkIncrease,
        BulkIncreaseOutcome,
        PriceHistory,
        ErrorBody,
        seed::SeedOutcome,
    )),
    tags(
        (name = "products", description = "Catalog CRUD"),
        (name = "pricing", description = "Bulk increases and price history"),
        (name = "demo", description = "Demo data"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/products",
            "/api/products/{id}",
            "/api/products/increase",
            "/api/products/{id}/history",
            "/api/products/export/csv",
            "/api/seed",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
