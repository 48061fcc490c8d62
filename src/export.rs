use crate::models::ProductRead;

/// Render products as CSV, one row per product with its margin.
pub fn products_to_csv(products: &[ProductRead]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "id",
        "name",
        "category",
        "cost",
        "price",
        "margin",
        "created_at",
        "updated_at",
    ])?;

    for p in products {
        wtr.write_record([
            p.id.to_string(),
            p.name.clone(),
            p.category.clone(),
            format!("{:.2}", p.cost),
            format!("{:.2}", p.price),
            format!("{:.2}", p.margin),
            p.created_at.to_rfc3339(),
            p.updated_at.to_rfc3339(),
        ])?;
    }

    let data = wtr.into_inner()?;
    Ok(String::from_utf8(data)?)
}
