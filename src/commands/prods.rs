//! `prods`: list the organization's products.

use crate::api::types::Product;
use crate::config::Config;
use crate::formatters::table::format_products_table;
use crate::formatters::{output, to_json, ProductRow};
use crate::shared::Result;

pub fn execute(config: &Config, json: bool) -> Result<()> {
    let client = super::client(config)?;
    let organization = client.fetch_organization()?;
    let rows = product_rows(&organization.products);

    let rendered = if json {
        to_json(&rows)?
    } else {
        format_products_table(&rows)
    };
    output::present(&rendered, None)?;
    Ok(())
}

fn product_rows(products: &[Product]) -> Vec<ProductRow> {
    products
        .iter()
        .map(|product| ProductRow {
            name: product.name.clone(),
            updated_at: product.updated_at.clone(),
            id: product.id.clone(),
            versions: product
                .environments
                .iter()
                .map(|env| env.versions.len())
                .sum(),
        })
        .collect()
}
