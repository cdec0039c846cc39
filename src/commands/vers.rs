//! `vers`: list the versions of one product environment.

use crate::api::types::VersionNode;
use crate::config::Config;
use crate::formatters::table::format_versions_table;
use crate::formatters::{output, to_json, VersionRow};
use crate::resolver::Resolver;
use crate::shared::Result;

pub fn execute(
    config: &Config,
    prod: Option<&str>,
    prod_id: Option<&str>,
    env: Option<&str>,
    json: bool,
) -> Result<()> {
    let client = super::client(config)?;
    let organization = client.fetch_organization()?;
    let resolver = Resolver::new(&organization.products);

    let product = resolver.resolve_product(prod, prod_id)?;
    let environment = resolver.resolve_environment(product, env)?;
    let rows = version_rows(&environment.versions);

    let rendered = if json {
        to_json(&rows)?
    } else {
        format_versions_table(&rows)
    };
    output::present(&rendered, None)?;
    Ok(())
}

fn version_rows(versions: &[VersionNode]) -> Vec<VersionRow> {
    versions
        .iter()
        .map(|version| {
            let component = version.primary_component.as_ref();
            VersionRow {
                id: version.id.clone(),
                version: component
                    .and_then(|pc| pc.version.clone())
                    .unwrap_or_default(),
                primary_component: component
                    .and_then(|pc| pc.name.clone())
                    .unwrap_or_default(),
                updated_at: version.updated_at.clone(),
            }
        })
        .collect()
}
