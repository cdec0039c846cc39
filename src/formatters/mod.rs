//! Rendering of fetched data as tables or JSON, and presentation to
//! stdout or a file.

pub mod output;
pub mod table;

use serde::Serialize;

/// One row of the `prods` listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductRow {
    pub name: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    pub id: String,
    pub versions: usize,
}

/// One row of the `vers` listing.
#[derive(Debug, Clone, Serialize)]
pub struct VersionRow {
    pub id: String,
    pub version: String,
    #[serde(rename = "primaryComponent")]
    pub primary_component: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

/// Pretty-print any serializable value as JSON.
pub fn to_json<T: Serialize>(value: &T) -> crate::shared::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
