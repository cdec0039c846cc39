//! Plain-text tables with column widths sized to their content.

use crate::formatters::{ProductRow, VersionRow};
use crate::timeutil::user_time;

fn column_width(header: &str, values: impl Iterator<Item = usize>) -> usize {
    values.chain(std::iter::once(header.len())).max().unwrap_or(0)
}

/// Render the products listing.
pub fn format_products_table(products: &[ProductRow]) -> String {
    if products.is_empty() {
        return "No products found".to_string();
    }

    let times: Vec<String> = products.iter().map(|p| user_time(&p.updated_at)).collect();
    let name_width = column_width("NAME", products.iter().map(|p| p.name.len()));
    let id_width = column_width("ID", products.iter().map(|p| p.id.len()));
    let version_width = "VERSIONS".len();
    let updated_width = column_width("UPDATED AT", times.iter().map(String::len));

    let mut lines = Vec::with_capacity(products.len() + 2);
    lines.push(format!(
        "{:<name_width$} | {:<id_width$} | {:<version_width$} | {:<updated_width$} |",
        "NAME", "ID", "VERSIONS", "UPDATED AT"
    ));
    let total = name_width + id_width + version_width + updated_width + 10;
    lines.push(format!("{}|", "-".repeat(total)));

    for (product, time) in products.iter().zip(times.iter()) {
        lines.push(format!(
            "{:<name_width$} | {:<id_width$} | {:<version_width$} | {:<updated_width$} |",
            product.name, product.id, product.versions, time
        ));
    }

    lines.join("\n")
}

/// Render the versions listing.
pub fn format_versions_table(versions: &[VersionRow]) -> String {
    if versions.is_empty() {
        return "No versions found".to_string();
    }

    let times: Vec<String> = versions.iter().map(|v| user_time(&v.updated_at)).collect();
    let id_width = column_width("ID", versions.iter().map(|v| v.id.len()));
    let version_width = column_width("VERSION", versions.iter().map(|v| v.version.len()));
    let component_width = column_width(
        "PRIMARY COMPONENT",
        versions.iter().map(|v| v.primary_component.len()),
    );
    let updated_width = column_width("UPDATED AT", times.iter().map(String::len));

    let mut lines = Vec::with_capacity(versions.len() + 2);
    lines.push(format!(
        "{:<id_width$} | {:<version_width$} | {:<component_width$} | {:<updated_width$} |",
        "ID", "VERSION", "PRIMARY COMPONENT", "UPDATED AT"
    ));
    let total = id_width + version_width + component_width + updated_width + 10;
    lines.push(format!("{}|", "-".repeat(total)));

    for (version, time) in versions.iter().zip(times.iter()) {
        lines.push(format!(
            "{:<id_width$} | {:<version_width$} | {:<component_width$} | {:<updated_width$} |",
            version.id, version.version, version.primary_component, time
        ));
    }

    lines.join("\n")
}

/// Render status key/value pairs.
pub fn format_status_table(rows: &[(&str, &str)]) -> String {
    const KEY_WIDTH: usize = 20;
    const VALUE_WIDTH: usize = 20;

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<KEY_WIDTH$} | {:<VALUE_WIDTH$}",
        "ACTION KEY", "STATUS"
    ));
    lines.push(format!("{}|", "-".repeat(KEY_WIDTH + VALUE_WIDTH + 5)));
    for (key, value) in rows {
        lines.push(format!("{:<KEY_WIDTH$} | {:<VALUE_WIDTH$}", key, value));
    }

    lines.join("\n")
}
