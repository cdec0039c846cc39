//! `download`: fetch an SBOM and write it to a file or stdout.

use std::path::PathBuf;

use log::debug;

use crate::cli::parse_bool_flag;
use crate::config::Config;
use crate::formatters::output;
use crate::request::{DownloadOptions, DownloadRequest};
use crate::shared::Result;

/// Parsed `download` arguments, owned so the dispatcher can hand them
/// over wholesale.
#[derive(Debug, Default)]
pub struct DownloadArgs {
    pub prod: Option<String>,
    pub env: Option<String>,
    pub ver: Option<String>,
    pub ver_id: Option<String>,
    pub output: Option<PathBuf>,
    pub vuln: Option<String>,
    pub spec: Option<String>,
    pub spec_version: Option<String>,
    pub lite: bool,
    pub dont_package_sbom: bool,
    pub original: bool,
    pub exclude_parts: bool,
    pub include_support_status: bool,
    pub support_level_only: bool,
}

pub fn execute(config: &Config, args: DownloadArgs) -> Result<()> {
    let include_vulns = parse_bool_flag("vuln", args.vuln.as_deref())?;

    let request = DownloadRequest {
        version_id: args.ver_id,
        product_name: args.prod,
        environment_name: args.env,
        version_name: args.ver,
        options: DownloadOptions {
            include_vulns,
            spec: args.spec,
            spec_version: args.spec_version,
            lite: args.lite,
            original: args.original,
            dont_package_sbom: args.dont_package_sbom,
            exclude_parts: args.exclude_parts,
            include_support_status: args.include_support_status,
            support_level_only: args.support_level_only,
        },
    };
    request.validate()?;

    let client = super::client(config)?;
    let document = client.download(&request)?;
    debug!(
        "Downloaded SBOM: content_type={}, filename={}",
        document.content_type, document.filename
    );

    let raw = args.original || args.support_level_only || !is_json(&document.content_type);
    let rendered = if raw {
        document.content
    } else {
        prettify_json(document.content)
    };
    let target = output_target(args.output, &document.filename);
    output::present(&rendered, Some(target.as_path()))?;
    Ok(())
}

/// `--output` wins; otherwise the server-supplied filename is the
/// destination.
fn output_target(explicit: Option<PathBuf>, server_filename: &str) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(server_filename))
}

fn is_json(content_type: &str) -> bool {
    content_type.contains("json")
}

/// Re-indent JSON content for readability; anything that fails to parse
/// passes through untouched.
fn prettify_json(content: String) -> String {
    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(content),
        Err(_) => content,
    }
}
