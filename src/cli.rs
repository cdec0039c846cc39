use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::shared::error::LynkError;

/// Interlynk command line tool
#[derive(Parser, Debug)]
#[command(name = "pylynk")]
#[command(version)]
#[command(about = "Interlynk command line tool", long_about = None)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List products
    Prods {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        output: OutputFormatArgs,
    },
    /// List versions
    Vers {
        /// Product name
        #[arg(long)]
        prod: Option<String>,
        /// Product ID
        #[arg(long = "prodId")]
        prod_id: Option<String>,
        /// Environment
        #[arg(long)]
        env: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        output: OutputFormatArgs,
    },
    /// SBOM status
    Status {
        /// Product name
        #[arg(long)]
        prod: Option<String>,
        /// Product ID
        #[arg(long = "prodId")]
        prod_id: Option<String>,
        /// Environment
        #[arg(long)]
        env: Option<String>,
        /// Version
        #[arg(long, conflicts_with = "ver_id")]
        ver: Option<String>,
        /// Version ID
        #[arg(long = "verId")]
        ver_id: Option<String>,
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        output: OutputFormatArgs,
    },
    /// Download SBOM
    Download {
        /// Product name
        #[arg(long)]
        prod: Option<String>,
        /// Environment
        #[arg(long)]
        env: Option<String>,
        /// Version
        #[arg(long, conflicts_with = "ver_id")]
        ver: Option<String>,
        /// Version ID
        #[arg(long = "verId")]
        ver_id: Option<String>,
        /// Output file (defaults to the server-supplied filename)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Include vulnerabilities (true|false|1|0|yes|no)
        #[arg(long)]
        vuln: Option<String>,
        /// SBOM specification
        #[arg(long, value_parser = ["SPDX", "CycloneDX"])]
        spec: Option<String>,
        /// SBOM specification version
        #[arg(long = "spec-version")]
        spec_version: Option<String>,
        /// Download lite SBOM
        #[arg(long)]
        lite: bool,
        /// Don't package SBOM
        #[arg(long = "dont-package-sbom")]
        dont_package_sbom: bool,
        /// Download original SBOM
        #[arg(long)]
        original: bool,
        /// Exclude parts from SBOM
        #[arg(long = "exclude-parts")]
        exclude_parts: bool,
        /// Include support status
        #[arg(long = "include-support-status")]
        include_support_status: bool,
        /// Download support levels only (CSV output)
        #[arg(long = "support-level-only")]
        support_level_only: bool,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Upload SBOM
    Upload {
        /// Product name
        #[arg(long, required_unless_present = "prod_id")]
        prod: Option<String>,
        /// Product ID
        #[arg(long = "prodId")]
        prod_id: Option<String>,
        /// Environment
        #[arg(long)]
        env: Option<String>,
        /// Environment ID
        #[arg(long = "envId")]
        env_id: Option<String>,
        /// SBOM path
        #[arg(long, required = true)]
        sbom: PathBuf,
        /// Number of upload retries
        #[arg(long, default_value_t = 3)]
        retries: u32,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Security token
    #[arg(long)]
    pub token: Option<String>,
}

#[derive(Args, Debug)]
pub struct OutputFormatArgs {
    /// JSON formatted (default)
    #[arg(long, conflicts_with = "table")]
    pub json: bool,
    /// Table formatted
    #[arg(long)]
    pub table: bool,
}

impl OutputFormatArgs {
    pub fn is_json(&self) -> bool {
        !self.table
    }
}

/// Parse a boolean-like flag value (`true|false|1|0|yes|no`,
/// case-insensitive). `None` means the flag was not supplied.
pub fn parse_bool_flag(flag: &str, value: Option<&str>) -> Result<bool, LynkError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(LynkError::InvalidBooleanFlag {
            flag: flag.to_string(),
            value: value.to_string(),
        }),
    }
}
