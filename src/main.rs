use std::process;

use clap::Parser;

use pylynk::cli::{Cli, Command};
use pylynk::commands;
use pylynk::commands::download::DownloadArgs;
use pylynk::config::{init_logging, Config};
use pylynk::shared::error::ExitCode;
use pylynk::shared::Result;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("Caused by: {}", err);
            source = err.source();
        }

        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Prods { common, output } => {
            let config = Config::resolve(common.token.as_deref())?;
            commands::prods::execute(&config, output.is_json())
        }
        Command::Vers {
            prod,
            prod_id,
            env,
            common,
            output,
        } => {
            let config = Config::resolve(common.token.as_deref())?;
            commands::vers::execute(
                &config,
                prod.as_deref(),
                prod_id.as_deref(),
                env.as_deref(),
                output.is_json(),
            )
        }
        Command::Status {
            prod,
            prod_id,
            env,
            ver,
            ver_id,
            common,
            output,
        } => {
            let config = Config::resolve(common.token.as_deref())?;
            commands::status::execute(
                &config,
                prod.as_deref(),
                prod_id.as_deref(),
                env.as_deref(),
                ver.as_deref(),
                ver_id.as_deref(),
                output.is_json(),
            )
        }
        Command::Download {
            prod,
            env,
            ver,
            ver_id,
            output,
            vuln,
            spec,
            spec_version,
            lite,
            dont_package_sbom,
            original,
            exclude_parts,
            include_support_status,
            support_level_only,
            common,
        } => {
            let config = Config::resolve(common.token.as_deref())?;
            commands::download::execute(
                &config,
                DownloadArgs {
                    prod,
                    env,
                    ver,
                    ver_id,
                    output,
                    vuln,
                    spec,
                    spec_version,
                    lite,
                    dont_package_sbom,
                    original,
                    exclude_parts,
                    include_support_status,
                    support_level_only,
                },
            )
        }
        Command::Upload {
            prod,
            prod_id,
            env,
            env_id,
            sbom,
            retries,
            common,
        } => {
            let config = Config::resolve(common.token.as_deref())?;
            commands::upload::execute(
                &config,
                prod.as_deref(),
                prod_id.as_deref(),
                env.as_deref(),
                env_id.as_deref(),
                &sbom,
                retries,
            )
        }
    }
}
