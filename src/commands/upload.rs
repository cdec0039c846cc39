//! `upload`: send an SBOM file to the platform.

use std::path::Path;

use log::debug;

use crate::api::LynkClient;
use crate::ci::env_snapshot;
use crate::config::Config;
use crate::request::{ci_headers, UploadRequest};
use crate::retry::RetryPolicy;
use crate::shared::error::LynkError;
use crate::shared::Result;

pub fn execute(
    config: &Config,
    prod: Option<&str>,
    prod_id: Option<&str>,
    env: Option<&str>,
    env_id: Option<&str>,
    sbom: &Path,
    retries: u32,
) -> Result<()> {
    if !sbom.is_file() {
        return Err(LynkError::FileNotFound {
            path: sbom.to_path_buf(),
        }
        .into());
    }

    let request = UploadRequest {
        product_name: prod.map(str::to_string),
        product_id: prod_id.map(str::to_string),
        environment_name: env.map(str::to_string),
        environment_id: env_id.map(str::to_string),
    };

    let headers = ci_headers(config.ci_mode, &env_snapshot());
    if !headers.is_empty() {
        debug!("Attaching {} CI metadata headers", headers.len());
    }

    let client = LynkClient::new(
        config.api_url.clone(),
        config.token.clone(),
        RetryPolicy::new(retries),
    )?;
    client.upload(&request, sbom, &headers)?;

    println!("Successfully uploaded {}", sbom.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::CiMode;

    #[test]
    fn test_missing_file_is_reported_before_any_network_call() {
        let config = Config {
            api_url: "https://api.example.com/lynkapi".to_string(),
            token: "lynk_test".to_string(),
            ci_mode: CiMode::Never,
        };
        let error = execute(
            &config,
            Some("sbomex"),
            None,
            None,
            None,
            Path::new("/nonexistent/sbom.json"),
            3,
        )
        .unwrap_err();
        let error = error.downcast::<LynkError>().unwrap();
        assert!(matches!(error, LynkError::FileNotFound { .. }));
    }
}
