//! `status`: report the processing status of one SBOM version.
//!
//! The API reports a single `vulnRunStatus`; the per-action statuses are
//! derived from it. A scan that has not started leaves everything
//! NOT_STARTED, a running scan means every other action already finished,
//! and FINISHED completes the set.

use serde::Serialize;

use crate::api::types::{Product, VersionNode};
use crate::config::Config;
use crate::formatters::table::format_status_table;
use crate::formatters::{output, to_json};
use crate::resolver::Resolver;
use crate::shared::error::LynkError;
use crate::shared::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub checks_status: String,
    pub policy_status: String,
    pub labeling_status: String,
    pub automation_status: String,
    pub vuln_scan_status: String,
}

impl StatusReport {
    pub fn from_vuln_status(vuln_run_status: Option<&str>) -> Self {
        let (others, vuln_scan) = match vuln_run_status {
            Some("NOT_STARTED") => ("NOT_STARTED", "NOT_STARTED"),
            Some("IN_PROGRESS") => ("COMPLETED", "IN_PROGRESS"),
            Some("FINISHED") => ("COMPLETED", "COMPLETED"),
            _ => ("UNKNOWN", "UNKNOWN"),
        };
        Self {
            checks_status: others.to_string(),
            policy_status: others.to_string(),
            labeling_status: others.to_string(),
            automation_status: others.to_string(),
            vuln_scan_status: vuln_scan.to_string(),
        }
    }

    fn rows(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("checksStatus", self.checks_status.as_str()),
            ("policyStatus", self.policy_status.as_str()),
            ("labelingStatus", self.labeling_status.as_str()),
            ("automationStatus", self.automation_status.as_str()),
            ("vulnScanStatus", self.vuln_scan_status.as_str()),
        ]
    }
}

pub fn execute(
    config: &Config,
    prod: Option<&str>,
    prod_id: Option<&str>,
    env: Option<&str>,
    ver: Option<&str>,
    ver_id: Option<&str>,
    json: bool,
) -> Result<()> {
    let client = super::client(config)?;
    let organization = client.fetch_organization()?;

    let version = match ver_id {
        // A version ID is unique across the organization
        Some(id) => find_version_by_id(&organization.products, id)?,
        None => {
            let resolver = Resolver::new(&organization.products);
            let product = resolver.resolve_product(prod, prod_id)?;
            let environment = resolver.resolve_environment(product, env)?;
            resolver.resolve_version(environment, ver, None)?
        }
    };

    let report = StatusReport::from_vuln_status(version.vuln_run_status.as_deref());
    let rendered = if json {
        to_json(&report)?
    } else {
        format_status_table(&report.rows())
    };
    output::present(&rendered, None)?;
    Ok(())
}

fn find_version_by_id<'a>(
    products: &'a [Product],
    id: &str,
) -> std::result::Result<&'a VersionNode, LynkError> {
    products
        .iter()
        .flat_map(|p| p.environments.iter())
        .flat_map(|e| e.versions.iter())
        .find(|v| v.id == id)
        .ok_or(LynkError::NotFound {
            kind: "Version",
            name: id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Environment;

    #[test]
    fn test_status_not_started() {
        let report = StatusReport::from_vuln_status(Some("NOT_STARTED"));
        assert_eq!(report.checks_status, "NOT_STARTED");
        assert_eq!(report.vuln_scan_status, "NOT_STARTED");
    }

    #[test]
    fn test_status_in_progress() {
        let report = StatusReport::from_vuln_status(Some("IN_PROGRESS"));
        assert_eq!(report.checks_status, "COMPLETED");
        assert_eq!(report.policy_status, "COMPLETED");
        assert_eq!(report.labeling_status, "COMPLETED");
        assert_eq!(report.automation_status, "COMPLETED");
        assert_eq!(report.vuln_scan_status, "IN_PROGRESS");
    }

    #[test]
    fn test_status_finished() {
        let report = StatusReport::from_vuln_status(Some("FINISHED"));
        assert_eq!(report.checks_status, "COMPLETED");
        assert_eq!(report.vuln_scan_status, "COMPLETED");
    }

    #[test]
    fn test_status_unknown_values() {
        for value in [None, Some("RUNNING"), Some("")] {
            let report = StatusReport::from_vuln_status(value);
            assert_eq!(report.checks_status, "UNKNOWN");
            assert_eq!(report.vuln_scan_status, "UNKNOWN");
        }
    }

    #[test]
    fn test_status_json_keys_are_camel_case() {
        let report = StatusReport::from_vuln_status(Some("FINISHED"));
        let json = serde_json::to_value(&report).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert!(keys.contains(&&"vulnScanStatus".to_string()));
        assert!(keys.contains(&&"checksStatus".to_string()));
    }

    #[test]
    fn test_find_version_by_id_across_products() {
        let products = vec![Product {
            id: "p-1".to_string(),
            name: "sbomex".to_string(),
            updated_at: "2024-05-01T12:00:00Z".to_string(),
            enabled: true,
            environments: vec![Environment {
                id: "e-1".to_string(),
                name: "default".to_string(),
                versions: vec![VersionNode {
                    id: "v-1".to_string(),
                    vuln_run_status: Some("FINISHED".to_string()),
                    updated_at: "2024-05-02T08:30:00Z".to_string(),
                    primary_component: None,
                }],
            }],
        }];

        assert_eq!(find_version_by_id(&products, "v-1").unwrap().id, "v-1");
        let error = find_version_by_id(&products, "v-9").unwrap_err();
        assert!(matches!(
            error,
            LynkError::NotFound { kind: "Version", .. }
        ));
    }
}
