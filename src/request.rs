//! GraphQL request construction: download union validation, the
//! option-to-variable mapping, upload variables, and CI header gating.
//!
//! Builders only describe the request; no network I/O happens here, and
//! validation failures are raised before any call is attempted.

use serde_json::{json, Map, Value};

use crate::ci::{should_attach, CiContext, CiMode, EnvMap};
use crate::shared::error::LynkError;

/// Optional download behavior flags.
///
/// Every boolean maps to its GraphQL variable only when set; the server
/// treats unset and false identically for all of them, so false flags are
/// omitted from the variable set.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub include_vulns: bool,
    pub spec: Option<String>,
    pub spec_version: Option<String>,
    pub lite: bool,
    pub original: bool,
    pub dont_package_sbom: bool,
    pub exclude_parts: bool,
    pub include_support_status: bool,
    pub support_level_only: bool,
}

/// A download request in one of its two valid shapes: a version ID alone,
/// or the product/environment/version name triple.
#[derive(Debug, Clone, Default)]
pub struct DownloadRequest {
    pub version_id: Option<String>,
    pub product_name: Option<String>,
    pub environment_name: Option<String>,
    pub version_name: Option<String>,
    pub options: DownloadOptions,
}

impl DownloadRequest {
    /// Check the identifier union before anything touches the network.
    pub fn validate(&self) -> Result<(), LynkError> {
        if self.version_id.is_some() {
            return Ok(());
        }
        if self.product_name.is_some()
            && self.environment_name.is_some()
            && self.version_name.is_some()
        {
            return Ok(());
        }
        Err(LynkError::InvalidParameterCombination {
            message: "Please provide either --verId OR all of --prod, --env, and --ver"
                .to_string(),
        })
    }

    /// GraphQL variables for the download query.
    ///
    /// When a version ID is present it is the sole identifier; the name
    /// variables are omitted even if names were also supplied, so no name
    /// resolution happens on the server for the ID path.
    pub fn variables(&self) -> Value {
        let mut vars = Map::new();

        if let Some(ver_id) = &self.version_id {
            vars.insert("sbomId".to_string(), json!(ver_id));
        } else {
            if let Some(prod) = &self.product_name {
                vars.insert("projectGroupName".to_string(), json!(prod));
            }
            if let Some(env) = &self.environment_name {
                vars.insert("projectName".to_string(), json!(env));
            }
            if let Some(ver) = &self.version_name {
                vars.insert("versionName".to_string(), json!(ver));
            }
        }

        let opts = &self.options;
        if opts.include_vulns {
            vars.insert("includeVulns".to_string(), json!(true));
        }
        if let Some(spec) = &opts.spec {
            vars.insert("spec".to_string(), json!(spec));
        }
        if let Some(spec_version) = &opts.spec_version {
            vars.insert("specVersion".to_string(), json!(spec_version));
        }
        if opts.original {
            vars.insert("original".to_string(), json!(true));
        }
        // The query binds dontPackageSbom: $package
        if opts.dont_package_sbom {
            vars.insert("package".to_string(), json!(true));
        }
        if opts.lite {
            vars.insert("lite".to_string(), json!(true));
        }
        if opts.exclude_parts {
            vars.insert("excludeParts".to_string(), json!(true));
        }
        if opts.support_level_only {
            vars.insert("supportLevelOnly".to_string(), json!(true));
        }
        if opts.include_support_status {
            vars.insert("includeSupportStatus".to_string(), json!(true));
        }

        Value::Object(vars)
    }
}

/// An upload request. IDs take precedence over names for both the
/// product and environment dimensions; an omitted environment is left to
/// the server default.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub product_name: Option<String>,
    pub product_id: Option<String>,
    pub environment_name: Option<String>,
    pub environment_id: Option<String>,
}

impl UploadRequest {
    /// GraphQL variables for the upload mutation. The `doc` slot is null
    /// here; the multipart `map` entry points the file part at it.
    pub fn variables(&self) -> Value {
        let mut vars = Map::new();
        vars.insert("doc".to_string(), Value::Null);

        if let Some(id) = &self.product_id {
            vars.insert("projectGroupId".to_string(), json!(id));
        } else if let Some(name) = &self.product_name {
            vars.insert("projectGroupName".to_string(), json!(name));
        }

        if let Some(id) = &self.environment_id {
            vars.insert("projectId".to_string(), json!(id));
        } else if let Some(name) = &self.environment_name {
            vars.insert("projectName".to_string(), json!(name));
        }

        Value::Object(vars)
    }
}

/// CI headers for an upload, honoring the tri-state activation control.
///
/// `Auto` attaches only when a CI marker was detected, `Always` attaches
/// a best-effort record even outside CI, `Never` yields no headers.
pub fn ci_headers(mode: CiMode, env: &EnvMap) -> Vec<(&'static str, String)> {
    let detected = CiContext::detect(env);
    if !should_attach(mode, detected.as_ref()) {
        return Vec::new();
    }
    match detected {
        Some(context) => context.headers(),
        None => CiContext::detect_or_default(env).headers(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_download_valid_with_version_id_only() {
        let request = DownloadRequest {
            version_id: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_download_valid_with_name_triple() {
        let request = DownloadRequest {
            product_name: Some("sbomex".to_string()),
            environment_name: Some("default".to_string()),
            version_name: Some("1.0.0".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_download_invalid_partial_combinations() {
        let partials = [
            DownloadRequest::default(),
            DownloadRequest {
                product_name: Some("sbomex".to_string()),
                ..Default::default()
            },
            DownloadRequest {
                product_name: Some("sbomex".to_string()),
                environment_name: Some("default".to_string()),
                ..Default::default()
            },
            DownloadRequest {
                version_name: Some("1.0.0".to_string()),
                ..Default::default()
            },
        ];
        for request in partials {
            let error = request.validate().unwrap_err();
            assert!(
                matches!(error, LynkError::InvalidParameterCombination { .. }),
                "expected InvalidParameterCombination for {:?}",
                request
            );
        }
    }

    #[test]
    fn test_download_version_id_suppresses_name_variables() {
        // --prod sbomex --verId abc: the request carries sbomId only
        let request = DownloadRequest {
            version_id: Some("abc".to_string()),
            product_name: Some("sbomex".to_string()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
        let vars = request.variables();
        assert_eq!(vars["sbomId"], "abc");
        assert!(vars.get("projectGroupName").is_none());
        assert!(vars.get("projectName").is_none());
        assert!(vars.get("versionName").is_none());
    }

    #[test]
    fn test_download_name_variables() {
        let request = DownloadRequest {
            product_name: Some("sbomex".to_string()),
            environment_name: Some("production".to_string()),
            version_name: Some("2.1.0".to_string()),
            ..Default::default()
        };
        let vars = request.variables();
        assert_eq!(vars["projectGroupName"], "sbomex");
        assert_eq!(vars["projectName"], "production");
        assert_eq!(vars["versionName"], "2.1.0");
        assert!(vars.get("sbomId").is_none());
    }

    #[test]
    fn test_download_false_flags_are_omitted() {
        let request = DownloadRequest {
            version_id: Some("abc".to_string()),
            ..Default::default()
        };
        let vars = request.variables();
        let keys: Vec<&String> = vars.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["sbomId"]);
    }

    #[test]
    fn test_download_option_variable_mapping() {
        let request = DownloadRequest {
            version_id: Some("abc".to_string()),
            options: DownloadOptions {
                include_vulns: true,
                spec: Some("CycloneDX".to_string()),
                spec_version: Some("1.5".to_string()),
                lite: true,
                original: true,
                dont_package_sbom: true,
                exclude_parts: true,
                include_support_status: true,
                support_level_only: true,
            },
            ..Default::default()
        };
        let vars = request.variables();
        assert_eq!(vars["includeVulns"], true);
        assert_eq!(vars["spec"], "CycloneDX");
        assert_eq!(vars["specVersion"], "1.5");
        assert_eq!(vars["lite"], true);
        assert_eq!(vars["original"], true);
        assert_eq!(vars["package"], true);
        assert_eq!(vars["excludeParts"], true);
        assert_eq!(vars["supportLevelOnly"], true);
        assert_eq!(vars["includeSupportStatus"], true);
    }

    #[test]
    fn test_upload_variables_prefer_ids() {
        let request = UploadRequest {
            product_name: Some("sbomex".to_string()),
            product_id: Some("p-1".to_string()),
            environment_name: Some("default".to_string()),
            environment_id: None,
        };
        let vars = request.variables();
        assert_eq!(vars["projectGroupId"], "p-1");
        assert!(vars.get("projectGroupName").is_none());
        assert_eq!(vars["projectName"], "default");
        assert!(vars["doc"].is_null());
    }

    #[test]
    fn test_upload_variables_omit_missing_environment() {
        let request = UploadRequest {
            product_name: Some("sbomex".to_string()),
            ..Default::default()
        };
        let vars = request.variables();
        assert_eq!(vars["projectGroupName"], "sbomex");
        assert!(vars.get("projectName").is_none());
        assert!(vars.get("projectId").is_none());
    }

    #[test]
    fn test_ci_headers_never_mode_suppresses_attachment() {
        let snapshot = env(&[
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_REPOSITORY", "acme/widget"),
            ("GITHUB_REF", "refs/pull/42/merge"),
        ]);
        assert!(ci_headers(CiMode::Never, &snapshot).is_empty());
    }

    #[test]
    fn test_ci_headers_auto_mode_attaches_when_detected() {
        let snapshot = env(&[
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_REPOSITORY", "acme/widget"),
            ("GITHUB_REF", "refs/pull/42/merge"),
            ("GITHUB_HEAD_REF", "feat/x"),
            ("GITHUB_BASE_REF", "main"),
            ("GITHUB_ACTOR", "alice"),
        ]);
        let headers: Vec<(String, String)> = ci_headers(CiMode::Auto, &snapshot)
            .into_iter()
            .map(|(n, v)| (n.to_string(), v))
            .collect();
        let lookup = |name: &str| {
            headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(lookup("X-PR-Number"), Some("42"));
        assert_eq!(lookup("X-PR-Source-Branch"), Some("feat/x"));
        assert_eq!(lookup("X-PR-Target-Branch"), Some("main"));
        assert_eq!(lookup("X-PR-Author"), Some("alice"));
        assert_eq!(lookup("X-Event-Type"), Some("pull_request"));
    }

    #[test]
    fn test_ci_headers_auto_mode_outside_ci() {
        let snapshot = env(&[("HOME", "/home/user")]);
        assert!(ci_headers(CiMode::Auto, &snapshot).is_empty());
    }

    #[test]
    fn test_ci_headers_always_mode_outside_ci() {
        let snapshot = env(&[("HOME", "/home/user")]);
        let headers = ci_headers(CiMode::Always, &snapshot);
        assert!(headers
            .iter()
            .any(|(n, v)| *n == "X-CI-Provider" && v == "generic_ci"));
    }
}
