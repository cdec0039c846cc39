//! Serde models for Interlynk API responses.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub organization: CountOrganization,
}

#[derive(Debug, Deserialize)]
pub struct CountOrganization {
    #[serde(rename = "productNodes")]
    pub product_nodes: CountNodes,
}

#[derive(Debug, Deserialize)]
pub struct CountNodes {
    #[serde(rename = "prodCount")]
    pub prod_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProductsResponse {
    pub organization: Organization,
}

#[derive(Debug, Deserialize)]
pub struct Organization {
    #[serde(rename = "productNodes")]
    pub product_nodes: ProductNodes,
}

#[derive(Debug, Deserialize)]
pub struct ProductNodes {
    #[serde(rename = "prodCount")]
    pub prod_count: u64,
    pub products: Vec<Product>,
}

/// A product (project group) with its environments.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub environments: Vec<Environment>,
}

/// An environment (project) with its SBOM versions.
#[derive(Debug, Clone, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub versions: Vec<VersionNode>,
}

/// One SBOM version inside an environment.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionNode {
    pub id: String,
    #[serde(rename = "vulnRunStatus", default)]
    pub vuln_run_status: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
    #[serde(rename = "primaryComponent", default)]
    pub primary_component: Option<PrimaryComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryComponent {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadResponse {
    #[serde(default)]
    pub sbom: Option<SbomNode>,
}

#[derive(Debug, Deserialize)]
pub struct SbomNode {
    #[serde(default)]
    pub download: Option<DownloadPayload>,
}

/// Base64 SBOM payload as returned by the download resolver.
#[derive(Debug, Deserialize)]
pub struct DownloadPayload {
    pub content: String,
    #[serde(rename = "contentType", default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "sbomUpload", default)]
    pub sbom_upload: Option<UploadResult>,
}

#[derive(Debug, Deserialize)]
pub struct UploadResult {
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_products_response() {
        let body = r#"{
            "organization": {
                "productNodes": {
                    "prodCount": 1,
                    "products": [{
                        "id": "p-1",
                        "name": "sbomex",
                        "updatedAt": "2024-05-01T12:00:00Z",
                        "enabled": true,
                        "environments": [{
                            "id": "e-1",
                            "name": "default",
                            "versions": [{
                                "id": "v-1",
                                "vulnRunStatus": "FINISHED",
                                "updatedAt": "2024-05-02T08:30:00Z",
                                "primaryComponent": {"name": "sbomex", "version": "1.0.0"}
                            }]
                        }]
                    }]
                }
            }
        }"#;
        let parsed: ProductsResponse = serde_json::from_str(body).unwrap();
        let nodes = parsed.organization.product_nodes;
        assert_eq!(nodes.prod_count, 1);
        assert_eq!(nodes.products[0].name, "sbomex");
        assert_eq!(nodes.products[0].environments[0].versions[0].id, "v-1");
        assert_eq!(
            nodes.products[0].environments[0].versions[0]
                .primary_component
                .as_ref()
                .unwrap()
                .version
                .as_deref(),
            Some("1.0.0")
        );
    }

    #[test]
    fn test_deserialize_version_without_primary_component() {
        let body = r#"{
            "id": "v-2",
            "updatedAt": "2024-05-02T08:30:00Z",
            "primaryComponent": null
        }"#;
        let parsed: VersionNode = serde_json::from_str(body).unwrap();
        assert!(parsed.primary_component.is_none());
        assert!(parsed.vuln_run_status.is_none());
    }

    #[test]
    fn test_deserialize_download_response() {
        let body = r#"{
            "sbom": {
                "download": {
                    "content": "eyJ4IjoxfQ==",
                    "contentType": "application/json",
                    "filename": "sbom.json"
                }
            }
        }"#;
        let parsed: DownloadResponse = serde_json::from_str(body).unwrap();
        let payload = parsed.sbom.unwrap().download.unwrap();
        assert_eq!(payload.filename.as_deref(), Some("sbom.json"));
    }

    #[test]
    fn test_deserialize_download_no_match() {
        let parsed: DownloadResponse = serde_json::from_str(r#"{"sbom": null}"#).unwrap();
        assert!(parsed.sbom.is_none());
    }

    #[test]
    fn test_deserialize_upload_errors() {
        let body = r#"{"sbomUpload": {"errors": ["project not found"]}}"#;
        let parsed: UploadResponse = serde_json::from_str(body).unwrap();
        let errors = parsed.sbom_upload.unwrap().errors.unwrap();
        assert_eq!(errors, vec!["project not found".to_string()]);
    }
}
