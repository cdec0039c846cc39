//! Blocking GraphQL client for the Interlynk API.
//!
//! Every network call goes through the retry policy: connection failures,
//! 429 and 5xx responses are retried with exponential backoff, while auth
//! failures, other 4xx responses and GraphQL-level errors surface
//! immediately.

use std::path::Path;
use std::time::{Duration, Instant};

use log::debug;
use reqwest::blocking::{multipart, Client};
use serde_json::{json, Value};

use crate::api::types::{
    CountResponse, DownloadResponse, ProductNodes, ProductsResponse, UploadResponse,
};
use crate::api::{mutations, queries};
use crate::request::{DownloadRequest, UploadRequest};
use crate::retry::{classify_status, Failure, RetryPolicy};
use crate::shared::error::LynkError;

/// Default API endpoint, overridable through `INTERLYNK_API_URL`.
pub const DEFAULT_API_URL: &str = "https://api.interlynk.io/lynkapi";

const API_TIMEOUT: Duration = Duration::from_secs(100);

/// Decoded SBOM document handed back to the download command.
#[derive(Debug)]
pub struct SbomDocument {
    pub content: String,
    pub content_type: String,
    pub filename: String,
}

pub struct LynkClient {
    http: Client,
    api_url: String,
    token: String,
    policy: RetryPolicy,
}

impl LynkClient {
    pub fn new(api_url: String, token: String, policy: RetryPolicy) -> Result<Self, LynkError> {
        let user_agent = format!("pylynk/{}", env!("CARGO_PKG_VERSION"));
        let http = Client::builder()
            .timeout(API_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(|e| LynkError::Transport {
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_url,
            token,
            policy,
        })
    }

    /// Fetch the full organization context: product count, then the
    /// product graph sized to that count.
    pub fn fetch_organization(&self) -> Result<ProductNodes, LynkError> {
        let data = self.execute(queries::PRODUCTS_TOTAL_COUNT, None, "GetProductsCount")?;
        let count: CountResponse = parse_data(data)?;
        let count = count.organization.product_nodes.prod_count;

        let data = self.execute(
            queries::PRODUCTS_LIST,
            Some(json!({ "first": count })),
            "GetProducts",
        )?;
        let products: ProductsResponse = parse_data(data)?;
        Ok(products.organization.product_nodes)
    }

    /// Download an SBOM described by a validated request.
    pub fn download(&self, request: &DownloadRequest) -> Result<SbomDocument, LynkError> {
        let variables = request.variables();
        debug!("Download variables: {}", variables);

        let data = self.execute(queries::SBOM_DOWNLOAD, Some(variables), "downloadSbom")?;
        let response: DownloadResponse = parse_data(data)?;

        let payload = response
            .sbom
            .and_then(|sbom| sbom.download)
            .ok_or(LynkError::NotFound {
                kind: "SBOM",
                name: "no match for the given criteria".to_string(),
            })?;

        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload.content.as_bytes())
            .map_err(|e| LynkError::MalformedResponse {
                details: format!("invalid base64 SBOM content: {}", e),
            })?;
        debug!(
            "Download completed: base64_size={}, decoded_size={}",
            format_size(payload.content.len() as u64),
            format_size(decoded.len() as u64)
        );
        let content = String::from_utf8(decoded).map_err(|e| LynkError::MalformedResponse {
            details: format!("SBOM content is not valid UTF-8: {}", e),
        })?;

        Ok(SbomDocument {
            content,
            content_type: payload
                .content_type
                .unwrap_or_else(|| "application/json".to_string()),
            filename: payload.filename.unwrap_or_else(|| "sbom.json".to_string()),
        })
    }

    /// Upload an SBOM file as a GraphQL multipart request, attaching any
    /// CI headers the caller resolved.
    pub fn upload(
        &self,
        request: &UploadRequest,
        sbom_path: &Path,
        ci_headers: &[(&'static str, String)],
    ) -> Result<(), LynkError> {
        let bytes = std::fs::read(sbom_path).map_err(|e| LynkError::FileRead {
            path: sbom_path.to_path_buf(),
            details: e.to_string(),
        })?;
        let filename = sbom_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sbom.json".to_string());

        let operations = serde_json::to_string(&json!({
            "query": mutations::SBOM_UPLOAD,
            "variables": request.variables(),
        }))
        .map_err(|e| LynkError::MalformedResponse {
            details: e.to_string(),
        })?;
        let map = r#"{"0": ["variables.doc"]}"#.to_string();

        debug!(
            "Upload request: url={}, file={}, size={}, ci_headers={}",
            self.api_url,
            sbom_path.display(),
            format_size(bytes.len() as u64),
            ci_headers.len()
        );

        self.policy.execute(|| {
            // Multipart forms are single-use; rebuild per attempt
            let part = multipart::Part::bytes(bytes.clone()).file_name(filename.clone());
            let form = multipart::Form::new()
                .text("operations", operations.clone())
                .text("map", map.clone())
                .part("0", part);

            let mut builder = self
                .http
                .post(&self.api_url)
                .bearer_auth(&self.token)
                .multipart(form);
            for (name, value) in ci_headers {
                builder = builder.header(*name, value);
            }

            let start = Instant::now();
            let response = builder.send().map_err(transport_failure)?;
            let status = response.status();
            let body = response.text().map_err(transport_failure)?;
            debug!(
                "Upload response: status={}, time={:.3}s, size={}",
                status.as_u16(),
                start.elapsed().as_secs_f64(),
                format_size(body.len() as u64)
            );

            if !status.is_success() {
                let message = extract_error_message(&body);
                return Err(classify_status(status.as_u16(), message));
            }

            let envelope: Value = serde_json::from_str(&body).map_err(|e| {
                Failure::Fatal(LynkError::MalformedResponse {
                    details: e.to_string(),
                })
            })?;
            if let Some(message) = graphql_errors(&envelope) {
                return Err(Failure::Fatal(LynkError::GraphQl { message }));
            }

            let upload: UploadResponse = serde_json::from_value(
                envelope.get("data").cloned().unwrap_or(Value::Null),
            )
            .map_err(|e| {
                Failure::Fatal(LynkError::MalformedResponse {
                    details: e.to_string(),
                })
            })?;
            if let Some(errors) = upload.sbom_upload.and_then(|u| u.errors) {
                if !errors.is_empty() {
                    return Err(Failure::Fatal(LynkError::GraphQl {
                        message: errors.join("; "),
                    }));
                }
            }

            Ok(())
        })
    }

    /// POST one GraphQL document through the retry policy and return the
    /// `data` value.
    fn execute(
        &self,
        query: &str,
        variables: Option<Value>,
        operation_name: &str,
    ) -> Result<Value, LynkError> {
        self.policy
            .execute(|| self.attempt(query, variables.as_ref(), operation_name))
    }

    fn attempt(
        &self,
        query: &str,
        variables: Option<&Value>,
        operation_name: &str,
    ) -> Result<Value, Failure> {
        let mut body = serde_json::Map::new();
        body.insert("query".to_string(), json!(query));
        if let Some(vars) = variables {
            body.insert("variables".to_string(), vars.clone());
        }
        body.insert("operationName".to_string(), json!(operation_name));

        debug!(
            "API request: operation={}, url={}",
            operation_name, self.api_url
        );

        let start = Instant::now();
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&Value::Object(body))
            .send()
            .map_err(transport_failure)?;

        let status = response.status();
        let text = response.text().map_err(transport_failure)?;
        debug!(
            "API response: status={}, time={:.3}s, size={}",
            status.as_u16(),
            start.elapsed().as_secs_f64(),
            format_size(text.len() as u64)
        );

        if !status.is_success() {
            let message = extract_error_message(&text);
            return Err(classify_status(status.as_u16(), message));
        }

        let envelope: Value = serde_json::from_str(&text).map_err(|e| {
            Failure::Fatal(LynkError::MalformedResponse {
                details: e.to_string(),
            })
        })?;

        // GraphQL errors in a 200 response are not retried
        if let Some(message) = graphql_errors(&envelope) {
            return Err(Failure::Fatal(LynkError::GraphQl { message }));
        }

        match envelope.get("data") {
            Some(data) if !data.is_null() => Ok(data.clone()),
            _ => Err(Failure::Fatal(LynkError::MalformedResponse {
                details: "response contains no data".to_string(),
            })),
        }
    }
}

fn parse_data<T: serde::de::DeserializeOwned>(data: Value) -> Result<T, LynkError> {
    serde_json::from_value(data).map_err(|e| LynkError::MalformedResponse {
        details: e.to_string(),
    })
}

fn transport_failure(error: reqwest::Error) -> Failure {
    Failure::Retryable(LynkError::Transport {
        details: error.to_string(),
    })
}

/// Join the messages of a GraphQL `errors` array, if any.
fn graphql_errors(envelope: &Value) -> Option<String> {
    let errors = envelope.get("errors")?.as_array()?;
    if errors.is_empty() {
        return None;
    }
    let messages: Vec<String> = errors
        .iter()
        .map(|e| {
            e.get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string()
        })
        .collect();
    Some(messages.join("; "))
}

/// Best-effort extraction of a GraphQL error message from a raw body.
fn extract_error_message(body: &str) -> Option<String> {
    let envelope: Value = serde_json::from_str(body).ok()?;
    graphql_errors(&envelope)
}

/// Format bytes as a human-readable size for debug logs.
fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}
