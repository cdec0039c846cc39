//! Name-to-ID resolution over the fetched product graph.
//!
//! The client fetches the organization context once per invocation; the
//! resolver then translates user-supplied names into canonical IDs
//! against that snapshot. When both a name and an ID are supplied the ID
//! wins. Resolution order is product, then environment, then version,
//! and each step fails independently.

use crate::api::types::{Environment, Product, VersionNode};
use crate::shared::error::LynkError;

/// Environment used when the caller does not name one.
pub const DEFAULT_ENVIRONMENT: &str = "default";

// Platform-provisioned environments are matched case-insensitively.
const WELL_KNOWN_ENVIRONMENTS: &[&str] = &["default", "development", "production"];

pub struct Resolver<'a> {
    products: &'a [Product],
}

impl<'a> Resolver<'a> {
    pub fn new(products: &'a [Product]) -> Self {
        Self { products }
    }

    /// Resolve the product dimension. An ID takes precedence over a name;
    /// supplying neither is a parameter error, not a lookup failure.
    pub fn resolve_product(
        &self,
        name: Option<&str>,
        id: Option<&str>,
    ) -> Result<&'a Product, LynkError> {
        if let Some(id) = id {
            return self
                .products
                .iter()
                .find(|p| p.id == id)
                .ok_or(LynkError::NotFound {
                    kind: "Product",
                    name: id.to_string(),
                });
        }
        if let Some(name) = name {
            return self
                .products
                .iter()
                .find(|p| p.name == name)
                .ok_or(LynkError::NotFound {
                    kind: "Product",
                    name: name.to_string(),
                });
        }
        Err(LynkError::InvalidParameterCombination {
            message: "Product name (--prod) or product ID (--prodId) is required".to_string(),
        })
    }

    /// Resolve the environment within a product, defaulting to
    /// [`DEFAULT_ENVIRONMENT`] when omitted.
    pub fn resolve_environment(
        &self,
        product: &'a Product,
        name: Option<&str>,
    ) -> Result<&'a Environment, LynkError> {
        let requested = name.unwrap_or(DEFAULT_ENVIRONMENT);
        let normalized = if WELL_KNOWN_ENVIRONMENTS
            .contains(&requested.to_lowercase().as_str())
        {
            requested.to_lowercase()
        } else {
            requested.to_string()
        };

        product
            .environments
            .iter()
            .find(|e| e.name == normalized)
            .ok_or(LynkError::NotFound {
                kind: "Environment",
                name: requested.to_string(),
            })
    }

    /// Resolve a version within an environment by ID or by the primary
    /// component's version string.
    pub fn resolve_version(
        &self,
        environment: &'a Environment,
        name: Option<&str>,
        id: Option<&str>,
    ) -> Result<&'a VersionNode, LynkError> {
        if let Some(id) = id {
            return environment
                .versions
                .iter()
                .find(|v| v.id == id)
                .ok_or(LynkError::NotFound {
                    kind: "Version",
                    name: id.to_string(),
                });
        }
        if let Some(name) = name {
            return environment
                .versions
                .iter()
                .find(|v| {
                    v.primary_component
                        .as_ref()
                        .and_then(|pc| pc.version.as_deref())
                        == Some(name)
                })
                .ok_or(LynkError::NotFound {
                    kind: "Version",
                    name: name.to_string(),
                });
        }
        Err(LynkError::InvalidParameterCombination {
            message: "Version (--ver) or version ID (--verId) is required".to_string(),
        })
    }
}
