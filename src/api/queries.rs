//! GraphQL query documents for the Interlynk API.

/// Total count of products in the organization.
pub const PRODUCTS_TOTAL_COUNT: &str = "
query GetProductsCount($name: String, $enabled: Boolean) {
  organization {
    productNodes: projectGroups(
      search: $name
      enabled: $enabled
      orderBy: { field: PROJECT_GROUPS_UPDATED_AT, direction: DESC }
    ) {
      prodCount: totalCount
    }
  }
}
";

/// Full product graph: products with environments and their versions.
pub const PRODUCTS_LIST: &str = "
query GetProducts($first: Int) {
  organization {
    productNodes: projectGroups(
      enabled: true
      first: $first
      orderBy: { field: PROJECT_GROUPS_UPDATED_AT, direction: DESC }
    ) {
      prodCount: totalCount
      products: nodes {
        id
        name
        updatedAt
        enabled
        environments: projects {
          id: id
          name: name
          versions: sboms {
            id
            vulnRunStatus
            updatedAt
            primaryComponent {
              name
              version
            }
          }
        }
      }
    }
  }
}
";

/// SBOM download. The server resolves either the ID pair or the
/// name triple; option variables left unset fall back to server defaults.
pub const SBOM_DOWNLOAD: &str = "
query downloadSbom($projectId: Uuid, $sbomId: Uuid, $projectName: String,
                   $projectGroupName: String, $versionName: String,
                   $includeVulns: Boolean, $spec: SbomSpec, $specVersion: String,
                   $original: Boolean, $package: Boolean, $lite: Boolean,
                   $excludeParts: Boolean, $supportLevelOnly: Boolean,
                   $includeSupportStatus: Boolean) {
  sbom(projectId: $projectId, sbomId: $sbomId, projectName: $projectName,
       projectGroupName: $projectGroupName, versionName: $versionName) {
    download(
      sbomId: $sbomId
      includeVulns: $includeVulns
      spec: $spec
      specVersion: $specVersion
      original: $original
      dontPackageSbom: $package
      lite: $lite
      excludeParts: $excludeParts
      supportLevelOnly: $supportLevelOnly
      includeSupportStatus: $includeSupportStatus
    ) {
      content
      contentType
      filename
      __typename
    }
    __typename
  }
}
";
