//! GraphQL mutation documents for the Interlynk API.

/// SBOM upload. The document travels as the `doc` file part of a
/// GraphQL multipart request.
pub const SBOM_UPLOAD: &str = "
mutation uploadSbom(
  $doc: Upload!,
  $projectId: ID,
  $projectName: String,
  $projectGroupName: String,
  $projectGroupId: ID
) {
  sbomUpload(
    input: {
      doc: $doc,
      projectId: $projectId,
      projectName: $projectName,
      projectGroupName: $projectGroupName,
      projectGroupId: $projectGroupId
    }
  ) {
    errors
  }
}
";
