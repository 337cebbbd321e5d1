//! TOML deserialization types (DTO layer).
//!
//! These types exist solely for serde deserialization.
//! They are converted to validated entries via the loader.

use serde::Deserialize;

/// Raw TOML representation of declarative policies.
///
/// Extends the base `Config` with `[[allowed-values]]` sections.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeclarativeConfigDto {
    /// Allowed-values policies.
    #[serde(rename = "allowed-values", default)]
    pub allowed_values: Vec<AllowedValuesDto>,
}

/// TOML representation of an allowed-values policy.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowedValuesDto {
    /// Policy name (e.g., "Approved Regions").
    pub name: String,
    /// Resource kind the policy applies to (e.g., "AWS::S3::Bucket").
    pub kind: String,
    /// Dotted attribute path to check.
    pub attribute: String,
    /// Accepted values.
    pub values: Vec<String>,
    /// Severity (default: "warning").
    #[serde(default = "default_severity_str")]
    pub severity: String,
    /// Documentation link.
    #[serde(default)]
    pub link: Option<String>,
    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Custom violation message.
    #[serde(default)]
    pub message: Option<String>,
}

fn default_severity_str() -> String {
    "warning".to_string()
}
