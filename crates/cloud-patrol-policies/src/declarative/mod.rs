//! Declarative policies driven by TOML configuration.
//!
//! Lets a project restrict an attribute to a set of values without writing
//! Rust policy code:
//!
//! ```toml
//! [[allowed-values]]
//! name = "Approved Regions"
//! kind = "AWS::S3::Bucket"
//! attribute = "region"
//! values = ["eu-west-1", "eu-central-1"]
//! severity = "error"
//! ```
//!
//! # Architecture
//!
//! ```text
//! TOML text
//!   ↓ serde (DTO layer)
//! config_dto types
//!   ↓ validate + convert
//! Vec<AllowedValuesSpec>
//!   ↓ load_policies_from_toml()
//! Vec<PolicyBox>
//! ```

use cloud_patrol_core::PolicyBox;

pub mod config_dto;
pub mod loader;
mod policy;

pub use loader::{AllowedValuesSpec, LoadError};
pub use policy::AllowedValues;

/// Errors from parsing TOML and loading declarative policies.
#[derive(Debug, thiserror::Error)]
pub enum LoadPoliciesError {
    /// TOML deserialization failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An entry failed validation.
    #[error("{0}")]
    Load(#[from] LoadError),
}

/// Parses TOML content and creates one policy per `[[allowed-values]]` entry.
///
/// Other sections of the document are ignored, so the full
/// `cloud-patrol.toml` can be passed in. Returns `Ok(vec![])` if no
/// declarative entries are present.
///
/// # Errors
///
/// Returns an error if TOML parsing or entry validation fails.
pub fn load_policies_from_toml(content: &str) -> Result<Vec<PolicyBox>, LoadPoliciesError> {
    let dto: config_dto::DeclarativeConfigDto = toml::from_str(content)?;
    let specs = loader::load(dto)?;
    Ok(create_policies(specs))
}

/// Creates policies from validated entries, preserving their order.
#[must_use]
pub fn create_policies(specs: Vec<AllowedValuesSpec>) -> Vec<PolicyBox> {
    specs
        .into_iter()
        .map(|spec| Box::new(AllowedValues::new(spec)) as PolicyBox)
        .collect()
}
