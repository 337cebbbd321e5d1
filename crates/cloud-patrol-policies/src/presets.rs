//! Policy presets and the built-in catalog.

use crate::{bucket_encryption, bucket_versioning, instance_type, required_tags};
use crate::{BucketEncryption, BucketVersioning};
use cloud_patrol_core::{PolicyBox, PolicyPack, Severity};
use serde::Serialize;

/// Preset packs of zero-configuration policies.
///
/// Configurable policies (`Ec2InstanceType`, `Required Tags`) are never
/// part of a preset; they join the pack when their `[policies.<name>]`
/// section is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Bucket versioning and bucket encryption.
    #[default]
    AwsDefaults,
    /// Bucket encryption only, for gradual adoption.
    Minimal,
    /// No built-in policies; only configured and declarative ones.
    Empty,
}

impl Preset {
    /// All presets in display order.
    pub const ALL: [Self; 3] = [Self::AwsDefaults, Self::Minimal, Self::Empty];

    /// Looks up a preset by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Returns the configuration name (e.g. `aws-defaults`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AwsDefaults => "aws-defaults",
            Self::Minimal => "minimal",
            Self::Empty => "none",
        }
    }

    /// Returns the policies for this preset.
    #[must_use]
    pub fn policies(self) -> Vec<PolicyBox> {
        match self {
            Self::AwsDefaults => vec![
                Box::new(BucketVersioning::new()),
                Box::new(BucketEncryption::new()),
            ],
            Self::Minimal => vec![Box::new(BucketEncryption::new())],
            Self::Empty => Vec::new(),
        }
    }

    /// Returns a pack holding this preset's policies.
    #[must_use]
    pub fn pack(self) -> PolicyPack {
        self.policies().into_iter().collect()
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Description of a built-in policy for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Policy name, also its `[policies.<name>]` key.
    pub name: &'static str,
    /// Kind the policy applies to.
    pub scope: &'static str,
    /// Severity of reported violations.
    pub severity: Severity,
    /// Whether the policy needs a configuration section to be enabled.
    pub configurable: bool,
    /// Human-readable description.
    pub description: &'static str,
    /// Documentation link.
    pub link: &'static str,
}

/// Returns every built-in policy.
#[must_use]
pub fn catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            name: bucket_versioning::NAME,
            scope: S3_BUCKET_STR,
            severity: Severity::Warning,
            configurable: false,
            description: bucket_versioning::DESCRIPTION,
            link: bucket_versioning::LINK,
        },
        CatalogEntry {
            name: bucket_encryption::NAME,
            scope: S3_BUCKET_STR,
            severity: Severity::Error,
            configurable: false,
            description: bucket_encryption::DESCRIPTION,
            link: bucket_encryption::LINK,
        },
        CatalogEntry {
            name: instance_type::NAME,
            scope: EC2_INSTANCE_STR,
            severity: Severity::Info,
            configurable: true,
            description: instance_type::DESCRIPTION,
            link: instance_type::LINK,
        },
        CatalogEntry {
            name: required_tags::NAME,
            scope: "AWS::*",
            severity: Severity::Warning,
            configurable: true,
            description: required_tags::DESCRIPTION,
            link: required_tags::LINK,
        },
    ]
}

const S3_BUCKET_STR: &str = "AWS::S3::Bucket";
const EC2_INSTANCE_STR: &str = "AWS::EC2::Instance";
