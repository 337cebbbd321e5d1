//! Policy requiring S3 bucket versioning.
//!
//! # Rationale
//!
//! Versioned buckets keep every revision of an object, so accidental
//! overwrites and deletions can be undone.
//!
//! # Checked attribute
//!
//! `versioning_configuration.status` must be `Enabled`. A configuration or
//! status that is not resolved yet is left alone.

use crate::kinds::S3_BUCKET;
use cloud_patrol_core::{Node, Policy, PolicyContext, PolicyError, Reporter, ResourceKind};

/// Policy name for bucket versioning.
pub const NAME: &str = "Bucket Versioning";

/// Documentation link for bucket versioning.
pub const LINK: &str = "https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-s3-bucket-versioningconfig.html";

pub(crate) const DESCRIPTION: &str = "This ensures that a bucket is properly versioned";

/// Requires `versioning_configuration.status = "Enabled"` on buckets.
#[derive(Debug, Clone, Default)]
pub struct BucketVersioning;

impl BucketVersioning {
    /// Creates the policy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_enabled(node: &dyn Node) -> bool {
        let Some(config) = node.attribute("versioning_configuration") else {
            return false;
        };
        match config.lookup("status") {
            Some(status) if status.is_unresolved() => true,
            Some(status) => status.as_str() == Some("Enabled"),
            None => false,
        }
    }
}

impl Policy for BucketVersioning {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn link(&self) -> &str {
        LINK
    }

    fn scope(&self) -> Option<&ResourceKind> {
        Some(&S3_BUCKET)
    }

    fn evaluate(
        &self,
        node: &dyn Node,
        reporter: &mut dyn Reporter,
        _context: &PolicyContext,
    ) -> Result<(), PolicyError> {
        if !Self::is_enabled(node) {
            reporter.add_warning(node, self, "Bucket versioning is not enabled");
        }
        Ok(())
    }
}
