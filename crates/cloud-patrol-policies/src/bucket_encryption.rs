//! Policy requiring S3 bucket encryption.
//!
//! # Checked attribute
//!
//! `bucket_encryption.server_side_encryption_configuration` must hold at
//! least one rule. A bucket without `bucket_encryption`, or with an empty
//! or disabled one, is reported. Unresolved values are left alone.

use crate::kinds::S3_BUCKET;
use cloud_patrol_core::{Node, Policy, PolicyContext, PolicyError, Reporter, ResourceKind};

/// Policy name for bucket encryption.
pub const NAME: &str = "Bucket Encryption";

/// Documentation link for bucket encryption.
pub const LINK: &str = "https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-s3-bucket-bucketencryption.html";

pub(crate) const DESCRIPTION: &str = "This Policy ensures that a bucket is properly encrypted";

const MESSAGE: &str = "Bucket encryption is not enabled. Please consider to add encryption";

/// Requires server-side encryption rules on buckets.
#[derive(Debug, Clone, Default)]
pub struct BucketEncryption;

impl BucketEncryption {
    /// Creates the policy.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_enabled(node: &dyn Node) -> bool {
        let Some(encryption) = node.attribute("bucket_encryption") else {
            return false;
        };
        match encryption.lookup("server_side_encryption_configuration") {
            Some(rules) if rules.is_unresolved() => true,
            Some(rules) => rules.as_list().is_some_and(|r| !r.is_empty()),
            None => false,
        }
    }
}

impl Policy for BucketEncryption {
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
            reporter.add_error(node, self, MESSAGE);
        }
        Ok(())
    }
}
