//! Resource kinds used by the built-in policies.

use cloud_patrol_core::ResourceKind;

/// `AWS::S3::Bucket`.
pub static S3_BUCKET: ResourceKind = ResourceKind::from_static("AWS::S3::Bucket");

/// `AWS::EC2::Instance`.
pub static EC2_INSTANCE: ResourceKind = ResourceKind::from_static("AWS::EC2::Instance");
