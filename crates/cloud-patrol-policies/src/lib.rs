//! # cloud-patrol-policies
//!
//! Built-in compliance policies for cloud-patrol.
//!
//! ## Available Policies
//!
//! | Name | Scope | Severity | Description |
//! |------|-------|----------|-------------|
//! | `Bucket Versioning` | `AWS::S3::Bucket` | warning | Requires versioning to be enabled |
//! | `Bucket Encryption` | `AWS::S3::Bucket` | error | Requires server-side encryption |
//! | `Ec2InstanceType` | `AWS::EC2::Instance` | info | Recommends an allow-list of instance types |
//! | `Required Tags` | any `AWS::*` kind | warning | Requires a set of tag keys |
//!
//! Additional `[[allowed-values]]` policies can be declared in
//! `cloud-patrol.toml` without writing Rust code.
//!
//! ## Usage
//!
//! ```ignore
//! use cloud_patrol_core::PolicyPack;
//! use cloud_patrol_policies::{Ec2InstanceType, InstanceTypeConfig, Preset};
//!
//! let mut pack = Preset::AwsDefaults.pack();
//! pack.add(Ec2InstanceType::new(InstanceTypeConfig {
//!     instance_classes: vec!["t3".into()],
//!     instance_sizes: vec!["small".into(), "medium".into()],
//! })?);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assemble;
mod bucket_encryption;
mod bucket_versioning;
pub mod declarative;
mod instance_type;
pub mod kinds;
mod presets;
mod required_tags;

pub use assemble::{build_pack, AssemblyError};
pub use bucket_encryption::BucketEncryption;
pub use bucket_versioning::BucketVersioning;
pub use instance_type::{Ec2InstanceType, InstanceTypeConfig};
pub use presets::{catalog, CatalogEntry, Preset};
pub use required_tags::{RequiredTags, RequiredTagsConfig};

/// Re-export core types for convenience.
pub use cloud_patrol_core::{Policy, PolicyPack, Severity};
