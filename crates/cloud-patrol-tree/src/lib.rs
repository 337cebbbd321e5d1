//! # cloud-patrol-tree
//!
//! A reference host for the cloud-patrol engine: a tree of declared cloud
//! resources loaded from TOML.
//!
//! ```toml
//! [[resources]]
//! id = "ExampleStack"
//! kind = "AWS::CloudFormation::Stack"
//!
//! [[resources.children]]
//! id = "Logs"
//! kind = "AWS::S3::Bucket"
//!
//! [resources.children.properties]
//! versioning_configuration = { status = "Enabled" }
//! bucket_encryption = "${Token[LogsEncryption]}"
//! ```
//!
//! Each resource becomes a [`ResourceNode`] whose scope is the `/`-joined
//! path of ids (`ExampleStack/Logs`). Strings shaped like `${...}` are
//! deferred values and decode as [`Attribute::Unresolved`].
//!
//! [`ResourceTree`] implements [`Traversal`](cloud_patrol_core::Traversal)
//! with a depth-first pre-order walk.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attribute;
mod node;
mod tree;

pub use attribute::decode;
pub use node::{Annotation, ResourceNode};
pub use tree::{ResourceTree, TreeError};

pub use cloud_patrol_core::Attribute;
