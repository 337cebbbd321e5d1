//! # cloud-patrol-core
//!
//! Core policy engine for auditing declarative infrastructure trees.
//!
//! This crate provides the foundational traits and types for building
//! compliance checks. It includes:
//!
//! - [`Node`] trait describing what the engine needs from a tree element
//! - [`Policy`] trait for stateless, kind-scoped rules
//! - [`PolicyPack`] for ordered policy collections
//! - [`Reporter`] with [`TerminalReporter`] and [`HostReporter`] strategies
//! - [`Patrol`] for binding a pack to an external traversal
//!
//! The engine never walks a tree on its own. A host implements
//! [`Traversal`] and calls back into [`NodeVisitor::visit`] once per node.
//!
//! ## Example
//!
//! ```ignore
//! use cloud_patrol_core::{Patrol, PolicyContext, PolicyPack, ReporterMode};
//!
//! let mut pack = PolicyPack::new();
//! pack.add(BucketVersioning::new());
//!
//! let mut patrol = Patrol::new(&pack, PolicyContext::new(), ReporterMode::Terminal);
//! let failed = patrol.check(&tree)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod node;
mod pack;
mod patrol;
mod policy;
mod reporter;
mod types;

pub use config::{Config, ConfigError, PolicyConfig};
pub use context::PolicyContext;
pub use node::{Attribute, Node, ResourceKind};
pub use pack::PolicyPack;
pub use patrol::{NodeVisitor, Patrol, ReporterMode, Traversal};
pub use policy::{Policy, PolicyBox, PolicyError};
pub use reporter::{HostReporter, Reporter, TerminalReporter};
pub use types::{Severity, Violation, ViolationList, ViolationListItem};
