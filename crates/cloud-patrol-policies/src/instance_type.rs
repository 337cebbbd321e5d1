//! Policy recommending an allow-list of EC2 instance types.
//!
//! # Configuration
//!
//! - `instance_classes`: instance families such as `t3`, `m5`
//! - `instance_sizes`: sizes such as `small`, `large`
//!
//! With both lists set, the allow-list is their cartesian product
//! (`t3.small`, `t3.large`, ...). With classes only, any size of those
//! classes matches. With sizes only, any class of those sizes matches.
//! At least one list must be non-empty.

use crate::kinds::EC2_INSTANCE;
use cloud_patrol_core::{
    Node, Policy, PolicyConfig, PolicyContext, PolicyError, Reporter, ResourceKind,
};
use serde::Deserialize;

/// Policy name for the instance type policy.
pub const NAME: &str = "Ec2InstanceType";

/// Documentation link for the instance type policy.
pub const LINK: &str = "https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-ec2-instance.html#cfn-ec2-instance-instancetype";

pub(crate) const DESCRIPTION: &str = "This Policy ensures that we're using instances of a certain class";

/// Settings for [`Ec2InstanceType`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceTypeConfig {
    /// Allowed instance classes (e.g. `t3`).
    #[serde(default)]
    pub instance_classes: Vec<String>,
    /// Allowed instance sizes (e.g. `small`).
    #[serde(default)]
    pub instance_sizes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InstanceTypePattern {
    Exact(String),
    Class(String),
    Size(String),
}

impl InstanceTypePattern {
    fn matches(&self, instance_type: &str) -> bool {
        match self {
            Self::Exact(t) => instance_type == t,
            Self::Class(prefix) => instance_type.starts_with(prefix.as_str()),
            Self::Size(size) => instance_type.rsplit('.').next() == Some(size.as_str()),
        }
    }
}

impl std::fmt::Display for InstanceTypePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(t) | Self::Class(t) | Self::Size(t) => f.write_str(t),
        }
    }
}

/// Reports instances whose `instance_type` is outside the allow-list.
#[derive(Debug, Clone)]
pub struct Ec2InstanceType {
    allowed: Vec<InstanceTypePattern>,
    message: String,
}

impl Ec2InstanceType {
    /// Creates the policy from its settings.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Misconfigured`] if both lists are empty.
    pub fn new(config: InstanceTypeConfig) -> Result<Self, PolicyError> {
        let allowed = expand(&config);
        if allowed.is_empty() {
            return Err(PolicyError::Misconfigured {
                policy: NAME.to_string(),
                message: "at least one of `instance_classes` or `instance_sizes` must be set"
                    .to_string(),
            });
        }
        let listing = allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Self {
            message: format!("Please consider using instances from the following types {listing}"),
            allowed,
        })
    }

    /// Creates the policy from a `[policies.Ec2InstanceType]` section.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Misconfigured`] if an option is not a list of
    /// strings or the allow-list is empty.
    pub fn from_policy_config(section: &PolicyConfig) -> Result<Self, PolicyError> {
        let config = section
            .options::<InstanceTypeConfig>()
            .map_err(|e| PolicyError::Misconfigured {
                policy: NAME.to_string(),
                message: e.to_string(),
            })?;
        Self::new(config)
    }

    /// Returns the expanded allow-list, e.g. `["t3.small", "t3.medium"]`.
    #[must_use]
    pub fn instance_types(&self) -> Vec<String> {
        self.allowed.iter().map(ToString::to_string).collect()
    }
}

fn expand(config: &InstanceTypeConfig) -> Vec<InstanceTypePattern> {
    match (
        config.instance_classes.is_empty(),
        config.instance_sizes.is_empty(),
    ) {
        (false, false) => config
            .instance_classes
            .iter()
            .flat_map(|class| {
                config
                    .instance_sizes
                    .iter()
                    .map(move |size| InstanceTypePattern::Exact(format!("{class}.{size}")))
            })
            .collect(),
        (false, true) => config
            .instance_classes
            .iter()
            .map(|class| InstanceTypePattern::Class(format!("{class}.")))
            .collect(),
        (true, false) => config
            .instance_sizes
            .iter()
            .map(|size| InstanceTypePattern::Size(size.clone()))
            .collect(),
        (true, true) => Vec::new(),
    }
}

impl Policy for Ec2InstanceType {
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
        Some(&EC2_INSTANCE)
    }

    fn evaluate(
        &self,
        node: &dyn Node,
        reporter: &mut dyn Reporter,
        _context: &PolicyContext,
    ) -> Result<(), PolicyError> {
        let instance_type = node.attribute("instance_type");
        if instance_type.is_some_and(|t| t.is_unresolved()) {
            return Ok(());
        }
        let allowed = instance_type
            .and_then(|t| t.as_str())
            .is_some_and(|t| self.allowed.iter().any(|p| p.matches(t)));
        if !allowed {
            reporter.add_info(node, self, &self.message);
        }
        Ok(())
    }
}
