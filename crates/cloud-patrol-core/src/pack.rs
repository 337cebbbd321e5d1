//! Ordered policy collections.

use crate::context::PolicyContext;
use crate::node::Node;
use crate::policy::{Policy, PolicyBox, PolicyError};
use crate::reporter::Reporter;

use tracing::trace;

/// An ordered collection of policies evaluated together.
///
/// Registration order is evaluation order. Packs are assembled before a
/// traversal starts and only read while it runs.
#[derive(Default)]
pub struct PolicyPack {
    policies: Vec<PolicyBox>,
}

impl PolicyPack {
    /// Creates an empty pack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a policy. Duplicates are kept.
    pub fn add<P: Policy + 'static>(&mut self, policy: P) {
        self.policies.push(Box::new(policy));
    }

    /// Appends a policy, returning the updated pack.
    #[must_use]
    pub fn with<P: Policy + 'static>(mut self, policy: P) -> Self {
        self.add(policy);
        self
    }

    /// Measures `node` against every policy in registration order.
    ///
    /// # Errors
    ///
    /// Returns the first policy error; later policies are not run for this
    /// node.
    pub fn validate(
        &self,
        node: &dyn Node,
        context: &PolicyContext,
        reporter: &mut dyn Reporter,
    ) -> Result<(), PolicyError> {
        for policy in &self.policies {
            trace!("Validating {} against {}", node.scope(), policy.name());
            policy.validate(node, reporter, context)?;
        }
        Ok(())
    }

    /// Returns the number of registered policies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Returns true if no policy is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Iterates policies in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Policy> {
        self.policies.iter().map(|policy| policy.as_ref())
    }

    /// Returns policy names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|policy| policy.name()).collect()
    }
}

impl std::fmt::Debug for PolicyPack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyPack")
            .field("policies", &self.names())
            .finish()
    }
}

impl FromIterator<PolicyBox> for PolicyPack {
    fn from_iter<I: IntoIterator<Item = PolicyBox>>(iter: I) -> Self {
        Self {
            policies: iter.into_iter().collect(),
        }
    }
}

impl Extend<PolicyBox> for PolicyPack {
    fn extend<I: IntoIterator<Item = PolicyBox>>(&mut self, iter: I) {
        self.policies.extend(iter);
    }
}
