//! Policy trait for defining compliance rules.

use crate::context::PolicyContext;
use crate::node::{Node, ResourceKind};
use crate::reporter::Reporter;

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while evaluating policies.
///
/// None of these are violations: violations are reported, never returned.
/// An error here is a policy authoring or configuration defect and aborts
/// the traversal.
#[derive(Debug, Error, Diagnostic)]
pub enum PolicyError {
    /// The policy has no scope and does not override `is_applicable`.
    #[error("policy `{policy}` has no scope; it must override `is_applicable`")]
    #[diagnostic(
        code(cloud_patrol::unscoped_policy),
        help("declare a `scope` kind or implement custom applicability")
    )]
    Unscoped {
        /// Name of the offending policy.
        policy: String,
    },

    /// The policy was constructed with invalid settings.
    #[error("policy `{policy}` is misconfigured: {message}")]
    #[diagnostic(code(cloud_patrol::misconfigured_policy))]
    Misconfigured {
        /// Name of the offending policy.
        policy: String,
        /// What is wrong with the settings.
        message: String,
    },

    /// The policy failed while inspecting a node it had accepted.
    #[error("policy `{policy}` failed on {scope}: {message}")]
    #[diagnostic(code(cloud_patrol::evaluation_defect))]
    Evaluation {
        /// Name of the offending policy.
        policy: String,
        /// Scope of the node being evaluated.
        scope: String,
        /// Failure description.
        message: String,
    },
}

/// A stateless compliance rule scoped to one node kind.
///
/// A policy is built once, then evaluated against every node of a
/// traversal. It must not keep state between nodes.
///
/// # Example
///
/// ```ignore
/// use cloud_patrol_core::{Node, Policy, PolicyContext, PolicyError, Reporter, ResourceKind};
///
/// pub struct NoPublicBuckets;
///
/// static BUCKET: ResourceKind = ResourceKind::from_static("AWS::S3::Bucket");
///
/// impl Policy for NoPublicBuckets {
///     fn name(&self) -> &str { "No Public Buckets" }
///     fn scope(&self) -> Option<&ResourceKind> { Some(&BUCKET) }
///
///     fn evaluate(
///         &self,
///         node: &dyn Node,
///         reporter: &mut dyn Reporter,
///         _context: &PolicyContext,
///     ) -> Result<(), PolicyError> {
///         if node.attribute("public_read").and_then(|a| a.as_bool()) == Some(true) {
///             reporter.add_error(node, self, "Bucket allows public reads");
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Policy: Send + Sync {
    /// Returns the display name of this policy (e.g. "Bucket Versioning").
    fn name(&self) -> &str;

    /// Returns a brief description of what this policy checks.
    fn description(&self) -> &str {
        ""
    }

    /// Returns a documentation link for this policy.
    fn link(&self) -> &str {
        ""
    }

    /// Returns the node kind this policy applies to.
    ///
    /// Policies returning `None` must override [`Policy::is_applicable`].
    fn scope(&self) -> Option<&ResourceKind> {
        None
    }

    /// Checks whether this policy applies to `node`.
    ///
    /// The default compares the node's kind to [`Policy::scope`].
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Unscoped`] if no scope is declared.
    fn is_applicable(&self, node: &dyn Node) -> Result<bool, PolicyError> {
        match self.scope() {
            Some(kind) => Ok(node.kind() == kind),
            None => Err(PolicyError::Unscoped {
                policy: self.name().to_string(),
            }),
        }
    }

    /// Inspects an applicable node and reports zero or more violations.
    ///
    /// # Errors
    ///
    /// Returns an error only for authoring defects; violations go through
    /// the reporter.
    fn evaluate(
        &self,
        node: &dyn Node,
        reporter: &mut dyn Reporter,
        context: &PolicyContext,
    ) -> Result<(), PolicyError>;

    /// Evaluates `node` if the policy applies to it.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Policy::is_applicable`] and
    /// [`Policy::evaluate`].
    fn validate(
        &self,
        node: &dyn Node,
        reporter: &mut dyn Reporter,
        context: &PolicyContext,
    ) -> Result<(), PolicyError> {
        if self.is_applicable(node)? {
            self.evaluate(node, reporter, context)?;
        }
        Ok(())
    }
}

/// Type alias for boxed Policy trait objects.
pub type PolicyBox = Box<dyn Policy>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Attribute;
    use crate::reporter::TerminalReporter;
    use crate::types::Severity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BUCKET: ResourceKind = ResourceKind::from_static("AWS::S3::Bucket");

    struct TestNode {
        kind: ResourceKind,
    }

    impl Node for TestNode {
        fn scope(&self) -> &str {
            "Stack/Thing"
        }
        fn kind(&self) -> &ResourceKind {
            &self.kind
        }
        fn attribute(&self, _path: &str) -> Option<&Attribute> {
            None
        }
        fn annotate(&self, _severity: Severity, _message: &str) {}
    }

    struct CountingPolicy {
        scope: Option<ResourceKind>,
        evaluations: AtomicUsize,
    }

    impl Policy for CountingPolicy {
        fn name(&self) -> &str {
            "counting"
        }
        fn scope(&self) -> Option<&ResourceKind> {
            self.scope.as_ref()
        }
        fn evaluate(
            &self,
            node: &dyn Node,
            reporter: &mut dyn Reporter,
            _context: &PolicyContext,
        ) -> Result<(), PolicyError> {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
            reporter.add_info(node, self, "seen");
            Ok(())
        }
    }

    fn node(kind: &'static str) -> TestNode {
        TestNode {
            kind: ResourceKind::from_static(kind),
        }
    }

    #[test]
    fn default_applicability_matches_kind() {
        let policy = CountingPolicy {
            scope: Some(BUCKET),
            evaluations: AtomicUsize::new(0),
        };
        assert!(policy.is_applicable(&node("AWS::S3::Bucket")).unwrap());
        assert!(!policy.is_applicable(&node("AWS::EC2::Instance")).unwrap());
    }

    #[test]
    fn applicability_is_repeatable() {
        let policy = CountingPolicy {
            scope: Some(BUCKET),
            evaluations: AtomicUsize::new(0),
        };
        let n = node("AWS::S3::Bucket");
        let first = policy.is_applicable(&n).unwrap();
        for _ in 0..5 {
            assert_eq!(policy.is_applicable(&n).unwrap(), first);
        }
    }

    #[test]
    fn validate_skips_inapplicable_nodes() {
        let policy = CountingPolicy {
            scope: Some(BUCKET),
            evaluations: AtomicUsize::new(0),
        };
        let mut reporter = TerminalReporter::new();
        policy
            .validate(&node("AWS::EC2::Instance"), &mut reporter, &PolicyContext::new())
            .unwrap();
        assert_eq!(policy.evaluations.load(Ordering::Relaxed), 0);
        assert!(!reporter.has_violations());
    }

    #[test]
    fn unscoped_policy_fails_before_evaluating() {
        let policy = CountingPolicy {
            scope: None,
            evaluations: AtomicUsize::new(0),
        };
        let mut reporter = TerminalReporter::new();
        let err = policy
            .validate(&node("AWS::S3::Bucket"), &mut reporter, &PolicyContext::new())
            .unwrap_err();
        assert!(matches!(err, PolicyError::Unscoped { ref policy } if policy == "counting"));
        assert_eq!(policy.evaluations.load(Ordering::Relaxed), 0);
        assert!(!reporter.has_violations());
    }
}
