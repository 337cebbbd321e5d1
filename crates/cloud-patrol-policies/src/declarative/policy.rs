//! Policy implementation for `[[allowed-values]]` entries.

use cloud_patrol_core::{Node, Policy, PolicyContext, PolicyError, Reporter, ResourceKind};

use super::loader::AllowedValuesSpec;

/// Reports nodes whose attribute is missing or outside an accepted set.
#[derive(Debug, Clone)]
pub struct AllowedValues {
    spec: AllowedValuesSpec,
}

impl AllowedValues {
    /// Creates the policy from a validated entry.
    #[must_use]
    pub fn new(spec: AllowedValuesSpec) -> Self {
        Self { spec }
    }

    fn message(&self, actual: Option<&str>) -> String {
        if let Some(message) = &self.spec.message {
            return message.clone();
        }
        let expected = self.spec.values.join(", ");
        match actual {
            Some(value) => format!(
                "`{}` is `{value}`, expected one of: {expected}",
                self.spec.attribute
            ),
            None => format!(
                "`{}` is not set, expected one of: {expected}",
                self.spec.attribute
            ),
        }
    }
}

impl Policy for AllowedValues {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> &str {
        &self.spec.description
    }

    fn link(&self) -> &str {
        &self.spec.link
    }

    fn scope(&self) -> Option<&ResourceKind> {
        Some(&self.spec.kind)
    }

    fn evaluate(
        &self,
        node: &dyn Node,
        reporter: &mut dyn Reporter,
        _context: &PolicyContext,
    ) -> Result<(), PolicyError> {
        let message = match node.attribute(&self.spec.attribute) {
            Some(value) if value.is_unresolved() => return Ok(()),
            Some(value) => {
                let actual = value.to_string();
                if self.spec.values.iter().any(|v| *v == actual) {
                    return Ok(());
                }
                self.message(Some(&actual))
            }
            None => self.message(None),
        };
        reporter.record(node, self, self.spec.severity, &message);
        Ok(())
    }
}
