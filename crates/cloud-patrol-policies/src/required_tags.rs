//! Policy requiring tag keys on every resource of a provider.
//!
//! Unlike the other built-in policies this one has no single scope: it
//! applies to every node whose kind starts with a prefix (`AWS::` by
//! default) and therefore overrides [`Policy::is_applicable`].
//!
//! # Configuration
//!
//! - `tags`: tag keys that must be present
//! - `kind_prefix`: kind prefix selecting the nodes to check
//!
//! # Context
//!
//! - `required_tags` (string array): extra keys required for this run,
//!   e.g. an environment-wide `cost-center`.
//!
//! Tags are read from the `tags` attribute, either a table of key/value
//! pairs or a list of `{ key, value }` entries.

use cloud_patrol_core::{
    Attribute, Node, Policy, PolicyConfig, PolicyContext, PolicyError, Reporter,
};
use serde::Deserialize;

/// Policy name for required tags.
pub const NAME: &str = "Required Tags";

/// Documentation link for required tags.
pub const LINK: &str =
    "https://docs.aws.amazon.com/AWSCloudFormation/latest/UserGuide/aws-properties-resource-tags.html";

pub(crate) const DESCRIPTION: &str = "This Policy ensures that resources carry the required tags";

const DEFAULT_KIND_PREFIX: &str = "AWS::";

/// Context key holding extra required tag keys.
pub const CONTEXT_KEY: &str = "required_tags";

/// Settings for [`RequiredTags`].
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredTagsConfig {
    /// Tag keys that must be present.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Only nodes whose kind starts with this prefix are checked.
    #[serde(default = "default_kind_prefix")]
    pub kind_prefix: String,
}

impl Default for RequiredTagsConfig {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            kind_prefix: default_kind_prefix(),
        }
    }
}

fn default_kind_prefix() -> String {
    DEFAULT_KIND_PREFIX.to_string()
}

/// Reports one warning per missing tag key.
#[derive(Debug, Clone)]
pub struct RequiredTags {
    config: RequiredTagsConfig,
}

impl RequiredTags {
    /// Creates the policy from its settings.
    #[must_use]
    pub fn new(config: RequiredTagsConfig) -> Self {
        Self { config }
    }

    /// Creates the policy from a `[policies."Required Tags"]` section.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Misconfigured`] if `tags` is not a list of
    /// strings or `kind_prefix` is not a string.
    pub fn from_policy_config(section: &PolicyConfig) -> Result<Self, PolicyError> {
        section
            .options::<RequiredTagsConfig>()
            .map(Self::new)
            .map_err(|e| PolicyError::Misconfigured {
                policy: NAME.to_string(),
                message: e.to_string(),
            })
    }

    /// Collects the tag keys set on a node.
    ///
    /// `None` when any entry or key is unresolved: the missing tag may be
    /// the one behind the token.
    fn present_keys(tags: &Attribute) -> Option<Vec<&str>> {
        match tags {
            Attribute::Unresolved(_) => None,
            Attribute::Map(map) => Some(map.keys().map(String::as_str).collect()),
            Attribute::List(items) => {
                let mut keys = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_unresolved() {
                        return None;
                    }
                    match item.lookup("key") {
                        Some(key) if key.is_unresolved() => return None,
                        Some(key) => keys.extend(key.as_str()),
                        None => {}
                    }
                }
                Some(keys)
            }
            _ => Some(Vec::new()),
        }
    }
}

impl Policy for RequiredTags {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn link(&self) -> &str {
        LINK
    }

    fn is_applicable(&self, node: &dyn Node) -> Result<bool, PolicyError> {
        Ok(node.kind().as_str().starts_with(&self.config.kind_prefix))
    }

    fn evaluate(
        &self,
        node: &dyn Node,
        reporter: &mut dyn Reporter,
        context: &PolicyContext,
    ) -> Result<(), PolicyError> {
        let present = match node.attribute("tags").map(Self::present_keys) {
            None => Vec::new(),
            Some(Some(keys)) => keys,
            Some(None) => return Ok(()),
        };

        let extra = context.get_str_array(CONTEXT_KEY);
        let mut required: Vec<&str> = self.config.tags.iter().map(String::as_str).collect();
        for key in &extra {
            if !required.contains(&key.as_str()) {
                required.push(key);
            }
        }

        for key in required {
            if !present.contains(&key) {
                reporter.add_warning(node, self, &format!("Missing required tag `{key}`"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_patrol_core::TerminalReporter;
    use cloud_patrol_tree::ResourceNode;

    fn policy(tags: &[&str]) -> RequiredTags {
        RequiredTags::new(RequiredTagsConfig {
            tags: tags.iter().map(ToString::to_string).collect(),
            ..RequiredTagsConfig::default()
        })
    }

    fn node(kind: &str, properties: &str) -> ResourceNode {
        let table: toml::Table = toml::from_str(properties).expect("valid properties");
        ResourceNode::new("Stack/Thing", kind).with_properties(table)
    }

    fn messages(policy: &RequiredTags, node: &ResourceNode, ctx: &PolicyContext) -> Vec<String> {
        let mut reporter = TerminalReporter::new();
        policy
            .validate(node, &mut reporter, ctx)
            .expect("custom applicability never fails");
        reporter
            .violations()
            .items()
            .iter()
            .flat_map(|item| &item.violations)
            .map(|v| v.message.clone())
            .collect()
    }

    #[test]
    fn test_applies_by_prefix_without_scope() {
        let p = policy(&["owner"]);
        assert!(p.scope().is_none());
        assert!(p.is_applicable(&node("AWS::S3::Bucket", "")).unwrap());
        assert!(!p.is_applicable(&node("Custom::Thing", "")).unwrap());
    }

    #[test]
    fn test_reports_each_missing_key() {
        let found = messages(
            &policy(&["owner", "team"]),
            &node("AWS::S3::Bucket", ""),
            &PolicyContext::new(),
        );
        assert_eq!(
            found,
            vec!["Missing required tag `owner`", "Missing required tag `team`"]
        );
    }

    #[test]
    fn test_reads_table_and_list_tags() {
        let p = policy(&["owner"]);
        let table = node("AWS::S3::Bucket", r#"tags = { owner = "data" }"#);
        let list = node(
            "AWS::EC2::Instance",
            r#"tags = [{ key = "owner", value = "web" }]"#,
        );
        assert!(messages(&p, &table, &PolicyContext::new()).is_empty());
        assert!(messages(&p, &list, &PolicyContext::new()).is_empty());
    }

    #[test]
    fn test_context_adds_required_keys() {
        let ctx = PolicyContext::new().with(
            CONTEXT_KEY,
            toml::Value::Array(vec!["cost-center".into(), "owner".into()]),
        );
        let found = messages(
            &policy(&["owner"]),
            &node("AWS::S3::Bucket", r#"tags = { owner = "data" }"#),
            &ctx,
        );
        assert_eq!(found, vec!["Missing required tag `cost-center`"]);
    }

    #[test]
    fn test_ignores_unresolved_tags() {
        let found = messages(
            &policy(&["owner"]),
            &node("AWS::S3::Bucket", r#"tags = "${Token[Tags]}""#),
            &PolicyContext::new(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn test_ignores_unresolved_list_entries() {
        let p = policy(&["owner"]);
        let entry = node("AWS::S3::Bucket", r#"tags = ["${Token[OwnerTag]}"]"#);
        let key = node(
            "AWS::S3::Bucket",
            r#"tags = [{ key = "${Token[OwnerKey]}", value = "x" }]"#,
        );
        assert!(messages(&p, &entry, &PolicyContext::new()).is_empty());
        assert!(messages(&p, &key, &PolicyContext::new()).is_empty());
    }

    #[test]
    fn test_from_policy_config() {
        let section: PolicyConfig = toml::from_str(
            r#"
tags = ["owner"]
kind_prefix = "AWS::S3::"
"#,
        )
        .unwrap();
        let p = RequiredTags::from_policy_config(&section).unwrap();
        assert!(p.is_applicable(&node("AWS::S3::Bucket", "")).unwrap());
        assert!(!p.is_applicable(&node("AWS::EC2::Instance", "")).unwrap());

        let bad: PolicyConfig = toml::from_str("tags = 3").unwrap();
        assert!(matches!(
            RequiredTags::from_policy_config(&bad),
            Err(PolicyError::Misconfigured { .. })
        ));
    }
}
