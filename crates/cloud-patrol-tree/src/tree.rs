//! Loading a resource tree from TOML.

use crate::node::{Annotation, ResourceNode};
use cloud_patrol_core::{Node, NodeVisitor, PolicyError, Traversal};

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use toml::Spanned;
use tracing::{debug, info};

/// Errors raised while loading a resource tree.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The tree file could not be read.
    #[error("Failed to read resource tree {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The tree file is not a valid resource document.
    #[error("Failed to parse resource tree {path}: {message}")]
    Parse {
        /// Path of the document.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// Two resources resolve to the same scope path.
    #[error("Duplicate resource scope `{scope}`")]
    DuplicateScope {
        /// The repeated scope.
        scope: String,
    },

    /// A resource has an empty `id`.
    #[error("{path}:{line}: resource id must not be empty")]
    EmptyId {
        /// Path of the document.
        path: PathBuf,
        /// Line of the offending resource.
        line: usize,
    },
}

#[derive(Debug, Deserialize)]
struct TreeDocument {
    #[serde(default)]
    resources: Vec<Spanned<ResourceEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceEntry {
    id: String,
    kind: String,
    #[serde(default)]
    properties: toml::Table,
    #[serde(default)]
    children: Vec<Spanned<ResourceEntry>>,
}

/// A forest of declared resources loaded from one document.
#[derive(Debug)]
pub struct ResourceTree {
    source: PathBuf,
    roots: Vec<ResourceNode>,
}

impl ResourceTree {
    /// Loads a tree from a file.
    ///
    /// The path is made absolute so traces point at the declaration site
    /// regardless of the working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid tree.
    pub fn from_file(path: &Path) -> Result<Self, TreeError> {
        let content = std::fs::read_to_string(path).map_err(|e| TreeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let source = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Self::parse(&content, source)
    }

    /// Parses a tree from TOML text; `source` names the document in traces.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid TOML, an empty id, or a repeated scope.
    pub fn parse(content: &str, source: impl Into<PathBuf>) -> Result<Self, TreeError> {
        let source = source.into();
        let document: TreeDocument = toml::from_str(content).map_err(|e| TreeError::Parse {
            path: source.clone(),
            message: e.to_string(),
        })?;

        let mut builder = Builder {
            source: &source,
            content,
            seen: HashSet::new(),
        };
        let roots = document
            .resources
            .into_iter()
            .map(|entry| builder.build(entry, None, &[]))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Loaded {} resources from {}",
            builder.seen.len(),
            source.display()
        );

        Ok(Self { source, roots })
    }

    /// Returns the document the tree was loaded from.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Returns the top-level resources.
    #[must_use]
    pub fn roots(&self) -> &[ResourceNode] {
        &self.roots
    }

    /// Iterates over every node, depth-first pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceNode> + '_ {
        let mut stack: Vec<&ResourceNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children().iter().rev());
            Some(node)
        })
    }

    /// Returns the total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true if the tree declares no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Finds a node by scope path.
    #[must_use]
    pub fn find(&self, scope: &str) -> Option<&ResourceNode> {
        self.iter().find(|node| node.scope() == scope)
    }

    /// Returns every annotation with the scope it is attached to, in
    /// traversal order.
    #[must_use]
    pub fn annotated(&self) -> Vec<(&str, Annotation)> {
        self.iter()
            .flat_map(|node| {
                node.annotations()
                    .iter()
                    .map(|annotation| (node.scope(), annotation.clone()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl Traversal for ResourceTree {
    fn walk(&self, visitor: &mut dyn NodeVisitor) -> Result<(), PolicyError> {
        info!("Walking resource tree {}", self.source.display());
        for root in &self.roots {
            root.walk(visitor)?;
        }
        Ok(())
    }
}

struct Builder<'a> {
    source: &'a Path,
    content: &'a str,
    seen: HashSet<String>,
}

impl Builder<'_> {
    fn build(
        &mut self,
        entry: Spanned<ResourceEntry>,
        parent: Option<&str>,
        parent_trace: &[String],
    ) -> Result<ResourceNode, TreeError> {
        let line = self.line_of(entry.span().start);
        let entry = entry.into_inner();

        let id = entry.id.trim();
        if id.is_empty() {
            return Err(TreeError::EmptyId {
                path: self.source.to_path_buf(),
                line,
            });
        }
        let scope = match parent {
            Some(parent) => format!("{parent}/{id}"),
            None => id.to_string(),
        };
        if !self.seen.insert(scope.clone()) {
            return Err(TreeError::DuplicateScope { scope });
        }

        let mut trace = Vec::with_capacity(parent_trace.len() + 1);
        trace.push(format!("{}:{line}", self.source.display()));
        trace.extend_from_slice(parent_trace);

        let mut node = ResourceNode::new(scope.as_str(), entry.kind)
            .with_properties(entry.properties)
            .with_trace(trace.clone());
        for child in entry.children {
            node = node.with_child(self.build(child, Some(&scope), &trace)?);
        }
        Ok(node)
    }

    fn line_of(&self, offset: usize) -> usize {
        let end = offset.min(self.content.len());
        self.content.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloud_patrol_core::{Attribute, Severity};

    const STACK: &str = r#"
[[resources]]
id = "Stack"
kind = "AWS::CloudFormation::Stack"

[[resources.children]]
id = "Logs"
kind = "AWS::S3::Bucket"

[resources.children.properties]
versioning_configuration = { status = "Enabled" }
bucket_encryption = "${Token[LogsEncryption]}"

[[resources.children]]
id = "Web"
kind = "AWS::EC2::Instance"
properties = { instance_type = "t3.small" }
children = [{ id = "Volume", kind = "AWS::EC2::Volume" }]

[[resources]]
id = "Other"
kind = "AWS::CloudFormation::Stack"
"#;

    struct Scopes(Vec<String>);

    impl NodeVisitor for Scopes {
        fn visit(&mut self, node: &dyn Node) -> Result<(), PolicyError> {
            self.0.push(node.scope().to_string());
            Ok(())
        }
    }

    #[test]
    fn scopes_join_ids_in_pre_order() {
        let tree = ResourceTree::parse(STACK, "/project/stack.toml").unwrap();
        let mut scopes = Scopes(Vec::new());
        tree.walk(&mut scopes).unwrap();
        assert_eq!(
            scopes.0,
            vec!["Stack", "Stack/Logs", "Stack/Web", "Stack/Web/Volume", "Other"]
        );
        assert_eq!(tree.len(), 5);
        let iterated: Vec<&str> = tree.iter().map(|n| n.scope()).collect();
        assert_eq!(iterated, scopes.0);
    }

    #[test]
    fn properties_are_decoded() {
        let tree = ResourceTree::parse(STACK, "/project/stack.toml").unwrap();
        let logs = tree.find("Stack/Logs").unwrap();
        assert_eq!(logs.kind().as_str(), "AWS::S3::Bucket");
        assert_eq!(
            logs.attribute("versioning_configuration.status")
                .and_then(Attribute::as_str),
            Some("Enabled")
        );
        assert!(logs
            .attribute("bucket_encryption")
            .is_some_and(Attribute::is_unresolved));
    }

    #[test]
    fn traces_list_declaration_sites_innermost_first() {
        let tree = ResourceTree::parse(STACK, "/project/stack.toml").unwrap();
        let volume = tree.find("Stack/Web/Volume").unwrap().trace();
        assert_eq!(volume.len(), 3);
        assert!(volume
            .iter()
            .all(|line| line.starts_with("/project/stack.toml:")));

        let lines: Vec<usize> = volume
            .iter()
            .map(|l| l.rsplit(':').next().unwrap().parse().unwrap())
            .collect();
        assert!(lines[0] > lines[1]);
        assert!(lines[1] > lines[2]);
        assert_eq!(tree.find("Stack").unwrap().trace(), volume[2..].to_vec());
    }

    #[test]
    fn rejects_duplicate_scopes() {
        let toml = r#"
[[resources]]
id = "Stack"
kind = "AWS::CloudFormation::Stack"
children = [
    { id = "Logs", kind = "AWS::S3::Bucket" },
    { id = "Logs", kind = "AWS::S3::Bucket" },
]
"#;
        let err = ResourceTree::parse(toml, "stack.toml").unwrap_err();
        assert!(matches!(err, TreeError::DuplicateScope { ref scope } if scope == "Stack/Logs"));
    }

    #[test]
    fn same_id_under_different_parents_is_fine() {
        let toml = r#"
[[resources]]
id = "A"
kind = "Group"
children = [{ id = "Logs", kind = "AWS::S3::Bucket" }]

[[resources]]
id = "B"
kind = "Group"
children = [{ id = "Logs", kind = "AWS::S3::Bucket" }]
"#;
        let tree = ResourceTree::parse(toml, "stack.toml").unwrap();
        assert!(tree.find("A/Logs").is_some());
        assert!(tree.find("B/Logs").is_some());
    }

    #[test]
    fn rejects_empty_ids() {
        let toml = "[[resources]]\nid = \" \"\nkind = \"AWS::S3::Bucket\"\n";
        let err = ResourceTree::parse(toml, "stack.toml").unwrap_err();
        assert!(matches!(err, TreeError::EmptyId { .. }));
    }

    #[test]
    fn rejects_malformed_documents() {
        let missing_kind = "[[resources]]\nid = \"Logs\"\n";
        assert!(matches!(
            ResourceTree::parse(missing_kind, "stack.toml").unwrap_err(),
            TreeError::Parse { .. }
        ));

        let unknown_field = "[[resources]]\nid = \"Logs\"\nkind = \"K\"\nprops = {}\n";
        assert!(matches!(
            ResourceTree::parse(unknown_field, "stack.toml").unwrap_err(),
            TreeError::Parse { .. }
        ));
    }

    #[test]
    fn empty_document_is_an_empty_tree() {
        let tree = ResourceTree::parse("", "stack.toml").unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn annotations_are_collected_in_traversal_order() {
        let tree = ResourceTree::parse(STACK, "stack.toml").unwrap();
        tree.find("Stack/Web")
            .unwrap()
            .annotate(Severity::Info, "instance type");
        tree.find("Stack/Logs")
            .unwrap()
            .annotate(Severity::Warning, "versioning");

        let annotated = tree.annotated();
        let scopes: Vec<&str> = annotated.iter().map(|(scope, _)| *scope).collect();
        assert_eq!(scopes, vec!["Stack/Logs", "Stack/Web"]);
        assert_eq!(annotated[0].1.severity, Severity::Warning);
    }
}
