//! Resource nodes and their annotations.

use crate::attribute::decode;
use cloud_patrol_core::{
    Attribute, Node, NodeVisitor, PolicyError, ResourceKind, Severity, Traversal,
};

use serde::Serialize;
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;

/// A message attached to a node by the host reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Severity of the annotation.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl std::fmt::Display for Annotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// A declared resource with its properties and children.
#[derive(Debug)]
pub struct ResourceNode {
    scope: String,
    kind: ResourceKind,
    properties: BTreeMap<String, Attribute>,
    trace: Vec<String>,
    children: Vec<ResourceNode>,
    annotations: RefCell<Vec<Annotation>>,
}

impl ResourceNode {
    /// Creates a node without properties.
    #[must_use]
    pub fn new(scope: impl Into<String>, kind: impl Into<ResourceKind>) -> Self {
        Self {
            scope: scope.into(),
            kind: kind.into(),
            properties: BTreeMap::new(),
            trace: Vec::new(),
            children: Vec::new(),
            annotations: RefCell::new(Vec::new()),
        }
    }

    /// Sets a single top-level property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: Attribute) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Sets properties from a TOML table, decoding deferred tokens.
    #[must_use]
    pub fn with_properties(mut self, table: toml::Table) -> Self {
        self.properties
            .extend(table.into_iter().map(|(key, value)| (key, decode(value))));
        self
    }

    /// Sets the provenance lines, innermost first.
    #[must_use]
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: ResourceNode) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the child nodes in declaration order.
    #[must_use]
    pub fn children(&self) -> &[ResourceNode] {
        &self.children
    }

    /// Returns the annotations attached so far.
    #[must_use]
    pub fn annotations(&self) -> Ref<'_, Vec<Annotation>> {
        self.annotations.borrow()
    }
}

impl Node for ResourceNode {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    fn attribute(&self, path: &str) -> Option<&Attribute> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.properties.get(head)?;
        match rest {
            Some(rest) => value.lookup(rest),
            None => Some(value),
        }
    }

    fn trace(&self) -> Vec<String> {
        self.trace.clone()
    }

    fn annotate(&self, severity: Severity, message: &str) {
        self.annotations.borrow_mut().push(Annotation {
            severity,
            message: message.to_string(),
        });
    }
}

/// Walks the node and its descendants, depth-first pre-order.
impl Traversal for ResourceNode {
    fn walk(&self, visitor: &mut dyn NodeVisitor) -> Result<(), PolicyError> {
        visitor.visit(self)?;
        for child in &self.children {
            child.walk(visitor)?;
        }
        Ok(())
    }
}
