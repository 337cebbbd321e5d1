//! Node abstraction supplied by the host tree.

use crate::types::Severity;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Explicit kind discriminator carried by every node.
///
/// Policies declare the kind they apply to; applicability is decided by
/// exact equality (e.g. `AWS::S3::Bucket`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(Cow<'static, str>);

impl ResourceKind {
    /// Creates a kind from a static string.
    #[must_use]
    pub const fn from_static(kind: &'static str) -> Self {
        Self(Cow::Borrowed(kind))
    }

    /// Creates a kind from any string.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(Cow::Owned(kind.into()))
    }

    /// Returns the kind as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

impl From<String> for ResourceKind {
    fn from(kind: String) -> Self {
        Self(Cow::Owned(kind))
    }
}

/// A property value exposed by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// A value that is not statically known yet; the host resolves it later.
    /// Holds the raw token text, e.g. `${Token[Bucket.Arn]}`.
    Unresolved(String),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Ordered list of values.
    List(Vec<Attribute>),
    /// Nested properties.
    Map(BTreeMap<String, Attribute>),
}

impl Attribute {
    /// Creates an unresolved attribute from its token text.
    #[must_use]
    pub fn unresolved(token: impl Into<String>) -> Self {
        Self::Unresolved(token.into())
    }

    /// Returns true if the value is deferred.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved(_))
    }

    /// Returns the string value, if this is a resolved string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a resolved bool.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list items, if this is a resolved list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Attribute]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested properties, if this is a resolved map.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Attribute>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Follows a dotted path (`a.b.c`) through nested maps.
    ///
    /// Stops at an unresolved value and returns it, so callers can tell a
    /// missing property apart from one that is not known yet.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Attribute> {
        let mut current = self;
        for segment in path.split('.').filter(|s| !s.is_empty()) {
            match current {
                Self::Map(map) => current = map.get(segment)?,
                Self::Unresolved(_) => return Some(current),
                _ => return None,
            }
        }
        Some(current)
    }

    /// Returns true if the value is "empty": an empty string, list or map.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unresolved(token) => f.write_str(token),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k} = {v}")).collect();
                write!(f, "{{ {} }}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<BTreeMap<String, Attribute>> for Attribute {
    fn from(value: BTreeMap<String, Attribute>) -> Self {
        Self::Map(value)
    }
}

impl From<Vec<Attribute>> for Attribute {
    fn from(value: Vec<Attribute>) -> Self {
        Self::List(value)
    }
}

/// The capabilities the engine requires from a tree element.
///
/// Implemented by the host. Annotations go through `&self`; hosts store them
/// with interior mutability since evaluation only ever holds shared borrows.
pub trait Node {
    /// Unique path of this node within the tree (e.g. `Stack/Logs`).
    fn scope(&self) -> &str;

    /// Kind discriminator used for applicability matching.
    fn kind(&self) -> &ResourceKind;

    /// Looks up a property by dotted path.
    fn attribute(&self, path: &str) -> Option<&Attribute>;

    /// Provenance lines for this node, innermost first.
    fn trace(&self) -> Vec<String> {
        Vec::new()
    }

    /// Attaches a human-readable annotation to the node.
    fn annotate(&self, severity: Severity, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, Attribute)]) -> Attribute {
        Attribute::Map(
            entries
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn kinds_compare_by_value() {
        assert_eq!(
            ResourceKind::from_static("AWS::S3::Bucket"),
            ResourceKind::new(String::from("AWS::S3::Bucket"))
        );
        assert_ne!(
            ResourceKind::from_static("AWS::S3::Bucket"),
            ResourceKind::from_static("AWS::S3::BucketPolicy")
        );
    }

    #[test]
    fn lookup_follows_dotted_paths() {
        let attr = map(&[(
            "versioning_configuration",
            map(&[("status", Attribute::String("Enabled".into()))]),
        )]);
        assert_eq!(
            attr.lookup("versioning_configuration.status")
                .and_then(Attribute::as_str),
            Some("Enabled")
        );
        assert!(attr.lookup("versioning_configuration.mfa").is_none());
        assert!(attr.lookup("versioning_configuration.status.x").is_none());
    }

    #[test]
    fn lookup_stops_at_unresolved() {
        let attr = map(&[("bucket_encryption", Attribute::unresolved("${Token[1]}"))]);
        let found = attr.lookup("bucket_encryption.rules").unwrap();
        assert!(found.is_unresolved());
    }

    #[test]
    fn emptiness() {
        assert!(Attribute::List(vec![]).is_empty());
        assert!(Attribute::String(String::new()).is_empty());
        assert!(!Attribute::Bool(false).is_empty());
    }
}
