//! Core types for policy violations and their aggregation.

use crate::node::{Node, ResourceKind};
use crate::policy::Policy;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::path::Path;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Width the `[SEVERITY]` tag is padded to in terminal output.
const SEVERITY_TAG_WIDTH: usize = 10;

/// Severity level for policy violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational hint, e.g. a recommended alternative.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Returns the uppercase label (e.g. `WARNING`).
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Returns the bracketed tag used in terminal reports (e.g. `[ERROR]`).
    #[must_use]
    pub fn tag(self) -> String {
        format!("[{}]", self.label())
    }

    /// Returns the ANSI color escape for this severity.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Info => "\x1b[36m",
            Self::Warning => "\x1b[33m",
            Self::Error => "\x1b[31m",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A policy violation recorded against a single node.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    /// Scope path of the offending node.
    pub scope: String,
    /// Kind of the offending node.
    pub resource_kind: ResourceKind,
    /// Name of the policy that reported it.
    pub policy: String,
    /// Documentation link of the policy.
    pub link: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// Provenance lines of the offending node.
    #[serde(skip)]
    pub trace: Vec<String>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(
        scope: impl Into<String>,
        resource_kind: ResourceKind,
        policy: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            scope: scope.into(),
            resource_kind,
            policy: policy.into(),
            link: String::new(),
            severity,
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// Creates a violation for `node`, taking scope, kind and trace from it.
    #[must_use]
    pub fn for_node(
        node: &dyn Node,
        policy: &dyn Policy,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            node.scope(),
            node.kind().clone(),
            policy.name(),
            severity,
            message,
        )
        .with_link(policy.link())
        .with_trace(node.trace())
    }

    /// Sets the documentation link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    /// Sets the provenance lines.
    #[must_use]
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Returns the trace lines that mention `root`, joined by newlines.
    ///
    /// With no root every line is kept.
    #[must_use]
    pub fn local_trace(&self, root: Option<&Path>) -> String {
        let root = root.map(|r| r.to_string_lossy().into_owned());
        self.trace
            .iter()
            .filter(|line| root.as_deref().map_or(true, |r| line.contains(r)))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Formats the violation as a single report line.
    #[must_use]
    pub fn format(&self, color: bool) -> String {
        let tag = format!("{:<SEVERITY_TAG_WIDTH$}", self.severity.tag());
        let tag = if color {
            format!("{}{tag}{RESET}", self.severity.color())
        } else {
            tag
        };
        if self.link.is_empty() {
            format!("{tag} {}: {}", self.policy, self.message)
        } else {
            format!("{tag} {}: {} - {}", self.policy, self.message, self.link)
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}): {} [{}] {}",
            self.scope, self.resource_kind, self.severity, self.policy, self.message
        )
    }
}

/// Violations sharing one scope path.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationListItem {
    /// Scope path shared by all violations in this item.
    pub scope: String,
    /// Kind of the node, taken from the first violation.
    pub resource_kind: ResourceKind,
    /// Violations in recording order.
    pub violations: Vec<Violation>,
    /// Provenance computed once from the first violation.
    pub trace: String,
}

impl ViolationListItem {
    /// Starts a new group from its first violation.
    #[must_use]
    pub fn new(violation: Violation, trace_root: Option<&Path>) -> Self {
        Self {
            scope: violation.scope.clone(),
            resource_kind: violation.resource_kind.clone(),
            trace: violation.local_trace(trace_root),
            violations: vec![violation],
        }
    }

    /// Appends a violation. The trace is left untouched.
    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Renders the group as an indented report block.
    #[must_use]
    pub fn render(&self, color: bool) -> String {
        let mut out = String::new();
        let header = format!("{} ({}):", self.scope, self.resource_kind);
        if color {
            let _ = writeln!(out, "{BOLD}{header}{RESET}");
        } else {
            let _ = writeln!(out, "{header}");
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "  -------------- Violations ------------------");
        for violation in &self.violations {
            let _ = writeln!(out, "  {}", violation.format(color));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "  -------------- Traces ----------------------");
        for line in self.trace.lines() {
            let _ = writeln!(out, "  {line}");
        }
        let _ = writeln!(out);
        out
    }
}

/// Violations grouped by scope, in first-seen order.
#[derive(Debug, Default, Serialize)]
pub struct ViolationList {
    items: Vec<ViolationListItem>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ViolationList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation, grouping it under its scope.
    pub fn add(&mut self, violation: Violation, trace_root: Option<&Path>) {
        if let Some(&i) = self.index.get(&violation.scope) {
            self.items[i].add(violation);
        } else {
            self.index.insert(violation.scope.clone(), self.items.len());
            self.items.push(ViolationListItem::new(violation, trace_root));
        }
    }

    /// Returns the groups in first-seen order.
    #[must_use]
    pub fn items(&self) -> &[ViolationListItem] {
        &self.items
    }

    /// Looks up the group for a scope.
    #[must_use]
    pub fn get(&self, scope: &str) -> Option<&ViolationListItem> {
        self.index.get(scope).map(|&i| &self.items[i])
    }

    /// Returns the number of scopes with violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total number of violations across all scopes.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.items.iter().map(|item| item.violations.len()).sum()
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |severity: Severity| {
            self.items
                .iter()
                .flat_map(|item| &item.violations)
                .filter(|v| v.severity == severity)
                .count()
        };
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Renders every group in first-seen order.
    #[must_use]
    pub fn render(&self, color: bool) -> String {
        self.items.iter().map(|item| item.render(color)).collect()
    }
}
