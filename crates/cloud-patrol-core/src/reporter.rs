//! Violation sinks: terminal aggregation and host annotation.

use crate::node::Node;
use crate::policy::Policy;
use crate::types::{Severity, Violation, ViolationList};

use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::debug;

const REPORT_TITLE: &str = "Cloud Patrol Report";

/// Receives violations from policies and renders or forwards them.
pub trait Reporter {
    /// Records a violation of the given severity.
    fn record(&mut self, node: &dyn Node, policy: &dyn Policy, severity: Severity, message: &str);

    /// Records an informational violation.
    fn add_info(&mut self, node: &dyn Node, policy: &dyn Policy, message: &str) {
        self.record(node, policy, Severity::Info, message);
    }

    /// Records a warning.
    fn add_warning(&mut self, node: &dyn Node, policy: &dyn Policy, message: &str) {
        self.record(node, policy, Severity::Warning, message);
    }

    /// Records an error.
    fn add_error(&mut self, node: &dyn Node, policy: &dyn Policy, message: &str) {
        self.record(node, policy, Severity::Error, message);
    }

    /// Returns true if anything was recorded.
    fn has_violations(&self) -> bool;

    /// Renders the final report as text. Empty when the host renders.
    fn render(&self) -> String;

    /// Prints the rendered report to stdout.
    fn generate_report(&self) {
        print!("{}", self.render());
    }
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn record(&mut self, node: &dyn Node, policy: &dyn Policy, severity: Severity, message: &str) {
        (**self).record(node, policy, severity, message);
    }

    fn has_violations(&self) -> bool {
        (**self).has_violations()
    }

    fn render(&self) -> String {
        (**self).render()
    }
}

/// Aggregates violations per scope and renders a colored terminal report.
#[derive(Debug)]
pub struct TerminalReporter {
    violations: ViolationList,
    trace_root: Option<PathBuf>,
    color: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    /// Creates a reporter with color enabled and no trace filtering.
    #[must_use]
    pub fn new() -> Self {
        Self {
            violations: ViolationList::new(),
            trace_root: None,
            color: true,
        }
    }

    /// Keeps only trace lines that mention `root` (usually the working
    /// directory of the audited project).
    #[must_use]
    pub fn with_trace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.trace_root = Some(root.into());
        self
    }

    /// Enables or disables ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Returns the aggregated violations.
    #[must_use]
    pub fn violations(&self) -> &ViolationList {
        &self.violations
    }

    /// Consumes the reporter, returning the aggregated violations.
    #[must_use]
    pub fn into_violations(self) -> ViolationList {
        self.violations
    }
}

impl Reporter for TerminalReporter {
    fn record(&mut self, node: &dyn Node, policy: &dyn Policy, severity: Severity, message: &str) {
        debug!(
            "{} on {}: {} {}",
            policy.name(),
            node.scope(),
            severity,
            message
        );
        let violation = Violation::for_node(node, policy, severity, message);
        self.violations.add(violation, self.trace_root.as_deref());
    }

    fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    fn render(&self) -> String {
        let title = if self.color {
            format!("\x1b[4m\x1b[35;1m{REPORT_TITLE}\x1b[0m")
        } else {
            REPORT_TITLE.to_string()
        };
        format!("{title}\n\n{}", self.violations.render(self.color))
    }
}

/// Forwards violations to the node's own annotations.
///
/// Used when a host environment presents annotations itself; nothing is
/// aggregated here beyond which scopes were flagged.
#[derive(Debug, Default)]
pub struct HostReporter {
    flagged: BTreeSet<String>,
}

impl HostReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the scopes that received at least one annotation.
    pub fn flagged_scopes(&self) -> impl Iterator<Item = &str> {
        self.flagged.iter().map(String::as_str)
    }
}

impl Reporter for HostReporter {
    fn record(&mut self, node: &dyn Node, policy: &dyn Policy, severity: Severity, message: &str) {
        debug!("Annotating {} from {}", node.scope(), policy.name());
        node.annotate(severity, message);
        self.flagged.insert(node.scope().to_string());
    }

    fn has_violations(&self) -> bool {
        !self.flagged.is_empty()
    }

    fn render(&self) -> String {
        String::new()
    }
}
