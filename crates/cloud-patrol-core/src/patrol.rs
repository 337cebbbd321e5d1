//! Driver adapter binding a policy pack to an external traversal.

use crate::context::PolicyContext;
use crate::node::Node;
use crate::pack::PolicyPack;
use crate::policy::PolicyError;
use crate::reporter::{HostReporter, Reporter, TerminalReporter};

use tracing::{debug, info};

/// Callback invoked by a traversal once per node.
pub trait NodeVisitor {
    /// Visits a single node.
    ///
    /// # Errors
    ///
    /// Returns an error to abort the traversal.
    fn visit(&mut self, node: &dyn Node) -> Result<(), PolicyError>;
}

/// A tree that can be walked, visiting each node once.
///
/// The visiting order belongs to the implementation; depth-first pre-order
/// is typical.
pub trait Traversal {
    /// Walks the tree, stopping at the first visitor error.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by `visitor`.
    fn walk(&self, visitor: &mut dyn NodeVisitor) -> Result<(), PolicyError>;
}

/// Which reporter strategy a [`Patrol`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReporterMode {
    /// Aggregate and print a grouped report.
    #[default]
    Terminal,
    /// Annotate nodes in place for a host environment to present.
    Host,
}

/// Binds a [`PolicyPack`] to a traversal and collects the outcome.
pub struct Patrol<'p> {
    pack: &'p PolicyPack,
    context: PolicyContext,
    reporter: Box<dyn Reporter + 'p>,
    visited: usize,
}

impl<'p> Patrol<'p> {
    /// Creates a patrol with the reporter strategy for `mode`.
    ///
    /// The terminal reporter keeps every trace line; pass a configured
    /// [`TerminalReporter`] to [`Patrol::with_reporter`] to filter them.
    #[must_use]
    pub fn new(pack: &'p PolicyPack, context: PolicyContext, mode: ReporterMode) -> Self {
        let reporter: Box<dyn Reporter> = match mode {
            ReporterMode::Terminal => Box::new(TerminalReporter::new()),
            ReporterMode::Host => Box::new(HostReporter::new()),
        };
        Self::with_reporter(pack, context, reporter)
    }

    /// Creates a patrol with a caller-supplied reporter.
    #[must_use]
    pub fn with_reporter(
        pack: &'p PolicyPack,
        context: PolicyContext,
        reporter: Box<dyn Reporter + 'p>,
    ) -> Self {
        Self {
            pack,
            context,
            reporter,
            visited: 0,
        }
    }

    /// Walks `tree`, prints the report, and returns whether any violation
    /// was recorded.
    ///
    /// # Errors
    ///
    /// Returns the first policy error; the report is not printed then.
    pub fn check(&mut self, tree: &dyn Traversal) -> Result<bool, PolicyError> {
        self.run(tree)?;
        self.reporter.generate_report();
        Ok(self.reporter.has_violations())
    }

    /// Walks `tree` without printing anything.
    ///
    /// # Errors
    ///
    /// Returns the first policy error.
    pub fn run(&mut self, tree: &dyn Traversal) -> Result<(), PolicyError> {
        info!("Starting patrol with {} policies", self.pack.len());
        tree.walk(self)?;
        info!(
            "Patrol complete: {} nodes visited, violations: {}",
            self.visited,
            self.reporter.has_violations()
        );
        Ok(())
    }

    /// Returns the reporter.
    #[must_use]
    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Returns the number of nodes visited so far.
    #[must_use]
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Consumes the patrol, returning its reporter.
    #[must_use]
    pub fn finish(self) -> Box<dyn Reporter + 'p> {
        self.reporter
    }
}

impl NodeVisitor for Patrol<'_> {
    fn visit(&mut self, node: &dyn Node) -> Result<(), PolicyError> {
        debug!("Visiting {} ({})", node.scope(), node.kind());
        self.visited += 1;
        self.pack.validate(node, &self.context, self.reporter.as_mut())
    }
}
