//! Check command implementation.

use anyhow::{anyhow, Context, Result};
use cloud_patrol_core::{
    Config, Patrol, PolicyContext, PolicyError, PolicyPack, Reporter, ReporterMode,
    TerminalReporter,
};
use cloud_patrol_policies::build_pack;
use cloud_patrol_tree::ResourceTree;
use std::path::Path;

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Options for a check run.
#[derive(Debug, Clone, Copy)]
pub struct CheckOptions {
    /// Output format.
    pub format: OutputFormat,
    /// Annotate nodes instead of printing the grouped report.
    pub host: bool,
    /// Use ANSI colors in text output.
    pub color: bool,
}

/// Runs the check command, returning whether violations were found.
pub fn run(tree_path: &Path, explicit_config: Option<&Path>, options: &CheckOptions) -> Result<bool> {
    let project_dir = tree_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let source = config_resolver::resolve(project_dir, explicit_config);
    let (config, raw) = load_config(&source)?;

    let pack = build_pack(&config, &raw).context("Failed to assemble policy pack")?;
    let tree = ResourceTree::from_file(tree_path)
        .with_context(|| format!("Failed to load resource tree: {}", tree_path.display()))?;

    tracing::info!(
        "Auditing {} resources in {} with {} policies",
        tree.len(),
        tree_path.display(),
        pack.len()
    );

    if options.host {
        run_host(&pack, config.context, &tree, options.format)
    } else {
        run_terminal(&pack, config.context, &tree, options)
    }
}

fn load_config(source: &ConfigSource) -> Result<(Config, String)> {
    let Some(path) = source.path() else {
        return Ok((Config::default(), String::new()));
    };
    if source.is_global() {
        tracing::info!("Using global config: {}", path.display());
    }
    Config::load(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

fn run_terminal(
    pack: &PolicyPack,
    context: PolicyContext,
    tree: &ResourceTree,
    options: &CheckOptions,
) -> Result<bool> {
    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let root = std::fs::canonicalize(&cwd).unwrap_or(cwd);
    let mut reporter = TerminalReporter::new()
        .with_trace_root(root)
        .with_color(options.color);

    let visited = {
        let mut patrol = Patrol::with_reporter(pack, context, Box::new(&mut reporter));
        patrol.run(tree).map_err(aborted)?;
        patrol.visited()
    };

    super::output::print_report(&reporter, options.format, visited, options.color)?;
    Ok(reporter.has_violations())
}

fn run_host(
    pack: &PolicyPack,
    context: PolicyContext,
    tree: &ResourceTree,
    format: OutputFormat,
) -> Result<bool> {
    let mut patrol = Patrol::new(pack, context, ReporterMode::Host);
    let flagged = patrol.check(tree).map_err(aborted)?;
    super::output::print_annotations(&tree.annotated(), format)?;
    Ok(flagged)
}

fn aborted(err: PolicyError) -> anyhow::Error {
    eprintln!("{:?}", miette::Report::new(err));
    anyhow!("Policy evaluation aborted")
}
