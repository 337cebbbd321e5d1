//! Shared output formatting for audit results.

use anyhow::Result;
use cloud_patrol_core::{Reporter, TerminalReporter, ViolationList};
use cloud_patrol_tree::Annotation;
use serde::Serialize;

use crate::OutputFormat;

/// Print the aggregated report in the specified format.
pub fn print_report(
    reporter: &TerminalReporter,
    format: OutputFormat,
    visited: usize,
    color: bool,
) -> Result<()> {
    match format {
        OutputFormat::Text => {
            reporter.generate_report();
            println!("{}", summary(reporter.violations(), visited, color));
        }
        OutputFormat::Json => print_json(reporter.violations())?,
    }
    Ok(())
}

#[derive(Serialize)]
struct AnnotationRecord<'a> {
    scope: &'a str,
    #[serde(flatten)]
    annotation: &'a Annotation,
}

/// Print host annotations as `<scope> [<severity>] <message>` lines.
pub fn print_annotations(annotated: &[(&str, Annotation)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for (scope, annotation) in annotated {
                println!("{scope} {annotation}");
            }
        }
        OutputFormat::Json => {
            let records: Vec<AnnotationRecord<'_>> = annotated
                .iter()
                .map(|(scope, annotation)| AnnotationRecord {
                    scope: *scope,
                    annotation,
                })
                .collect();
            print_json(&records)?;
        }
    }
    Ok(())
}

/// One-line tally of a report.
pub fn summary(list: &ViolationList, visited: usize, color: bool) -> String {
    let (errors, warnings, infos) = list.count_by_severity();
    let text = format!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {visited} resource(s)"
    );
    if !color {
        return text;
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };
    format!("{summary_color}{text}\x1b[0m")
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
