//! List policies command implementation.

use anyhow::Result;
use cloud_patrol_policies::{catalog, Preset};

use crate::OutputFormat;

/// Runs the list-policies command.
pub fn run(format: OutputFormat) -> Result<()> {
    let entries = catalog();
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Available policies:\n");
    println!(
        "{:<20} {:<22} {:<9} Description",
        "Name", "Scope", "Severity"
    );
    println!("{}", "-".repeat(90));

    for entry in &entries {
        let marker = if entry.configurable { "*" } else { "" };
        println!(
            "{:<20} {:<22} {:<9} {}",
            format!("{}{marker}", entry.name),
            entry.scope,
            entry.severity.label(),
            entry.description
        );
    }
    println!("\n* enabled by adding a [policies.<name>] section");

    println!("\nPresets:");
    for preset in Preset::ALL {
        let pack = preset.pack();
        let listed = if pack.is_empty() {
            "(none)".to_string()
        } else {
            pack.names().join(", ")
        };
        let default = if preset == Preset::default() {
            " (default)"
        } else {
            ""
        };
        println!("  {:<14} - {listed}{default}", preset.name());
    }

    println!("\nDeclare project-specific checks with [[allowed-values]], e.g.:");
    println!("  [[allowed-values]]");
    println!("  name = \"Approved Regions\"");
    println!("  kind = \"AWS::S3::Bucket\"");
    println!("  attribute = \"region\"");
    println!("  values = [\"eu-west-1\"]");
    Ok(())
}
