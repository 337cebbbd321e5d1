//! Subcommand implementations.

pub mod check;
pub mod list_policies;
pub mod output;
