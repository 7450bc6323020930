//! Output formatting utilities

use crate::error::Result;
use console::style;
use credhub_sdk::BulkItemFailure;
use serde::Serialize;

/// Output data as JSON
pub fn json_output<T: Serialize>(data: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{json}");
    Ok(())
}

/// Print a success message with green checkmark
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message with red X
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), style(message).red());
}

/// Print an informational message with blue info icon
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Print a labelled value
pub fn print_field(label: &str, value: &str) {
    println!("{}: {}", style(label).bold(), value);
}

/// Report failed items of a bulk operation on stderr
pub fn print_failures(heading: &str, failures: &[BulkItemFailure]) -> Result<()> {
    print_error(heading);
    eprintln!("{}", serde_json::to_string_pretty(failures)?);
    Ok(())
}
