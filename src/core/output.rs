//! Colored output for wordlistctl
//!
//! Uses owo-colors for terminal colors. Progress bars live in
//! `helpers::internal::progress`.

use crate::catalog::CatalogEntry;
use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Fetching rockyou"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print an action with an entry counter
/// Example: "(1/5) Fetching rockyou"
pub fn action_numbered(current: usize, total: usize, message: &str) {
    println!(
        "{} {}",
        format!("({}/{})", current, total).cyan(),
        message.bold()
    );
}

/// Print a detail line (dimmed)
/// Example: "     downloaded rockyou.txt.tar.gz (1024 bytes)"
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Print a hint following an error (dimmed, stderr)
pub fn hint(message: &str) {
    eprintln!("  {} {}", "hint:".dimmed(), message.dimmed());
}

/// Format a catalog entry as `name (size) [updated]`
pub fn format_entry(entry: &CatalogEntry) -> String {
    format!("{} ({}) [{}]", entry.name, entry.size, entry.updated)
}

/// Print a catalog entry in list/search output
pub fn entry_line(entry: &CatalogEntry) {
    println!("  {}", format_entry(entry));
}
