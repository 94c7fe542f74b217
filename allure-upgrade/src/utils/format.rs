//! Formatting helpers for command output

use console::style;
use humansize::{DECIMAL, format_size};

/// Format bytes as human-readable size
pub fn format_bytes(bytes: u64) -> String {
    format_size(bytes, DECIMAL)
}

/// Render a yes/no flag, green for yes
pub fn format_flag(value: bool) -> String {
    if value {
        style("yes").green().to_string()
    } else {
        style("no").yellow().to_string()
    }
}

/// Root directory as shown to users
pub fn format_root(root: &str) -> &str {
    if root.is_empty() { "<none>" } else { root }
}
