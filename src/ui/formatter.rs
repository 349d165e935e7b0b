//! Pure formatting functions for UI output.
//!
//! User-facing lines go to stdout, errors and warnings to stderr. Colors are
//! dropped automatically when the stream is not a terminal.

use crate::boundary::BoundaryWarning;
use crate::domain::Version;
use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Display the dry-run preview, one line per planned action.
pub fn display_dry_run(preview: &str) {
    println!("{}", style("Dry run, no changes made:").bold());
    for line in preview.lines() {
        println!("  {}", line);
    }
}

/// Display version tags, newest first, marking the latest.
pub fn display_versions(versions: &[Version]) {
    for (i, version) in versions.iter().enumerate() {
        if i == 0 {
            println!("{} {}", style(version.source_tag()).green(), style("(latest)").dim());
        } else {
            println!("{}", version.source_tag());
        }
    }
}

/// Render the stored push preference for `git-bump config`.
pub fn format_push_preference(preference: Option<bool>) -> String {
    match preference {
        Some(value) => format!("Default push for this repo: {}", value),
        None => "Default push for this repo: not set".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_error() {
        // Visual verification test - output is printed to stderr
        display_error("test error");
    }

    #[test]
    fn test_display_success() {
        // Visual verification test - output is printed to stdout
        display_success("test success");
    }

    #[test]
    fn test_format_push_preference() {
        assert_eq!(format_push_preference(Some(true)), "Default push for this repo: true");
        assert_eq!(format_push_preference(None), "Default push for this repo: not set");
    }
}
