//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: info bullets, paths, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info

use console::style;
use std::fmt::Display;

use crate::core::bootstrap::Reporter;
use crate::core::checkpoint::Step;

const RULE_WIDTH: usize = 56;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ created resource group aro-rg in eastus`
pub fn success(msg: &str) {
    if colors_enabled() {
        println!("  {} {}", style("✓").green(), msg);
    } else {
        println!("  ✓ {}", msg);
    }
}

/// Print an error message to stderr (red).
///
/// Example: `✗ not logged in to Azure`
pub fn error(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Print a warning message (yellow).
///
/// Example: `⚠ resource group aro-rg already exists, reusing it`
pub fn warn(msg: &str) {
    if colors_enabled() {
        println!("  {} {}", style("⚠").yellow(), style(msg).yellow());
    } else {
        println!("  ⚠ {}", msg);
    }
}

/// Print an informational line (cyan bullet).
pub fn info(msg: &str) {
    if colors_enabled() {
        println!("  {} {}", style("•").cyan(), msg);
    } else {
        println!("  • {}", msg);
    }
}

/// Print a hint message to stderr (cyan).
///
/// Example: `→ run: az login`
pub fn hint(msg: &str) {
    if colors_enabled() {
        eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
    } else {
        eprintln!("→ {}", msg);
    }
}

/// Print a bold section header.
pub fn header(title: &str) {
    if colors_enabled() {
        println!("{}", style(title).bold());
    } else {
        println!("{}", title);
    }
}

/// Print a numbered step heading.
///
/// Example: `[4/9] ensure resource group`
pub fn step(index: usize, total: usize, label: &str) {
    let counter = format!("[{}/{}]", index, total);
    if colors_enabled() {
        println!("{} {}", style(counter).dim(), style(label).bold());
    } else {
        println!("{} {}", counter, label);
    }
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  location  canadacentral`
pub fn kv(label: &str, value: impl Display) {
    if colors_enabled() {
        println!("  {:<16}{}", style(label).dim(), style(value).bold());
    } else {
        println!("  {:<16}{}", label, value);
    }
}

/// Print a horizontal rule separator.
pub fn rule() {
    if colors_enabled() {
        println!("{}", style("─".repeat(RULE_WIDTH)).dim());
    } else {
        println!("{}", "─".repeat(RULE_WIDTH));
    }
}

/// Print a blank line.
pub fn blank() {
    println!();
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}

/// Format a path string in cyan.
pub fn path(p: impl Display) -> String {
    if colors_enabled() {
        style(p).cyan().to_string()
    } else {
        p.to_string()
    }
}

/// Terminal [`Reporter`] for bootstrap runs.
#[derive(Debug, Default)]
pub struct Console;

impl Reporter for Console {
    fn step(&mut self, step: Step) {
        let index = Step::ALL.iter().position(|s| *s == step).unwrap_or(0) + 1;
        step_line(index, step);
    }

    fn info(&mut self, msg: &str) {
        info(msg);
    }

    fn success(&mut self, msg: &str) {
        success(msg);
    }

    fn warn(&mut self, msg: &str) {
        warn(msg);
    }
}

fn step_line(index: usize, s: Step) {
    step(index, Step::ALL.len(), s.label());
}
