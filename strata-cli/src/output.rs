//! Terminal output for the CLI.
//!
//! Reports and scripts go to stdout. Failures go to stderr, so a run that
//! fails after printing its scripts leaves them readable on stdout.

use owo_colors::OwoColorize;
use strata_migrate::Operation;

/// Width of the label column in [`field`] lines.
const LABEL_WIDTH: usize = 10;

/// Print a report title, underlined.
pub fn title(text: &str) {
    println!();
    println!("{}", text.bold().cyan());
    println!("{}", "=".repeat(text.chars().count()).dimmed());
}

/// Print a sub-heading.
pub fn section(text: &str) {
    println!("{}", text.bold());
}

/// Print an aligned `label  value` line.
pub fn field(label: &str, value: &str) {
    println!("  {:<width$} {}", label.dimmed(), value, width = LABEL_WIDTH);
}

/// Print a completed step.
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print a neutral remark.
pub fn note(text: &str) {
    println!("{} {}", "ℹ".blue().bold(), text);
}

/// Print something the user should look at.
pub fn caution(text: &str) {
    println!("{} {}", "⚠".yellow().bold(), text.yellow());
}

/// Print a failure to stderr.
pub fn failure(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print an indented bullet.
pub fn bullet(text: &str) {
    println!("  {} {}", "-".dimmed(), text);
}

/// Print one planned operation. Destructive ones are flagged.
pub fn operation(op: &Operation) {
    let line = op.describe();
    if op.is_destructive() {
        println!("  {} {} {}", "-".red(), line.red(), "(destructive)".red().bold());
    } else {
        println!("  {} {}", "+".green(), line);
    }
}

/// Print an empty line.
pub fn blank() {
    println!();
}

/// Print a script under its banner. SQL comments are dimmed.
pub fn script(banner: &str, body: &str) {
    println!("{}", banner.bold());
    for line in body.lines() {
        if line.starts_with("--") {
            println!("{}", line.dimmed());
        } else {
            println!("{line}");
        }
    }
}
