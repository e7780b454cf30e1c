//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::Verdict;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Verdict word, green when satisfiable and red otherwise.
pub fn verdict(verdict: Verdict) -> String {
    let word = verdict.to_string();
    if verdict.is_satisfiable() {
        word.green().bold().to_string()
    } else {
        word.red().bold().to_string()
    }
}

/// Print `<formula>: <verdict>` with a dimmed sign marker.
pub fn verdict_line(formula: &str, sign: bool, v: Verdict) {
    let marker = if sign { "T" } else { "F" };
    println!("{}({}): {}", marker.dimmed(), formula, verdict(v));
}
