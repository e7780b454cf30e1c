//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::config::TreeStyle;

/// Propositional satisfiability via signed semantic tableaux (truth trees)
///
/// Connectives: ~ or ! (not), & (and), | (or), > (implies), = (iff).
#[derive(Parser, Debug)]
#[command(name = "rstableau")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding the local .rstableau.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decide satisfiability of formulas
    Solve {
        /// Formula to solve
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        formula: Option<String>,

        /// File with one formula per line (# starts a comment)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,

        /// Sign asserted at the root
        #[arg(long)]
        sign: Option<bool>,

        #[command(flatten)]
        display: DisplayArgs,

        /// Print node and branch counts
        #[arg(long)]
        stats: bool,

        /// Exit with status 1 if any formula is unsatisfiable
        #[arg(long)]
        check: bool,
    },

    /// Check whether a formula is true under every assignment
    Tautology {
        /// Formula to check
        formula: String,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Print the finished tableau of a formula
    Tree {
        /// Formula to expand
        formula: String,

        /// Sign asserted at the root
        #[arg(long)]
        sign: Option<bool>,

        /// Tableau layout
        #[arg(long, value_enum)]
        style: Option<TreeStyle>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Tableau display flags shared by `solve` and `tautology`.
#[derive(Args, Debug, Default, Clone)]
pub struct DisplayArgs {
    /// Print the tableau after the verdict
    #[arg(long)]
    pub tree: bool,

    /// Tableau layout
    #[arg(long, value_enum)]
    pub style: Option<TreeStyle>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Write a template config file
    Init {
        /// Write the global config instead of the local one
        #[arg(long)]
        global: bool,
    },
}
