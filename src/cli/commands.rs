//! Command dispatch and execution

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{BatchEntry, Solution};
use crate::cli::args::{Cli, Commands, ConfigCommands, DisplayArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::report;
use crate::config::{global_config_path, local_config_path, Settings, TreeStyle};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Display options after merging flags over settings.
#[derive(Debug, Clone, Copy)]
struct View {
    tree: bool,
    style: TreeStyle,
    stats: bool,
}

impl View {
    fn resolve(args: &DisplayArgs, stats: bool, settings: &Settings) -> Self {
        Self {
            tree: args.tree || settings.show_tree,
            style: args.style.unwrap_or(settings.tree_style),
            stats: stats || settings.show_stats,
        }
    }
}

/// Directory used for the local config layer.
pub fn local_dir(cli: &Cli) -> PathBuf {
    cli.dir.clone().unwrap_or_else(|| PathBuf::from("."))
}

/// Execute the parsed command.
pub fn execute_command(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Solve {
            formula,
            file,
            sign,
            display,
            stats,
            check,
        }) => {
            let sign = sign.unwrap_or(container.settings.sign);
            let view = View::resolve(display, *stats, &container.settings);
            match (formula, file) {
                (Some(formula), _) => cmd_solve(container, formula, sign, view, *check),
                (None, Some(file)) => cmd_solve_file(container, file, sign, view, *check),
                (None, None) => Err(CliError::Usage(
                    "provide a FORMULA or --file".to_string(),
                )),
            }
        }
        Some(Commands::Tautology { formula, display }) => {
            let view = View::resolve(display, false, &container.settings);
            cmd_tautology(container, formula, view)
        }
        Some(Commands::Tree {
            formula,
            sign,
            style,
        }) => cmd_tree(
            container,
            formula,
            sign.unwrap_or(container.settings.sign),
            style.unwrap_or(container.settings.tree_style),
        ),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(container),
            ConfigCommands::Path => cmd_config_path(&local_dir(cli)),
            ConfigCommands::Init { global } => cmd_config_init(container, &local_dir(cli), *global),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_solve(
    container: &ServiceContainer,
    formula: &str,
    sign: bool,
    view: View,
    check: bool,
) -> CliResult<()> {
    let solution = container.solver.solve(formula, sign)?;
    print_solution(&solution, view);

    if check && !solution.verdict.is_satisfiable() {
        return Err(CliError::Unsatisfiable {
            failed: 1,
            total: 1,
        });
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_solve_file(
    container: &ServiceContainer,
    path: &Path,
    sign: bool,
    view: View,
    check: bool,
) -> CliResult<()> {
    if !container.fs.is_file(path) {
        return Err(InfraError::NotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let entries = container.solver.solve_file(path, sign)?;
    let total = entries.len();
    debug!("cmd_solve_file: {} entries", total);

    let mut unsatisfiable = 0;
    let mut first_error = None;
    for BatchEntry {
        line,
        formula,
        result,
    } in entries
    {
        match result {
            Ok(solution) => {
                output::header(&format!("line {line}"));
                print_solution(&solution, view);
                if !solution.verdict.is_satisfiable() {
                    unsatisfiable += 1;
                }
            }
            Err(e) => {
                output::error(&format!("{e} ({formula})"));
                first_error.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_error {
        return Err(e.into());
    }
    if check && unsatisfiable > 0 {
        return Err(CliError::Unsatisfiable {
            failed: unsatisfiable,
            total,
        });
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_tautology(container: &ServiceContainer, formula: &str, view: View) -> CliResult<()> {
    let solution = container.solver.solve(formula, false)?;

    if solution.verdict.is_satisfiable() {
        output::warning(&format!("{} is not a tautology", solution.formula));
        output::action("counter-model", &report::render_model(&solution.model));
    } else {
        output::action("TAUTOLOGY", &solution.formula);
    }
    print_details(&solution, view);
    Ok(())
}

fn cmd_tree(
    container: &ServiceContainer,
    formula: &str,
    sign: bool,
    style: TreeStyle,
) -> CliResult<()> {
    let solution = container.solver.solve(formula, sign)?;
    print_tableau(&solution, style);
    Ok(())
}

fn cmd_config_show(container: &ServiceContainer) -> CliResult<()> {
    output::info(&container.settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(dir: &Path) -> CliResult<()> {
    match global_config_path() {
        Some(path) => print_config_location("global", &path),
        None => output::detail("global: (no config directory)"),
    }
    print_config_location("local", &local_config_path(dir));
    Ok(())
}

fn print_config_location(label: &str, path: &Path) {
    let state = if path.exists() { "" } else { " (not present)" };
    output::detail(&format!("{label}: {}{state}", path.display()));
}

fn cmd_config_init(container: &ServiceContainer, dir: &Path, global: bool) -> CliResult<()> {
    let path = if global {
        global_config_path().ok_or_else(|| {
            CliError::Usage("cannot determine global config directory".to_string())
        })?
    } else {
        local_config_path(dir)
    };

    if container.fs.exists(&path) {
        return Err(CliError::Usage(format!(
            "config already exists: {}",
            path.display()
        )));
    }
    container
        .fs
        .ensure_parent(&path)
        .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
    container
        .fs
        .write(&path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;

    output::action("Created", &path.display());
    Ok(())
}

fn print_solution(solution: &Solution, view: View) {
    output::verdict_line(&solution.formula, solution.sign, solution.verdict);
    if solution.verdict.is_satisfiable() {
        output::detail(&format!("model: {}", report::render_model(&solution.model)));
    }
    print_details(solution, view);
}

fn print_details(solution: &Solution, view: View) {
    if view.stats {
        output::detail(&solution.stats);
    }
    if view.tree {
        print_tableau(solution, view.style);
    }
}

fn print_tableau(solution: &Solution, style: TreeStyle) {
    match style {
        TreeStyle::Levels => output::info(&report::render_levels(&solution.tableau)),
        TreeStyle::Tree => output::info(&report::render_tree(&solution.tableau)),
    }
}
