//! Tableau solving service
//!
//! Runs the tableau engine for single formulas and for formula files, and checks
//! every extracted model against the formula before handing it out.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, DomainResultExt, IoResultExt};
use crate::domain::{eval, Model, Tableau, TableauStats, Verdict};
use crate::infrastructure::traits::FileSystem;

/// Outcome of solving one formula under one sign.
#[derive(Debug)]
pub struct Solution {
    /// Normalised formula as planted at the root.
    pub formula: String,
    pub sign: bool,
    pub verdict: Verdict,
    /// Literal assignment of the first open branch, empty when unsatisfiable.
    pub model: Model,
    pub tableau: Tableau,
    pub stats: TableauStats,
}

/// One formula line of a batch file.
#[derive(Debug)]
pub struct BatchEntry {
    /// 1-based line number in the source file.
    pub line: usize,
    pub formula: String,
    pub result: ApplicationResult<Solution>,
}

/// Solves formulas with the tableau engine.
pub struct SolverService {
    fs: Arc<dyn FileSystem>,
}

impl SolverService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Build and fully reduce the tableau of `formula` asserted under `sign`.
    ///
    /// # Errors
    /// - Syntax errors in `formula`
    /// - `UnsoundModel` if the extracted model does not force `sign`
    #[instrument(level = "debug", skip(self))]
    pub fn solve(&self, formula: &str, sign: bool) -> ApplicationResult<Solution> {
        let mut tableau = Tableau::new(sign, formula)?;
        tableau.reduce();

        let verdict = tableau.verdict()?;
        let model = tableau.model()?;
        let stats = tableau.stats();
        let normalized = tableau.formula().to_string();
        debug!("solve: {} under {} -> {} ({})", normalized, sign, verdict, stats);

        if verdict.is_satisfiable() && !eval::forces(&normalized, &model, sign)? {
            return Err(ApplicationError::UnsoundModel {
                formula: normalized,
            });
        }

        Ok(Solution {
            formula: normalized,
            sign,
            verdict,
            model,
            tableau,
            stats,
        })
    }

    /// True iff `formula` cannot be made false.
    pub fn is_tautology(&self, formula: &str) -> ApplicationResult<bool> {
        let solution = self.solve(formula, false)?;
        Ok(!solution.verdict.is_satisfiable())
    }

    /// Solve every formula listed in `path`, one per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. A bad line does not stop
    /// the others: its error is kept in the entry.
    ///
    /// # Errors
    /// Only when the file itself cannot be read.
    #[instrument(level = "debug", skip(self))]
    pub fn solve_file(&self, path: &Path, sign: bool) -> ApplicationResult<Vec<BatchEntry>> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read formula file", path)?;

        let lines: Vec<(usize, &str)> = content
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .collect();
        debug!("solve_file: {} formulas in {}", lines.len(), path.display());

        let entries: Vec<BatchEntry> = lines
            .par_iter()
            .map(|&(line, formula)| BatchEntry {
                line,
                formula: formula.to_string(),
                result: self.solve_line(line, formula, sign),
            })
            .collect();

        let failed = entries.iter().filter(|e| e.result.is_err()).count();
        if failed > 0 {
            warn!("solve_file: {} of {} lines failed", failed, entries.len());
        }
        Ok(entries)
    }

    fn solve_line(&self, line: usize, formula: &str, sign: bool) -> ApplicationResult<Solution> {
        match self.solve(formula, sign) {
            Err(ApplicationError::Domain(e)) => Err(e).at_line(line),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io;
    use std::path::PathBuf;

    use super::*;
    use crate::domain::DomainError;

    #[derive(Default)]
    struct MemoryFileSystem {
        files: HashMap<PathBuf, String>,
    }

    impl FileSystem for MemoryFileSystem {
        fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.files
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn write(&self, _path: &Path, _content: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.contains_key(path)
        }

        fn is_file(&self, path: &Path) -> bool {
            self.exists(path)
        }

        fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }
    }

    fn service_with(files: &[(&str, &str)]) -> SolverService {
        let fs = MemoryFileSystem {
            files: files
                .iter()
                .map(|(p, c)| (PathBuf::from(p), c.to_string()))
                .collect(),
        };
        SolverService::new(Arc::new(fs))
    }

    #[test]
    fn given_satisfiable_formula_when_solving_then_model_forces_sign() {
        let service = service_with(&[]);

        let solution = service.solve("(p|q)&~p", true).unwrap();

        assert_eq!(solution.verdict, Verdict::Satisfiable);
        assert_eq!(solution.model.get("p"), Some(false));
        assert_eq!(solution.model.get("q"), Some(true));
    }

    #[test]
    fn given_syntax_error_when_solving_then_domain_error_surfaces() {
        let service = service_with(&[]);

        let err = service.solve("p&", true).unwrap_err();

        assert!(matches!(err, ApplicationError::Domain(DomainError::MissingOperand { .. })));
    }

    #[test]
    fn given_excluded_middle_when_checking_tautology_then_true() {
        let service = service_with(&[]);

        assert!(service.is_tautology("p|~p").unwrap());
        assert!(!service.is_tautology("p|q").unwrap());
    }

    #[test]
    fn given_batch_with_comments_and_bad_line_when_solving_file_then_keeps_going() {
        let service = service_with(&[(
            "/f.txt",
            "# header\np&~p\n\n  p|q  \n(p\n",
        )]);

        let entries = service.solve_file(Path::new("/f.txt"), true).unwrap();

        let lines: Vec<_> = entries.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4, 5]);
        assert_eq!(
            entries[0].result.as_ref().unwrap().verdict,
            Verdict::Unsatisfiable
        );
        assert_eq!(entries[1].formula, "p|q");
        assert!(matches!(
            entries[2].result,
            Err(ApplicationError::AtLine { line: 5, .. })
        ));
    }

    #[test]
    fn given_missing_file_when_solving_file_then_fails_with_path_context() {
        let service = service_with(&[]);

        let err = service.solve_file(Path::new("/missing.txt"), true).unwrap_err();

        assert!(err.to_string().contains("/missing.txt"));
    }
}
