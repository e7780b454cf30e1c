//! Error conversion helpers
//!
//! Extension traits attaching path or line context to lower-level errors.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::DomainResult;

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// self.fs.read_to_string(path)
    ///     .with_path_context("read formula file", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait tagging domain errors with the input line they came from.
pub trait DomainResultExt<T> {
    fn at_line(self, line: usize) -> ApplicationResult<T>;
}

impl<T> DomainResultExt<T> for DomainResult<T> {
    fn at_line(self, line: usize) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::AtLine { line, source })
    }
}
