//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),

    #[error("{failed} of {total} formulas unsatisfiable")]
    Unsatisfiable { failed: usize, total: usize },
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        Self::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Unsatisfiable { .. } => exitcode::UNSATISFIABLE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::NotFound { .. } => exitcode::NOINPUT,
                InfraError::Application(app) => match app {
                    ApplicationError::Domain(_) | ApplicationError::AtLine { .. } => {
                        exitcode::DATAERR
                    }
                    ApplicationError::Config { .. } => exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => exitcode::IOERR,
                    ApplicationError::UnsoundModel { .. } => exitcode::SOFTWARE,
                },
            },
        }
    }
}
