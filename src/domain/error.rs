//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed formulas and engine contract violations.
/// Positions are byte offsets into the whitespace-free formula.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("empty formula")]
    EmptyFormula,

    #[error("unbalanced parenthesis at position {position}")]
    UnbalancedParenthesis { position: usize },

    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("missing operand for connective at position {position}")]
    MissingOperand { position: usize },

    #[error("negation at position {position} cannot take a left operand")]
    UnexpectedOperand { position: usize },

    #[error("tableau is not finished, call reduce() first")]
    Unfinished,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
