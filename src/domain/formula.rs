//! Lexical helpers for propositional formulas.
//!
//! Formulas are plain strings over single-character connectives:
//!
//! | char        | connective  | precedence |
//! |-------------|-------------|------------|
//! | `~` or `!`  | negation    | 4          |
//! | `&`         | conjunction | 3          |
//! | `\|`        | disjunction | 2          |
//! | `>`         | implication | 1          |
//! | `=`         | equivalence | 0          |
//!
//! Implication associates to the right, every other binary connective to the left.
//! Literals match `[A-Za-z][A-Za-z0-9_]*`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{instrument, trace};

use crate::domain::error::{DomainError, DomainResult};

static LITERAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("literal pattern"));

/// Classification of a single formula character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    Not,
    And,
    Or,
    Implies,
    Iff,
    ParenOpen,
    ParenClose,
    Unknown,
}

impl Connective {
    pub fn from_char(ch: char) -> Self {
        match ch {
            '~' | '!' => Self::Not,
            '&' => Self::And,
            '|' => Self::Or,
            '>' => Self::Implies,
            '=' => Self::Iff,
            '(' => Self::ParenOpen,
            ')' => Self::ParenClose,
            _ => Self::Unknown,
        }
    }

    /// Binding strength; higher binds tighter. Parentheses and unknown characters have none.
    pub fn precedence(self) -> Option<u8> {
        match self {
            Self::Not => Some(4),
            Self::And => Some(3),
            Self::Or => Some(2),
            Self::Implies => Some(1),
            Self::Iff => Some(0),
            Self::ParenOpen | Self::ParenClose | Self::Unknown => None,
        }
    }

    pub fn operator(self) -> Option<Operator> {
        match self {
            Self::Not => Some(Operator::Not),
            Self::And => Some(Operator::And),
            Self::Or => Some(Operator::Or),
            Self::Implies => Some(Operator::Implies),
            Self::Iff => Some(Operator::Iff),
            Self::ParenOpen | Self::ParenClose | Self::Unknown => None,
        }
    }

    fn is_binary(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Implies | Self::Iff)
    }

    fn is_right_associative(self) -> bool {
        matches!(self, Self::Implies)
    }
}

/// Logical operator a non-atomic formula decomposes by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Not,
    And,
    Or,
    Implies,
    Iff,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Not => "NOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Implies => "IMPLIES",
            Self::Iff => "IFF",
        };
        write!(f, "{}", name)
    }
}

/// A formula split at its main connective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub operator: Operator,
    /// Byte index of the main connective
    pub index: usize,
    /// Left operand, outer parentheses stripped (empty for negation)
    pub lhs: &'a str,
    /// Right operand, outer parentheses stripped
    pub rhs: &'a str,
}

/// Removes all whitespace in place.
pub fn remove_whitespace(formula: &mut String) {
    formula.retain(|c| !c.is_whitespace());
}

/// True iff `formula` is a bare propositional letter.
pub fn is_literal(formula: &str) -> bool {
    LITERAL_REGEX.is_match(formula)
}

/// Index of the matching close parenthesis for the open parenthesis at `open`.
fn matching_paren(formula: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in formula.bytes().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips every pair of parentheses that encloses the whole formula.
///
/// `((p&q))` becomes `p&q`; `(p)&(q)` is returned unchanged.
pub fn strip_outer_parens(formula: &str) -> &str {
    let mut current = formula;
    while current.len() >= 2
        && current.starts_with('(')
        && matching_paren(current, 0) == Some(current.len() - 1)
    {
        current = &current[1..current.len() - 1];
    }
    current
}

/// Index of the main connective: the lowest-precedence binary connective outside
/// parentheses, or a leading negation when there is none.
///
/// Returns `None` for literals, unbalanced input, or input without a connective.
pub fn split_index(formula: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut best: Option<(usize, u8)> = None;

    for (i, ch) in formula.char_indices() {
        let connective = Connective::from_char(ch);
        match connective {
            Connective::ParenOpen => depth += 1,
            Connective::ParenClose => depth = depth.checked_sub(1)?,
            c if depth == 0 && c.is_binary() => {
                let precedence = c.precedence()?;
                best = match best {
                    None => Some((i, precedence)),
                    Some((_, current)) if precedence < current => Some((i, precedence)),
                    // equal precedence means the same connective: rightmost wins unless right-associative
                    Some((_, current)) if precedence == current && !c.is_right_associative() => {
                        Some((i, precedence))
                    }
                    keep => keep,
                };
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    best.map(|(i, _)| i).or_else(|| {
        formula
            .chars()
            .next()
            .filter(|&c| Connective::from_char(c) == Connective::Not)
            .map(|_| 0)
    })
}

/// Splits a balanced formula at its main connective.
#[instrument(level = "trace")]
pub fn split(formula: &str) -> Option<Split<'_>> {
    let index = split_index(formula)?;
    let ch = formula[index..].chars().next()?;
    let operator = Connective::from_char(ch).operator()?;
    let lhs = strip_outer_parens(&formula[..index]);
    let rhs = strip_outer_parens(&formula[index + ch.len_utf8()..]);
    trace!("split {} at {}: lhs={:?} rhs={:?}", formula, index, lhs, rhs);
    Some(Split {
        operator,
        index,
        lhs,
        rhs,
    })
}

/// Validates raw input and returns the normalised formula the engine works on.
///
/// Normalisation removes whitespace and redundant enclosing parentheses. Every
/// subformula is checked to have a main connective with non-empty operands, so the
/// engine only ever sees strictly shortening splits.
#[instrument(level = "debug")]
pub fn validate(raw: &str) -> DomainResult<String> {
    let mut formula = raw.to_string();
    remove_whitespace(&mut formula);
    if formula.is_empty() {
        return Err(DomainError::EmptyFormula);
    }

    check_characters(&formula)?;
    check_balance(&formula)?;

    let normalized = strip_outer_parens(&formula);
    if normalized.is_empty() {
        return Err(DomainError::MissingOperand { position: 0 });
    }
    check_subformula(normalized, stripped_offset(&formula, normalized))?;

    Ok(normalized.to_string())
}

fn check_characters(formula: &str) -> DomainResult<()> {
    for (position, ch) in formula.char_indices() {
        let known = Connective::from_char(ch) != Connective::Unknown;
        if !known && !(ch.is_ascii_alphanumeric() || ch == '_') {
            return Err(DomainError::UnexpectedCharacter { ch, position });
        }
    }
    Ok(())
}

fn check_balance(formula: &str) -> DomainResult<()> {
    let mut open = Vec::new();
    for (position, ch) in formula.char_indices() {
        match Connective::from_char(ch) {
            Connective::ParenOpen => open.push(position),
            Connective::ParenClose => {
                if open.pop().is_none() {
                    return Err(DomainError::UnbalancedParenthesis { position });
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(position) => Err(DomainError::UnbalancedParenthesis { position }),
        None => Ok(()),
    }
}

/// Offset of `inner` inside `outer` after symmetric parenthesis stripping.
fn stripped_offset(outer: &str, inner: &str) -> usize {
    (outer.len() - inner.len()) / 2
}

/// Checks every subformula of `formula`, left operand before right.
///
/// Walks with an explicit stack so nesting depth is bounded by memory, not by the
/// thread's call stack.
fn check_subformula(formula: &str, offset: usize) -> DomainResult<()> {
    let mut pending = vec![(formula, offset)];
    while let Some((formula, offset)) = pending.pop() {
        if is_literal(formula) {
            continue;
        }
        let Some(split) = split(formula) else {
            return Err(stray_token(formula, offset));
        };

        let position = offset + split.index;
        let lhs_raw = &formula[..split.index];
        let rhs_raw = &formula[split.index + 1..];
        if split.rhs.is_empty() {
            return Err(DomainError::MissingOperand { position });
        }
        if split.operator != Operator::Not && split.lhs.is_empty() {
            return Err(DomainError::MissingOperand { position });
        }

        pending.push((split.rhs, position + 1 + stripped_offset(rhs_raw, split.rhs)));
        if split.operator != Operator::Not {
            pending.push((split.lhs, offset + stripped_offset(lhs_raw, split.lhs)));
        }
    }
    Ok(())
}

/// Locates the first token that cannot follow what precedes it, for a formula
/// without a main connective.
fn stray_token(formula: &str, offset: usize) -> DomainError {
    let mut depth = 0usize;
    let mut after_group = false;
    for (i, ch) in formula.char_indices() {
        let position = offset + i;
        match Connective::from_char(ch) {
            Connective::ParenOpen => {
                depth += 1;
                if depth == 1 && i > 0 {
                    return DomainError::UnexpectedCharacter { ch, position };
                }
            }
            Connective::ParenClose => {
                depth = depth.saturating_sub(1);
                after_group = depth == 0;
                continue;
            }
            Connective::Not if depth == 0 && i > 0 => {
                return DomainError::UnexpectedOperand { position };
            }
            _ if depth == 0 && after_group => {
                return DomainError::UnexpectedCharacter { ch, position };
            }
            _ => {}
        }
        after_group = false;
    }
    match formula.chars().next() {
        Some(ch) => DomainError::UnexpectedCharacter {
            ch,
            position: offset,
        },
        None => DomainError::EmptyFormula,
    }
}
