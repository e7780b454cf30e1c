//! Tableau expansion rules, one per connective and sign.
//!
//! Each rule satisfies: an assignment satisfies the signed formula iff it satisfies
//! every member of at least one alternative.

use crate::domain::entities::SignedFormula;
use crate::domain::formula::{Operator, Split};

/// New structure attached below an open leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
    /// Linear extension, each entry below the previous one: all must hold.
    Chain(Vec<SignedFormula>),
    /// Two arms side by side, each a chain: at least one must hold.
    Branch(Vec<SignedFormula>, Vec<SignedFormula>),
}

/// Extension for `split` asserted under `sign`.
pub fn extension(split: &Split<'_>, sign: bool) -> Extension {
    let lhs = |s: bool| SignedFormula::new(s, split.lhs);
    let rhs = |s: bool| SignedFormula::new(s, split.rhs);

    match (split.operator, sign) {
        (Operator::Not, s) => Extension::Chain(vec![rhs(!s)]),
        (Operator::And, true) => Extension::Chain(vec![lhs(true), rhs(true)]),
        (Operator::And, false) => Extension::Branch(vec![lhs(false)], vec![rhs(false)]),
        (Operator::Or, true) => Extension::Branch(vec![lhs(true)], vec![rhs(true)]),
        (Operator::Or, false) => Extension::Chain(vec![lhs(false), rhs(false)]),
        (Operator::Implies, true) => Extension::Branch(vec![lhs(false)], vec![rhs(true)]),
        (Operator::Implies, false) => Extension::Chain(vec![lhs(true), rhs(false)]),
        (Operator::Iff, true) => Extension::Branch(
            vec![lhs(false), rhs(false)],
            vec![lhs(true), rhs(true)],
        ),
        (Operator::Iff, false) => Extension::Branch(
            vec![lhs(false), rhs(true)],
            vec![lhs(true), rhs(false)],
        ),
    }
}
