//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;

/// A subformula paired with the truth value asserted for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedFormula {
    pub sign: bool,
    pub text: String,
}

impl SignedFormula {
    pub fn new(sign: bool, text: impl Into<String>) -> Self {
        Self {
            sign,
            text: text.into(),
        }
    }
}

impl fmt::Display for SignedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", if self.sign { 'T' } else { 'F' }, self.text)
    }
}

/// Partial assignment of truth values to literals.
///
/// Ordered by literal name; the order literals were discovered in carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model(BTreeMap<String, bool>);

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value; the first value seen for a literal is kept.
    pub fn assign(&mut self, literal: impl Into<String>, value: bool) {
        self.0.entry(literal.into()).or_insert(value);
    }

    pub fn get(&self, literal: &str) -> Option<bool> {
        self.0.get(literal).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, bool)> for Model {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        let mut model = Model::new();
        for (literal, value) in iter {
            model.assign(literal, value);
        }
        model
    }
}

/// `p = true  q = false`
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.iter()
                .map(|(literal, value)| format!("{} = {}", literal, value))
                .join("  ")
        )
    }
}

/// Outcome of a finished tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
}

impl Verdict {
    pub fn is_satisfiable(self) -> bool {
        matches!(self, Self::Satisfiable)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "SATISFIABLE"),
            Self::Unsatisfiable => write!(f, "UNSATISFIABLE"),
        }
    }
}

/// Shape of a finished tableau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableauStats {
    pub nodes: usize,
    pub open_branches: usize,
    pub closed_branches: usize,
    pub depth: usize,
}

impl fmt::Display for TableauStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes: {}, depth: {}, open branches: {}, closed branches: {}",
            self.nodes, self.depth, self.open_branches, self.closed_branches
        )
    }
}
