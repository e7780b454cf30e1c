//! Three-valued evaluation of formulas under partial assignments.

use crate::domain::entities::Model;
use crate::domain::error::DomainResult;
use crate::domain::formula::{self, Operator};

/// Evaluates `text` under `model` with Kleene semantics.
///
/// Unassigned literals are unknown (`None`); a connective is unknown only when its
/// known operands do not already decide it. The formula is validated first.
pub fn evaluate(text: &str, model: &Model) -> DomainResult<Option<bool>> {
    let normalized = formula::validate(text)?;
    Ok(evaluate_normalized(&normalized, model))
}

/// Pending step of the post-order walk in [`evaluate_normalized`].
enum Step<'a> {
    Visit(&'a str),
    Apply(Operator),
}

fn evaluate_normalized(text: &str, model: &Model) -> Option<bool> {
    let mut steps = vec![Step::Visit(text)];
    let mut values: Vec<Option<bool>> = Vec::new();

    while let Some(step) = steps.pop() {
        match step {
            Step::Visit(text) if formula::is_literal(text) => values.push(model.get(text)),
            Step::Visit(text) => {
                // validated input always splits
                let split = formula::split(text)?;
                steps.push(Step::Apply(split.operator));
                steps.push(Step::Visit(split.rhs));
                if split.operator != Operator::Not {
                    steps.push(Step::Visit(split.lhs));
                }
            }
            Step::Apply(operator) => {
                let rhs = values.pop()?;
                let lhs = match operator {
                    Operator::Not => None,
                    _ => values.pop()?,
                };
                values.push(connective(operator, lhs, rhs));
            }
        }
    }
    values.pop()?
}

fn connective(operator: Operator, lhs: Option<bool>, rhs: Option<bool>) -> Option<bool> {
    match operator {
        Operator::Not => rhs.map(|v| !v),
        Operator::And => match (lhs, rhs) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Operator::Or => match (lhs, rhs) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        Operator::Implies => match (lhs, rhs) {
            (Some(false), _) | (_, Some(true)) => Some(true),
            (Some(true), Some(false)) => Some(false),
            _ => None,
        },
        Operator::Iff => match (lhs, rhs) {
            (Some(a), Some(b)) => Some(a == b),
            _ => None,
        },
    }
}

/// True iff `model` forces `text` to evaluate to `sign`.
pub fn forces(text: &str, model: &Model, sign: bool) -> DomainResult<bool> {
    Ok(evaluate(text, model)? == Some(sign))
}
