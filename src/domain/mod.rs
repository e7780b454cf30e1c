//! Domain layer: formulas, the tableau tree and its expansion engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod eval;
pub mod formula;
pub mod rules;
pub mod tableau;

pub use arena::{Node, NodeId, Side, TableauArena};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use formula::{Connective, Operator};
pub use rules::Extension;
pub use tableau::Tableau;
