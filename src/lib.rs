//! rstableau: propositional satisfiability via signed semantic tableaux
//!
//! Layers, innermost first:
//! - [`domain`]: formulas, the tableau arena and expansion engine (no I/O)
//! - [`application`]: the solver service
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: argument parsing, dispatch and rendering

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
