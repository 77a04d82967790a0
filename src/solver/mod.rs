//! Symbolic solving of the synthesized system.
//!
//! The `Solver` trait is the seam between synthesis and solving; `GaussJordan`
//! is the implementation shipped with the crate.

pub mod gauss_jordan;
pub mod linear;

use thiserror::Error;

use crate::ir::ast::{Equation, Symbol};

pub use gauss_jordan::GaussJordan;
pub use linear::{linear_system, LinearSystem};

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Equation {index} is not linear in the unknowns: {equation}")]
    NonLinear { index: usize, equation: String },
    #[error("System is singular: no equation determines '{unknown}'")]
    Singular { unknown: String },
    #[error("System is inconsistent: equation {index} reduces to {residual} == 0.0")]
    Inconsistent { index: usize, residual: String },
}

/// Resolves each unknown to a closed form in the remaining symbols.
pub trait Solver {
    /// Returns one `unknown == expression` per unknown, in unknown order.
    fn solve(
        &self,
        equations: &[Equation],
        unknowns: &[Symbol],
    ) -> Result<Vec<Equation>, SolverError>;
}
