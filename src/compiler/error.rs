use thiserror::Error;

use crate::solver::SolverError;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("Solver returned no closed form for '{unknown}'")]
    MissingSolution { unknown: String },
}
