use thiserror::Error;

#[derive(Debug, Error)]
pub enum IrError {
    #[error("Invalid assignment '{0}', expected NAME=VALUE")]
    InvalidAssignment(String),
    #[error("Invalid number '{value}' for '{name}'")]
    InvalidNumber { name: String, value: String },
    #[error("Unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("Timestep must be finite and non-negative, got {0}")]
    InvalidTimestep(f64),
}
