pub mod discretize;
pub mod simplify;
pub mod substitute;
