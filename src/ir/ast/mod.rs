//! Data model shared by every stage: expressions, equations and the circuit
//! structure they are written against.

pub mod equation;
pub mod expr;
pub mod structure;

pub use equation::{Equation, EquationSet, UnknownSet};
pub use expr::{add, call, div, eq, mul, neg, pow, sub, Expr, Symbol};
pub use structure::{Edge, Node, Value};
