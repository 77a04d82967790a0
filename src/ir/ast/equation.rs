use std::fmt;

use serde::Serialize;

use crate::ir::ast::expr::{sub, Expr, Symbol};

/// A symbolic equality `lhs == rhs`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    /// `lhs - rhs`, which is zero whenever the equation holds.
    pub fn residual(&self) -> Expr {
        sub(&self.lhs, &self.rhs)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.lhs.contains(symbol) || self.rhs.contains(symbol)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} == {}", self.lhs, self.rhs)
    }
}

/// An ordered collection of equations.
pub type EquationSet = Vec<Equation>;

/// The ordered unknowns a solver has to resolve.
pub type UnknownSet = Vec<Symbol>;
