//! Acceptance check for element equations.
//!
//! Only equalities built from numbers, symbols, sums, products and powers can
//! enter a system. Any function term makes the equation unsupported.

use crate::ir::ast::{Equation, Expr};
use crate::ir::visitor::{Visitable, Visitor};

#[derive(Debug, Default)]
pub struct Classifier {
    unsupported: Vec<String>,
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_supported(&self) -> bool {
        self.unsupported.is_empty()
    }

    /// Names of the rejected function terms, in visiting order.
    pub fn unsupported(&self) -> &[String] {
        &self.unsupported
    }
}

impl Visitor for Classifier {
    fn enter_call(&mut self, name: &str, _args: &[Expr]) {
        self.unsupported.push(name.to_string());
    }
}

/// True if `equation` may be added to a system.
pub fn classify(equation: &Equation) -> bool {
    let mut classifier = Classifier::new();
    equation.accept(&mut classifier);
    classifier.is_supported()
}
