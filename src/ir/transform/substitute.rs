//! Replacement of symbols by expressions.
//!
//! A `Substitution` is applied bottom-up: every rewritten sum, product and
//! power is canonicalized again, so substituting numbers folds the affected
//! subtrees.

use ordermap::OrderMap;

use crate::ir::ast::{Equation, Expr, Symbol};
use crate::ir::context::SynthesisContext;
use crate::ir::error::IrError;
use crate::ir::transform::simplify::{canonical_power, canonical_product, canonical_sum};
use crate::ir::visitor::{MutVisitable, MutVisitor};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitution {
    map: OrderMap<Symbol, Expr>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a substitution from `name = value` pairs. Every name must
    /// already be interned in `ctx`.
    pub fn from_assignments<'a, I>(ctx: &SynthesisContext, assignments: I) -> Result<Self, IrError>
    where
        I: IntoIterator<Item = &'a (String, f64)>,
    {
        let mut substitution = Self::new();
        for (name, value) in assignments {
            let symbol = ctx
                .lookup(name)
                .ok_or_else(|| IrError::UnknownSymbol(name.clone()))?;
            substitution.insert(symbol.clone(), *value);
        }
        Ok(substitution)
    }

    pub fn insert(&mut self, symbol: Symbol, replacement: impl Into<Expr>) {
        self.map.insert(symbol, replacement.into());
    }

    pub fn get(&self, symbol: &Symbol) -> Option<&Expr> {
        self.map.get(symbol)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Expr)> {
        self.map.iter()
    }

    pub fn apply_expr(&self, expr: &Expr) -> Expr {
        let mut expr = expr.clone();
        if !self.is_empty() {
            expr.accept_mut(&mut Replacer { map: &self.map });
        }
        expr
    }

    pub fn apply(&self, equation: &Equation) -> Equation {
        let mut equation = equation.clone();
        if !self.is_empty() {
            equation.accept_mut(&mut Replacer { map: &self.map });
        }
        equation
    }
}

struct Replacer<'a> {
    map: &'a OrderMap<Symbol, Expr>,
}

impl MutVisitor for Replacer<'_> {
    fn exit_expr(&mut self, node: &mut Expr) {
        *node = match std::mem::replace(node, Expr::zero()) {
            Expr::Symbol(s) => match self.map.get(&s) {
                Some(replacement) => replacement.clone(),
                None => Expr::Symbol(s),
            },
            Expr::Add(terms) => canonical_sum(terms),
            Expr::Mul(factors) => canonical_product(factors),
            Expr::Pow(base, exp) => canonical_power(*base, *exp),
            other => other,
        };
    }
}

/// Parses a `NAME=VALUE` command-line assignment.
pub fn parse_assignment(text: &str) -> Result<(String, f64), IrError> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| IrError::InvalidAssignment(text.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(IrError::InvalidAssignment(text.to_string()));
    }
    let value = value.trim();
    let number = value.parse::<f64>().map_err(|_| IrError::InvalidNumber {
        name: name.to_string(),
        value: value.to_string(),
    })?;
    Ok((name.to_string(), number))
}
