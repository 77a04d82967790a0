//! Dense linear form `A x = b` of a system of equations.

use indexmap::IndexMap;
use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::ir::ast::{add, mul, neg, Equation, Expr, Symbol};

use super::SolverError;

/// Coefficient matrix and right-hand side of a linear system. Row `i`
/// stands for equation `i`, column `j` for unknown `j`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinearSystem {
    pub a: Array2<Expr>,
    pub b: Array1<Expr>,
}

/// `Σ coefficients[j] * x_j + constant`.
#[derive(Debug)]
struct LinearForm {
    coefficients: IndexMap<usize, Expr>,
    constant: Expr,
}

impl LinearForm {
    fn constant(expr: Expr) -> Self {
        Self {
            coefficients: IndexMap::new(),
            constant: expr,
        }
    }

    fn add_assign(&mut self, other: LinearForm) {
        for (j, c) in other.coefficients {
            let entry = self.coefficients.entry(j).or_insert_with(Expr::zero);
            *entry = add(&*entry, c);
        }
        self.constant = add(&self.constant, other.constant);
    }

    fn scale(self, factor: &Expr) -> Self {
        Self {
            coefficients: self
                .coefficients
                .into_iter()
                .map(|(j, c)| (j, mul(c, factor)))
                .collect(),
            constant: mul(self.constant, factor),
        }
    }
}

struct Decomposer<'a> {
    unknowns: &'a IndexMap<Symbol, usize>,
}

impl Decomposer<'_> {
    fn depends(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Number(_) => false,
            Expr::Symbol(s) => self.unknowns.contains_key(s),
            Expr::Add(items) | Expr::Mul(items) => items.iter().any(|e| self.depends(e)),
            Expr::Pow(base, exp) => self.depends(base) || self.depends(exp),
            Expr::Call { args, .. } => args.iter().any(|e| self.depends(e)),
        }
    }

    /// `None` when `expr` is not linear in the unknowns.
    fn form(&self, expr: &Expr) -> Option<LinearForm> {
        match expr {
            Expr::Symbol(s) => match self.unknowns.get(s) {
                Some(&j) => {
                    let mut form = LinearForm::constant(Expr::zero());
                    form.coefficients.insert(j, Expr::one());
                    Some(form)
                }
                None => Some(LinearForm::constant(expr.clone())),
            },
            Expr::Add(terms) => {
                let mut form = LinearForm::constant(Expr::zero());
                for term in terms {
                    form.add_assign(self.form(term)?);
                }
                Some(form)
            }
            Expr::Mul(factors) => {
                let (dependent, independent): (Vec<&Expr>, Vec<&Expr>) =
                    factors.iter().partition(|f| self.depends(f));
                match dependent.as_slice() {
                    [] => Some(LinearForm::constant(expr.clone())),
                    [single] => {
                        let scale = Expr::product(independent);
                        Some(self.form(single)?.scale(&scale))
                    }
                    _ => None,
                }
            }
            _ if self.depends(expr) => None,
            _ => Some(LinearForm::constant(expr.clone())),
        }
    }
}

/// Decomposes every `lhs == rhs` into a row of `A x = b`.
pub fn linear_system(equations: &[Equation], unknowns: &[Symbol]) -> Result<LinearSystem, SolverError> {
    let index: IndexMap<Symbol, usize> = unknowns
        .iter()
        .enumerate()
        .map(|(j, s)| (s.clone(), j))
        .collect();
    let decomposer = Decomposer { unknowns: &index };

    let mut a = Array2::from_elem((equations.len(), unknowns.len()), Expr::zero());
    let mut b = Array1::from_elem(equations.len(), Expr::zero());
    for (i, equation) in equations.iter().enumerate() {
        let form = decomposer
            .form(&equation.residual())
            .ok_or_else(|| SolverError::NonLinear {
                index: i,
                equation: equation.to_string(),
            })?;
        for (j, c) in form.coefficients {
            a[[i, j]] = c;
        }
        b[i] = neg(form.constant);
    }
    Ok(LinearSystem { a, b })
}
