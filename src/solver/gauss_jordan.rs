//! Gauss-Jordan elimination over symbolic coefficients.
//!
//! Coefficients are expressions, so deciding whether one is zero is not
//! always possible syntactically. Every non-unknown symbol is given a fixed
//! pseudo-random probe value; an expression whose probe is negligible next to
//! the operands it was computed from is taken to be zero. The same probe
//! picks the pivot with the largest magnitude in each column.

use std::collections::HashSet;

use crate::ir::ast::{div, eq, mul, sub, Equation, Expr, Symbol};

use super::linear::linear_system;
use super::{Solver, SolverError};

/// Fractional part of the golden ratio, spreads probe values over `[1, 2)`.
const PROBE_STEP: f64 = 0.618_033_988_749_895;

#[derive(Clone, Debug)]
pub struct GaussJordan {
    pub tolerance: f64,
}

impl Default for GaussJordan {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

fn probe_value(symbol: &Symbol) -> f64 {
    1.0 + ((symbol.id() + 1) as f64 * PROBE_STEP).fract()
}

struct Probe<'a> {
    unknowns: HashSet<&'a Symbol>,
}

impl Probe<'_> {
    fn magnitude(&self, expr: &Expr) -> f64 {
        let env = |s: &Symbol| {
            if self.unknowns.contains(s) {
                None
            } else {
                Some(probe_value(s))
            }
        };
        match expr.eval(&env) {
            Some(v) if v.is_finite() => v.abs(),
            // Functions without a numeric rule are treated as non-vanishing.
            _ => 1.0,
        }
    }
}

impl GaussJordan {
    pub fn new() -> Self {
        Self::default()
    }

    /// `old - delta`, or zero when the difference cancels.
    fn reduce(&self, probe: &Probe<'_>, old: &Expr, delta: Expr) -> Expr {
        let value = sub(old, &delta);
        if value.is_zero() {
            return value;
        }
        let scale = probe.magnitude(old).max(probe.magnitude(&delta));
        if probe.magnitude(&value) <= self.tolerance * scale {
            Expr::zero()
        } else {
            value
        }
    }
}

impl Solver for GaussJordan {
    fn solve(
        &self,
        equations: &[Equation],
        unknowns: &[Symbol],
    ) -> Result<Vec<Equation>, SolverError> {
        let mut system = linear_system(equations, unknowns)?;
        let probe = Probe {
            unknowns: unknowns.iter().collect(),
        };
        let (rows, cols) = system.a.dim();
        let mut used = vec![false; rows];
        let mut pivots = Vec::with_capacity(cols);
        // Largest magnitude each right-hand side has been computed from.
        let mut b_scale: Vec<f64> = system.b.iter().map(|b| probe.magnitude(b)).collect();

        for c in 0..cols {
            // Candidates are compared relative to the largest coefficient of
            // their own row, so uniformly small rows still pivot.
            let mut best: Option<(usize, f64)> = None;
            for r in (0..rows).filter(|&r| !used[r]) {
                if system.a[[r, c]].is_zero() {
                    continue;
                }
                let row_scale = system
                    .a
                    .row(r)
                    .iter()
                    .map(|e| probe.magnitude(e))
                    .fold(0.0, f64::max);
                let relative = probe.magnitude(&system.a[[r, c]]) / row_scale;
                if relative > self.tolerance && best.map_or(true, |(_, m)| relative > m) {
                    best = Some((r, relative));
                }
            }
            let (p, _) = best.ok_or_else(|| SolverError::Singular {
                unknown: unknowns[c].name().to_string(),
            })?;
            used[p] = true;
            pivots.push(p);
            log::trace!("pivot for {} is equation {}", unknowns[c], p);

            let pivot = system.a[[p, c]].clone();
            let pivot_row = system.a.row(p).to_vec();
            let pivot_b = system.b[p].clone();
            for r in 0..rows {
                if r == p || system.a[[r, c]].is_zero() {
                    continue;
                }
                let ratio = div(&system.a[[r, c]], &pivot);
                for (k, coefficient) in pivot_row.iter().enumerate() {
                    if k == c {
                        system.a[[r, k]] = Expr::zero();
                    } else if !coefficient.is_zero() {
                        let reduced =
                            self.reduce(&probe, &system.a[[r, k]], mul(&ratio, coefficient));
                        system.a[[r, k]] = reduced;
                    }
                }
                if !pivot_b.is_zero() {
                    let delta = mul(&ratio, &pivot_b);
                    b_scale[r] = b_scale[r].max(probe.magnitude(&delta));
                    let reduced = self.reduce(&probe, &system.b[r], delta);
                    system.b[r] = reduced;
                }
            }
        }

        for r in (0..rows).filter(|&r| !used[r]) {
            let residual = &system.b[r];
            if !residual.is_zero() && probe.magnitude(residual) > self.tolerance * b_scale[r] {
                return Err(SolverError::Inconsistent {
                    index: r,
                    residual: residual.to_string(),
                });
            }
        }

        Ok(unknowns
            .iter()
            .zip(pivots)
            .enumerate()
            .map(|(c, (unknown, p))| eq(unknown, div(&system.b[p], &system.a[[p, c]])))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ast::{add, mul};
    use crate::ir::context::SynthesisContext;

    fn value_of(solution: &[Equation], unknown: &Symbol, env: &dyn Fn(&Symbol) -> Option<f64>) -> f64 {
        let equation = solution
            .iter()
            .find(|e| e.lhs == Expr::from(unknown))
            .unwrap();
        equation.rhs.eval(&env).unwrap()
    }

    #[test]
    fn test_numeric_system() {
        let mut ctx = SynthesisContext::new();
        let x = ctx.symbol("x");
        let y = ctx.symbol("y");
        let equations = [eq(add(&x, &y), 3.0), eq(sub(&x, &y), 1.0)];
        let solution = GaussJordan::new().solve(&equations, &[x.clone(), y.clone()]).unwrap();
        assert_eq!(solution[0], eq(&x, 2.0));
        assert_eq!(solution[1], eq(&y, 1.0));
    }

    #[test]
    fn test_symbolic_divider() {
        let mut ctx = SynthesisContext::new();
        let v1 = ctx.symbol("R1.pot");
        let v2 = ctx.symbol("R2.pot");
        let i = ctx.symbol("R1.flw");
        let vin = ctx.symbol("vin");
        let r1 = ctx.symbol("r1");
        let r2 = ctx.symbol("r2");
        let equations = [
            eq(&v1, mul(&r1, &i)),
            eq(&v2, mul(&r2, &i)),
            eq(add(&v1, &v2), &vin),
        ];
        let unknowns = [v1.clone(), v2.clone(), i.clone()];
        let solution = GaussJordan::new().solve(&equations, &unknowns).unwrap();
        let env = |s: &Symbol| match s.name() {
            "vin" => Some(10.0),
            "r1" => Some(1.0),
            "r2" => Some(4.0),
            _ => None,
        };
        assert!((value_of(&solution, &v1, &env) - 2.0).abs() < 1e-12);
        assert!((value_of(&solution, &v2, &env) - 8.0).abs() < 1e-12);
        assert!((value_of(&solution, &i, &env) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_redundant_rows_are_accepted() {
        let mut ctx = SynthesisContext::new();
        let x = ctx.symbol("x");
        let a = ctx.symbol("a");
        let equations = [eq(&x, &a), eq(mul(2.0, &x), mul(2.0, &a))];
        let solution = GaussJordan::new().solve(&equations, &[x.clone()]).unwrap();
        assert_eq!(solution, [eq(&x, &a)]);
    }

    #[test]
    fn test_singular_and_inconsistent() {
        let mut ctx = SynthesisContext::new();
        let x = ctx.symbol("x");
        let y = ctx.symbol("y");
        let solver = GaussJordan::new();

        let singular = solver.solve(&[eq(add(&x, &y), 1.0)], &[x.clone(), y.clone()]);
        assert!(matches!(singular, Err(SolverError::Singular { unknown }) if unknown == "y"));

        let inconsistent = solver.solve(&[eq(&x, 1.0), eq(&x, 2.0)], &[x.clone()]);
        assert!(matches!(
            inconsistent,
            Err(SolverError::Inconsistent { index: 1, .. })
        ));
    }

    #[test]
    fn test_small_coefficients_pivot() {
        let mut ctx = SynthesisContext::new();
        let x = ctx.symbol("x");
        let y = ctx.symbol("y");
        let unknowns = [x.clone(), y.clone()];
        let none = |_: &Symbol| -> Option<f64> { None };

        let equations = [eq(mul(1e-10, &x), 1e-10), eq(&y, &x)];
        let solution = GaussJordan::new().solve(&equations, &unknowns).unwrap();
        assert!((value_of(&solution, &x, &none) - 1.0).abs() < 1e-12);
        assert!((value_of(&solution, &y, &none) - 1.0).abs() < 1e-12);

        // Femtofarad-scale capacitor next to a unit source.
        let c = ctx.symbol("c");
        let equations = [eq(&x, mul(&c, &y)), eq(&y, 3.0)];
        let solution = GaussJordan::new().solve(&equations, &unknowns).unwrap();
        let env = |s: &Symbol| if *s == c { Some(1e-15) } else { None };
        assert!((value_of(&solution, &x, &env) - 3e-15).abs() < 1e-27);

        let inconsistent = GaussJordan::new().solve(
            &[eq(mul(1e-12, &x), 1e-12), eq(mul(1e-12, &x), 2e-12)],
            &[x.clone()],
        );
        assert!(matches!(
            inconsistent,
            Err(SolverError::Inconsistent { index: 1, .. })
        ));
    }
}
