//! Discretized integral and derivative operators.
//!
//! Each operator call introduces a fresh auxiliary holding the previous
//! step's state, returns the per-step algebraic replacement of the operator
//! and records a support equation describing how the auxiliary is refreshed
//! once the system has been solved.
//!
//! | operator        | auxiliary | returns            | support                  |
//! |-----------------|-----------|--------------------|--------------------------|
//! | `integral(e)`   | `idtN`    | `aux + e*ts`       | `aux == e*ts`            |
//! | `derivative(e)` | `ddtN`    | `(e - aux)/ts`     | `aux == (e - aux)/ts`    |

use crate::ir::ast::{add, div, eq, mul, sub, EquationSet, Expr, Value};
use crate::ir::context::SynthesisContext;

pub const INTEGRAL_PREFIX: &str = "idt";
pub const DERIVATIVE_PREFIX: &str = "ddt";

#[derive(Clone, Debug, Default)]
pub struct Discretizer {
    support: EquationSet,
    auxiliaries: Vec<Value>,
}

impl Discretizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integral(&mut self, ctx: &mut SynthesisContext, e: impl Into<Expr>) -> Expr {
        let e = e.into();
        let aux = ctx.fresh_symbol(INTEGRAL_PREFIX);
        let step = mul(e, ctx.timestep_expr());
        log::trace!("integral auxiliary {}", aux);
        self.support.push(eq(&aux, &step));
        self.auxiliaries.push(Value::new(aux.clone()));
        add(aux, step)
    }

    pub fn derivative(&mut self, ctx: &mut SynthesisContext, e: impl Into<Expr>) -> Expr {
        let e = e.into();
        let aux = ctx.fresh_symbol(DERIVATIVE_PREFIX);
        let rate = div(sub(e, &aux), ctx.timestep_expr());
        log::trace!("derivative auxiliary {}", aux);
        self.support.push(eq(&aux, &rate));
        self.auxiliaries.push(Value::new(aux));
        rate
    }

    pub fn support(&self) -> &EquationSet {
        &self.support
    }

    pub fn auxiliaries(&self) -> &[Value] {
        &self.auxiliaries
    }

    pub fn into_parts(self) -> (EquationSet, Vec<Value>) {
        (self.support, self.auxiliaries)
    }
}
