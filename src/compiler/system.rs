//! Synthesized and solved systems.

use std::fmt;

use serde::Serialize;

use crate::ir::ast::{Equation, EquationSet, Expr, UnknownSet, Value};
use crate::ir::structural::{Diagnostic, Topology};
use crate::ir::transform::substitute::Substitution;
use crate::solver::{linear_system, LinearSystem, Solver, SolverError};

use super::balance::BalanceResult;
use super::error::SynthesisError;

/// Everything a model synthesis produced, before solving.
#[derive(Clone, Debug, Serialize)]
pub struct System {
    pub topology: Topology,
    /// Element equations, in declaration order.
    pub equations: EquationSet,
    /// Loop equations followed by parallel equalities.
    pub kvl: EquationSet,
    pub kcl: EquationSet,
    pub unknowns: UnknownSet,
    /// Registered circuit parameters.
    pub values: Vec<Value>,
    /// Refresh equations of the discretization auxiliaries.
    pub support: EquationSet,
    pub auxiliaries: Vec<Value>,
    pub timestep: Value,
    /// Aliases of the spanning tree edges.
    pub tree: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl System {
    /// Element, KVL and KCL equations, in that order.
    pub fn merged_equations(&self) -> EquationSet {
        self.equations
            .iter()
            .chain(&self.kvl)
            .chain(&self.kcl)
            .cloned()
            .collect()
    }

    pub fn check_balance(&self) -> BalanceResult {
        BalanceResult::new(
            self.equations.len() + self.kvl.len() + self.kcl.len(),
            self.unknowns.len(),
        )
    }

    /// Dense form of the merged equations after `substitution`.
    pub fn linear_system(&self, substitution: &Substitution) -> Result<LinearSystem, SolverError> {
        let equations: EquationSet = self
            .merged_equations()
            .iter()
            .map(|e| substitution.apply(e))
            .collect();
        linear_system(&equations, &self.unknowns)
    }

    /// Solves the merged equations for the unknowns.
    pub fn solve<S: Solver + ?Sized>(
        &self,
        solver: &S,
        substitution: &Substitution,
    ) -> Result<SolvedSystem, SynthesisError> {
        let equations: EquationSet = self
            .merged_equations()
            .iter()
            .map(|e| substitution.apply(e))
            .collect();
        let solution = solver.solve(&equations, &self.unknowns)?;

        for unknown in &self.unknowns {
            let target = Expr::from(unknown);
            if !solution.iter().any(|e| e.lhs == target) {
                return Err(SynthesisError::MissingSolution {
                    unknown: unknown.name().to_string(),
                });
            }
        }

        Ok(SolvedSystem {
            equations: solution,
            support: self.support.iter().map(|e| substitution.apply(e)).collect(),
            auxiliaries: self.auxiliaries.clone(),
        })
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: impl Iterator<Item = T>) -> fmt::Result {
            for item in items {
                write!(f, " {}", item)?;
            }
            writeln!(f)
        }
        fn block(f: &mut fmt::Formatter<'_>, title: &str, equations: &[Equation]) -> fmt::Result {
            writeln!(f, "    {}", title)?;
            for equation in equations {
                writeln!(f, "        {}", equation)?;
            }
            Ok(())
        }

        writeln!(f, "system:")?;
        write!(f, "    Nodes  :")?;
        list(f, self.topology.nodes().iter())?;
        write!(f, "    Edges  :")?;
        list(f, self.topology.edges().iter())?;
        write!(f, "    Values :")?;
        list(f, self.values.iter())?;
        block(f, "Equations", &self.equations)?;
        block(f, "Equations (KVL)", &self.kvl)?;
        block(f, "Equations (KCL)", &self.kcl)?;
        block(f, "Support", &self.support)?;
        writeln!(f, "    Unknowns")?;
        for unknown in &self.unknowns {
            writeln!(f, "        {}", unknown)?;
        }
        Ok(())
    }
}

/// One closed form per unknown plus the auxiliary refresh equations.
#[derive(Clone, Debug, Serialize)]
pub struct SolvedSystem {
    pub equations: Vec<Equation>,
    pub support: EquationSet,
    pub auxiliaries: Vec<Value>,
}

impl SolvedSystem {
    /// Closed form of the unknown named `name`.
    pub fn solution(&self, name: &str) -> Option<&Expr> {
        self.equations
            .iter()
            .find(|e| e.lhs.as_symbol().is_some_and(|s| s.name() == name))
            .map(|e| &e.rhs)
    }
}

impl fmt::Display for SolvedSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solved equations:")?;
        for equation in &self.equations {
            writeln!(f, "    {}", equation)?;
        }
        writeln!(f, "Support:")?;
        for equation in &self.support {
            writeln!(f, "    {}", equation)?;
        }
        Ok(())
    }
}
