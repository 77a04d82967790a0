//! Declaration surface used by models while they are being synthesized.

use crate::ir::analysis::classifier::classify;
use crate::ir::ast::{Edge, Equation, EquationSet, Expr, Node, Symbol, UnknownSet, Value};
use crate::ir::context::SynthesisContext;
use crate::ir::structural::{self, Topology};
use crate::ir::transform::discretize::Discretizer;

use super::system::System;
use super::AnalogModel;

/// One in-progress synthesis.
///
/// Accessors register the edges they are asked about, so the topology is
/// exactly what the model touched, in the order it touched it.
pub struct Session<'a> {
    ctx: &'a mut SynthesisContext,
    topology: Topology,
    equations: EquationSet,
    unknowns: UnknownSet,
    values: Vec<Value>,
    discretizer: Discretizer,
    dropped: usize,
}

impl<'a> Session<'a> {
    pub fn new(ctx: &'a mut SynthesisContext) -> Self {
        Self {
            ctx,
            topology: Topology::new(),
            equations: EquationSet::new(),
            unknowns: UnknownSet::new(),
            values: Vec::new(),
            discretizer: Discretizer::new(),
            dropped: 0,
        }
    }

    /// Potential across `edge`.
    pub fn potential(&mut self, edge: &Edge) -> Symbol {
        self.topology.register_edge(edge);
        self.ctx.potential(edge)
    }

    /// Potential across the unnamed edge from `first` to `second`.
    pub fn potential_between(&mut self, first: &Node, second: &Node) -> Symbol {
        self.potential(&Edge::new(first, second))
    }

    /// Flow through `edge`, leaving `first` and entering `second`.
    pub fn flow(&mut self, edge: &Edge) -> Symbol {
        self.topology.register_edge(edge);
        self.ctx.flow(edge)
    }

    pub fn flow_between(&mut self, first: &Node, second: &Node) -> Symbol {
        self.flow(&Edge::new(first, second))
    }

    /// Discretized integral of `e`.
    pub fn integral(&mut self, e: impl Into<Expr>) -> Expr {
        self.discretizer.integral(self.ctx, e)
    }

    /// Discretized time derivative of `e`.
    pub fn derivative(&mut self, e: impl Into<Expr>) -> Expr {
        self.discretizer.derivative(self.ctx, e)
    }

    /// Adds an element equation. Equations containing function terms are
    /// dropped and `false` is returned.
    pub fn equation(&mut self, equation: Equation) -> bool {
        if classify(&equation) {
            self.equations.push(equation);
            true
        } else {
            log::debug!("dropping unsupported equation {}", equation);
            self.dropped += 1;
            false
        }
    }

    pub fn equations<I>(&mut self, equations: I)
    where
        I: IntoIterator<Item = Equation>,
    {
        for equation in equations {
            self.equation(equation);
        }
    }

    /// Declares an unknown. Repeated declarations are ignored.
    pub fn unknown(&mut self, symbol: Symbol) {
        if self.unknowns.contains(&symbol) {
            log::debug!("unknown {} declared twice", symbol);
            return;
        }
        self.unknowns.push(symbol);
    }

    pub fn unknowns<I>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = Symbol>,
    {
        for symbol in symbols {
            self.unknown(symbol);
        }
    }

    /// A symbolic circuit parameter.
    pub fn value(&mut self, name: &str) -> Value {
        let value = Value::new(self.ctx.symbol(name));
        self.register_value(&value);
        value
    }

    /// A circuit parameter whose number is substituted wherever it is used.
    pub fn constant(&mut self, name: &str, number: f64) -> Value {
        let value = Value::new(self.ctx.symbol(name)).with_value(number);
        self.register_value(&value);
        value
    }

    fn register_value(&mut self, value: &Value) {
        if !self.values.contains(value) {
            self.values.push(value.clone());
        }
    }

    /// The timestep as it appears in discretized relations.
    pub fn timestep(&self) -> Expr {
        self.ctx.timestep_expr()
    }

    /// Any other named symbol.
    pub fn symbol(&mut self, name: &str) -> Symbol {
        self.ctx.symbol(name)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Number of equations rejected so far.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Runs the structural analysis and assembles the system.
    pub fn finish(self) -> System {
        let analysis = structural::analyze(&self.topology, self.ctx);
        let tree = analysis
            .tree_edges(&self.topology)
            .map(|e| e.alias().to_string())
            .collect();
        let (support, auxiliaries) = self.discretizer.into_parts();
        log::debug!(
            "synthesized {} element, {} KVL and {} KCL equations for {} unknowns",
            self.equations.len(),
            analysis.kvl.len(),
            analysis.kcl.len(),
            self.unknowns.len()
        );
        System {
            topology: self.topology,
            equations: self.equations,
            kvl: analysis.kvl,
            kcl: analysis.kcl,
            unknowns: self.unknowns,
            values: self.values,
            support,
            auxiliaries,
            timestep: self.ctx.timestep().clone(),
            tree,
            diagnostics: analysis.diagnostics,
        }
    }
}

/// Runs `model` against `ctx` and returns the synthesized system.
pub fn synthesize<M: AnalogModel + ?Sized>(ctx: &mut SynthesisContext, model: &M) -> System {
    let mut session = Session::new(ctx);
    model.setup(&mut session);
    session.finish()
}
