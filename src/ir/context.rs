//! Caller-owned state shared by synthesis runs.
//!
//! A `SynthesisContext` holds the symbol table, the registry of issued
//! auxiliary labels and the timestep value. Every synthesis run borrows one
//! mutably; nothing is process-global. Running several models against the
//! same context makes equally named parameters resolve to the same symbol.

use crate::ir::ast::{Edge, Expr, Symbol, Value};
use crate::ir::error::IrError;
use crate::ir::symbol_table::{NameGenerator, SymbolTable};

/// Name of the timestep symbol.
pub const TIMESTEP: &str = "ts";

#[derive(Debug)]
pub struct SynthesisContext {
    symbols: SymbolTable,
    labels: NameGenerator,
    timestep: Value,
}

impl Default for SynthesisContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisContext {
    /// Creates a context in symbolic mode (timestep zero).
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        let timestep = Value::new(symbols.intern(TIMESTEP));
        Self {
            symbols,
            labels: NameGenerator::new(),
            timestep,
        }
    }

    /// Creates a context whose timestep is the given number.
    pub fn with_timestep(dt: f64) -> Result<Self, IrError> {
        let mut ctx = Self::new();
        ctx.set_timestep(dt)?;
        Ok(ctx)
    }

    /// Returns the symbol named `name`, interning it on first use.
    pub fn symbol(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// A symbol named `prefixN` that clashes with no issued label and no
    /// interned symbol.
    pub fn fresh_symbol(&mut self, prefix: &str) -> Symbol {
        let symbols = &self.symbols;
        let label = self.labels.fresh(prefix, |l| symbols.contains(l));
        self.symbols.intern(&label)
    }

    /// Potential symbol of an edge, `alias.pot`.
    pub fn potential(&mut self, edge: &Edge) -> Symbol {
        self.symbols.intern(&format!("{}.pot", edge.alias()))
    }

    /// Flow symbol of an edge, `alias.flw`.
    pub fn flow(&mut self, edge: &Edge) -> Symbol {
        self.symbols.intern(&format!("{}.flw", edge.alias()))
    }

    pub fn timestep(&self) -> &Value {
        &self.timestep
    }

    /// Sets the timestep. Zero selects symbolic mode.
    pub fn set_timestep(&mut self, dt: f64) -> Result<(), IrError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(IrError::InvalidTimestep(dt));
        }
        self.timestep.set_value(dt);
        Ok(())
    }

    /// The timestep as used in discretized relations: the number when one is
    /// set, the `ts` symbol in symbolic mode.
    pub fn timestep_expr(&self) -> Expr {
        if self.timestep.replace() && self.timestep.value() != 0.0 {
            Expr::Number(self.timestep.value())
        } else {
            Expr::Symbol(self.timestep.symbol().clone())
        }
    }

    /// Forgets every interned symbol and issued label.
    ///
    /// The timestep number survives; its symbol is re-interned, so symbols
    /// obtained before the reset never equal symbols obtained after it.
    pub fn reset(&mut self) {
        self.symbols.clear();
        self.labels.clear();
        let mut timestep = Value::new(self.symbols.intern(TIMESTEP));
        if self.timestep.replace() {
            timestep.set_value(self.timestep.value());
        }
        self.timestep = timestep;
    }
}
