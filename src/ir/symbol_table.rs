//! Symbol interning and unique label generation.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::ir::ast::Symbol;

/// Maps textual names to interned symbols.
///
/// Interning is idempotent: the same name always yields the same handle until
/// the table is cleared. Ids keep increasing across `clear`, so a handle from
/// before a clear never compares equal to one issued after it.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
    next_id: u64,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `name`, creating it on first use.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(symbol) = self.symbols.get(name) {
            return symbol.clone();
        }
        let symbol = Symbol::new(self.next_id, name);
        self.next_id += 1;
        self.symbols.insert(name.to_string(), symbol.clone());
        symbol
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in interning order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }
}

/// Issues labels of the form `prefixN` that were never issued before.
#[derive(Debug, Default)]
pub struct NameGenerator {
    used: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl NameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the first `prefixN` that is neither already issued nor
    /// rejected by `taken`, and records it.
    pub fn fresh<F>(&mut self, prefix: &str, taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        loop {
            let label = format!("{}{}", prefix, counter);
            *counter += 1;
            if !self.used.contains(&label) && !taken(&label) {
                self.used.insert(label.clone());
                return label;
            }
        }
    }

    pub fn clear(&mut self) {
        self.used.clear();
        self.counters.clear();
    }
}
