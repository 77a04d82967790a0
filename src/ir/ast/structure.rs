//! Circuit structure: nodes, two-terminal edges and named values.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

use crate::ir::ast::expr::{Expr, Symbol};

/// A circuit node. Identity is the name; a ground node is the zero
/// reference potential.
#[derive(Clone, Debug, Serialize)]
pub struct Node {
    name: String,
    ground: bool,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ground: false,
        }
    }

    pub fn ground(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ground: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ground(&self) -> bool {
        self.ground
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ground {
            write!(f, "[{}]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// A two-terminal element between `first` and `second`.
///
/// Identity is the alias. Flow is modeled as leaving `first` and entering
/// `second`.
#[derive(Clone, Debug, Serialize)]
pub struct Edge {
    first: Node,
    second: Node,
    alias: String,
}

impl Edge {
    /// Creates an edge whose alias is `first_second`.
    pub fn new(first: &Node, second: &Node) -> Self {
        Self::with_alias(first, second, "")
    }

    /// Creates a named edge. An empty alias falls back to `first_second`.
    pub fn with_alias(first: &Node, second: &Node, alias: &str) -> Self {
        let alias = if alias.is_empty() {
            format!("{}_{}", first.name(), second.name())
        } else {
            alias.to_string()
        };
        Self {
            first: first.clone(),
            second: second.clone(),
            alias,
        }
    }

    pub fn first(&self) -> &Node {
        &self.first
    }

    pub fn second(&self) -> &Node {
        &self.second
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn is_connected_to(&self, node: &Node) -> bool {
        self.first == *node || self.second == *node
    }

    /// True if both edges join the same unordered pair of nodes.
    pub fn is_parallel_to(&self, other: &Edge) -> bool {
        (self.first == other.first && self.second == other.second)
            || (self.first == other.second && self.second == other.first)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.alias.cmp(&other.alias)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.alias)
    }
}

/// A named quantity: a circuit parameter or an auxiliary introduced during
/// synthesis.
///
/// When `replace` is set, using the value in an expression yields its number
/// instead of its symbol, so the same model can be synthesized fully symbolic
/// or with constants substituted up front.
#[derive(Clone, Debug, Serialize)]
pub struct Value {
    symbol: Symbol,
    value: f64,
    replace: bool,
}

impl Value {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            value: 0.0,
            replace: false,
        }
    }

    /// Sets the number and turns replacement on.
    pub fn with_value(mut self, value: f64) -> Self {
        self.set_value(value);
        self
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.replace = true;
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        self.symbol.name()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn replace(&self) -> bool {
        self.replace
    }

    /// The expression this value stands for.
    pub fn expr(&self) -> Expr {
        if self.replace {
            Expr::Number(self.value)
        } else {
            Expr::Symbol(self.symbol.clone())
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}
