//! Node and edge registry of a circuit.

use indexmap::IndexSet;
use serde::Serialize;

use crate::ir::ast::{Edge, Node};

/// Insertion-ordered, deduplicated nodes and edges.
///
/// Registration is idempotent. Registering an edge registers both endpoints,
/// first endpoint first. When a name is registered twice the first
/// registration wins, including its ground flag.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Topology {
    nodes: IndexSet<Node>,
    edges: IndexSet<Edge>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the node was not registered before.
    pub fn register_node(&mut self, node: &Node) -> bool {
        if self.nodes.contains(node) {
            return false;
        }
        self.nodes.insert(node.clone())
    }

    /// Returns true if the edge was not registered before.
    pub fn register_edge(&mut self, edge: &Edge) -> bool {
        if self.edges.contains(edge) {
            return false;
        }
        self.register_node(edge.first());
        self.register_node(edge.second());
        self.edges.insert(edge.clone())
    }

    pub fn nodes(&self) -> &IndexSet<Node> {
        &self.nodes
    }

    pub fn edges(&self) -> &IndexSet<Edge> {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Edges connected to `node`, in declaration order.
    pub fn connected_edges<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.is_connected_to(node))
    }

    pub(crate) fn graph(&self) -> Graph {
        Graph::new(self)
    }
}

/// Index view of a topology used by the structural passes.
///
/// Nodes and edges are referred to by their position in the topology.
#[derive(Debug)]
pub(crate) struct Graph {
    pub ground: Vec<bool>,
    pub ends: Vec<(usize, usize)>,
    /// Edges incident to each node, in declaration order.
    pub incident: Vec<Vec<usize>>,
}

impl Graph {
    fn new(topology: &Topology) -> Self {
        let ground: Vec<bool> = topology.nodes.iter().map(Node::is_ground).collect();
        let mut incident = vec![Vec::new(); ground.len()];
        let mut ends = Vec::with_capacity(topology.edges.len());
        for (e, edge) in topology.edges.iter().enumerate() {
            // Endpoints are always registered together with their edge.
            let a = topology.nodes.get_index_of(edge.first()).unwrap_or_default();
            let b = topology.nodes.get_index_of(edge.second()).unwrap_or_default();
            incident[a].push(e);
            if b != a {
                incident[b].push(e);
            }
            ends.push((a, b));
        }
        Self {
            ground,
            ends,
            incident,
        }
    }

    pub fn node_count(&self) -> usize {
        self.ground.len()
    }

    pub fn edge_count(&self) -> usize {
        self.ends.len()
    }

    pub fn is_self_loop(&self, e: usize) -> bool {
        self.ends[e].0 == self.ends[e].1
    }

    pub fn is_connected(&self, e: usize, n: usize) -> bool {
        self.ends[e].0 == n || self.ends[e].1 == n
    }

    /// Same unordered pair of endpoints.
    pub fn is_parallel(&self, a: usize, b: usize) -> bool {
        let (a0, a1) = self.ends[a];
        let (b0, b1) = self.ends[b];
        (a0 == b0 && a1 == b1) || (a0 == b1 && a1 == b0)
    }
}
