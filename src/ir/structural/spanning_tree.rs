//! Ground-anchored spanning tree.
//!
//! The tree is grown in two passes over the declaration order:
//!
//! 1. Ground pass. Every edge touching a ground node is taken unless both of
//!    its endpoints are already selected, or an already taken edge touches
//!    one endpoint while the other endpoint is ground.
//! 2. Growth pass. The selected nodes are visited in selection order, nodes
//!    selected during the pass included. An untaken edge incident to the
//!    visited node whose other endpoint is unselected is taken together with
//!    that endpoint.
//!
//! Self-loops never enter the tree.

use super::topology::Graph;

/// Ordered selection of nodes and edges with constant-time membership.
#[derive(Clone, Debug)]
pub(crate) struct Selection {
    nodes: Vec<usize>,
    edges: Vec<usize>,
    node_mask: Vec<bool>,
    edge_mask: Vec<bool>,
}

impl Selection {
    pub fn new(graph: &Graph) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            node_mask: vec![false; graph.node_count()],
            edge_mask: vec![false; graph.edge_count()],
        }
    }

    pub fn select_node(&mut self, n: usize) -> bool {
        if self.node_mask[n] {
            return false;
        }
        self.node_mask[n] = true;
        self.nodes.push(n);
        true
    }

    pub fn select_edge(&mut self, e: usize) -> bool {
        if self.edge_mask[e] {
            return false;
        }
        self.edge_mask[e] = true;
        self.edges.push(e);
        true
    }

    pub fn remove_node(&mut self, n: usize) {
        if self.node_mask[n] {
            self.node_mask[n] = false;
            self.nodes.retain(|&m| m != n);
        }
    }

    pub fn remove_edge(&mut self, e: usize) {
        if self.edge_mask[e] {
            self.edge_mask[e] = false;
            self.edges.retain(|&f| f != e);
        }
    }

    pub fn has_node(&self, n: usize) -> bool {
        self.node_mask[n]
    }

    pub fn has_edge(&self, e: usize) -> bool {
        self.edge_mask[e]
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn edges(&self) -> &[usize] {
        &self.edges
    }
}

/// Edges of the spanning tree, as positions in the topology's edge order.
#[derive(Clone, Debug)]
pub struct SpanningTree {
    pub(crate) selection: Selection,
    expected: usize,
}

impl SpanningTree {
    /// Tree edges in selection order.
    pub fn edges(&self) -> &[usize] {
        self.selection.edges()
    }

    pub fn contains(&self, e: usize) -> bool {
        self.selection.has_edge(e)
    }

    pub fn len(&self) -> usize {
        self.selection.edges().len()
    }

    pub fn is_empty(&self) -> bool {
        self.selection.edges().is_empty()
    }

    /// Number of edges a tree over every node would have.
    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn is_complete(&self) -> bool {
        self.len() == self.expected
    }
}

fn ground_pass(graph: &Graph, selected: &mut Selection) {
    for e in 0..graph.edge_count() {
        let (a, b) = graph.ends[e];
        if graph.is_self_loop(e) || (!graph.ground[a] && !graph.ground[b]) {
            continue;
        }
        if selected.has_node(a) && selected.has_node(b) {
            continue;
        }
        let blocked = selected.edges().iter().any(|&s| {
            (graph.is_connected(s, a) && graph.ground[b])
                || (graph.is_connected(s, b) && graph.ground[a])
        });
        if blocked {
            continue;
        }
        selected.select_edge(e);
        selected.select_node(a);
        selected.select_node(b);
    }
}

fn growth_pass(graph: &Graph, selected: &mut Selection) {
    let mut cursor = 0;
    while cursor < selected.nodes().len() {
        let n = selected.nodes()[cursor];
        cursor += 1;
        for &e in &graph.incident[n] {
            if selected.has_edge(e) {
                continue;
            }
            let (a, b) = graph.ends[e];
            if n == a && !selected.has_node(b) {
                selected.select_edge(e);
                selected.select_node(b);
            } else if n == b && !selected.has_node(a) {
                selected.select_edge(e);
                selected.select_node(a);
            }
        }
    }
}

pub(crate) fn build(graph: &Graph) -> SpanningTree {
    let mut selection = Selection::new(graph);
    ground_pass(graph, &mut selection);
    growth_pass(graph, &mut selection);
    SpanningTree {
        selection,
        expected: graph.node_count().saturating_sub(1),
    }
}
