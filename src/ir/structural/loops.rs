//! Fundamental loops of the non-tree edges.
//!
//! For every edge outside the spanning tree, in declaration order, the edge
//! is added to a copy of the tree selection and a depth-first walk starts at
//! its second endpoint. The walk follows selected edges only, skipping edges
//! already on the current path and edges parallel to any edge on it. Reaching
//! a node already on the path closes the loop. While unwinding, each edge is
//! classified by the direction it was walked: first to second is positive,
//! second to first is negative.

use serde::Serialize;

use super::spanning_tree::{Selection, SpanningTree};
use super::topology::Graph;

/// Signed edges of one closed loop, as positions in the topology's edge
/// order. Both lists are in unwinding order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphLoop {
    pub positive: Vec<usize>,
    pub negative: Vec<usize>,
}

impl GraphLoop {
    pub fn is_empty(&self) -> bool {
        self.positive.is_empty() && self.negative.is_empty()
    }
}

struct Walk<'a> {
    graph: &'a Graph,
    selected: &'a Selection,
    visited: Selection,
    found: GraphLoop,
}

impl Walk<'_> {
    fn is_parallel_to_visited(&self, e: usize) -> bool {
        self.visited
            .edges()
            .iter()
            .any(|&v| self.graph.is_parallel(v, e))
    }

    fn visit(&mut self, n: usize) -> bool {
        if self.visited.has_node(n) {
            return true;
        }
        self.visited.select_node(n);

        let graph = self.graph;
        for &e in &graph.incident[n] {
            if !self.selected.has_edge(e)
                || self.visited.has_edge(e)
                || self.is_parallel_to_visited(e)
            {
                continue;
            }
            self.visited.select_edge(e);

            let (first, second) = graph.ends[e];
            if n == first && self.visit(second) {
                self.found.positive.push(e);
                return true;
            }
            if n == second && self.visit(first) {
                self.found.negative.push(e);
                return true;
            }

            self.visited.remove_edge(e);
        }

        self.visited.remove_node(n);
        false
    }
}

/// Finds the loop closed by adding edge `candidate` to `tree`.
pub(crate) fn find_loop(graph: &Graph, tree: &SpanningTree, candidate: usize) -> Option<GraphLoop> {
    let mut selected = tree.selection.clone();
    selected.select_edge(candidate);
    let mut walk = Walk {
        graph,
        selected: &selected,
        visited: Selection::new(graph),
        found: GraphLoop::default(),
    };
    walk.visit(graph.ends[candidate].1);
    if walk.found.is_empty() {
        None
    } else {
        Some(walk.found)
    }
}

/// One entry per non-tree edge, in declaration order, pairing the edge with
/// its loop if one closes.
pub(crate) fn find_loops(graph: &Graph, tree: &SpanningTree) -> Vec<(usize, Option<GraphLoop>)> {
    (0..graph.edge_count())
        .filter(|&e| !tree.contains(e))
        .map(|e| (e, find_loop(graph, tree, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ast::{Edge, Node};
    use crate::ir::structural::spanning_tree::build;
    use crate::ir::structural::topology::Topology;

    fn topology(edges: &[(&str, &str, &str)]) -> Topology {
        let mut topology = Topology::new();
        for (alias, first, second) in edges {
            let node = |name: &str| {
                if name == "gnd" {
                    Node::ground(name)
                } else {
                    Node::new(name)
                }
            };
            topology.register_edge(&Edge::with_alias(&node(first), &node(second), alias));
        }
        topology
    }

    #[test]
    fn test_series_rc_loop() {
        let t = topology(&[
            ("V0", "gnd", "in"),
            ("R0", "in", "out"),
            ("C0", "out", "gnd"),
        ]);
        let graph = t.graph();
        let tree = build(&graph);
        let loops = find_loops(&graph, &tree);
        assert_eq!(loops.len(), 1);
        let (edge, found) = &loops[0];
        assert_eq!(*edge, 1);
        let found = found.as_ref().unwrap();
        assert!(found.positive.is_empty());
        assert_eq!(found.negative, [2, 0, 1]);
    }

    #[test]
    fn test_mixed_orientation() {
        let t = topology(&[("V0", "gnd", "a"), ("R0", "a", "b"), ("R1", "gnd", "b")]);
        let graph = t.graph();
        let tree = build(&graph);
        assert_eq!(tree.edges(), [0, 2]);
        let loops = find_loops(&graph, &tree);
        assert_eq!(loops.len(), 1);
        let found = loops[0].1.as_ref().unwrap();
        assert_eq!(found.positive, [2]);
        assert_eq!(found.negative, [0, 1]);
    }

    #[test]
    fn test_edge_parallel_to_tree_closes_no_loop() {
        let t = topology(&[("V0", "a", "gnd"), ("R0", "gnd", "a")]);
        let graph = t.graph();
        let tree = build(&graph);
        assert_eq!(tree.edges(), [0]);
        assert_eq!(find_loops(&graph, &tree), [(1, None)]);
    }

    #[test]
    fn test_self_loop_closes_on_itself() {
        let t = topology(&[("V0", "gnd", "a"), ("X0", "a", "a")]);
        let graph = t.graph();
        let tree = build(&graph);
        let loops = find_loops(&graph, &tree);
        let found = loops[0].1.as_ref().unwrap();
        assert_eq!(found.positive, [1]);
        assert!(found.negative.is_empty());
    }

    #[test]
    fn test_parallel_branch_closes_no_loop() {
        let t = topology(&[
            ("R0", "in", "out"),
            ("C0", "out", "gnd"),
            ("L0", "out", "gnd"),
            ("RL", "out", "gnd"),
            ("V0", "gnd", "in"),
        ]);
        let graph = t.graph();
        let tree = build(&graph);
        let loops = find_loops(&graph, &tree);
        let candidates: Vec<usize> = loops.iter().map(|(e, _)| *e).collect();
        assert_eq!(candidates, [0, 2, 3]);
        assert!(loops[0].1.is_some());
        assert!(loops[1].1.is_none());
        assert!(loops[2].1.is_none());
    }

    #[test]
    fn test_walk_is_deterministic() {
        let t = topology(&[
            ("V0", "gnd", "a"),
            ("R0", "a", "b"),
            ("R1", "b", "gnd"),
            ("R2", "a", "c"),
            ("R3", "c", "gnd"),
            ("R4", "b", "c"),
        ]);
        let graph = t.graph();
        let tree = build(&graph);
        let first = find_loops(&graph, &tree);
        let second = find_loops(&graph, &tree);
        assert_eq!(first, second);
        assert!(first.iter().all(|(_, found)| found.is_some()));
        assert_eq!(first.len(), 6 - (4 - 1));
    }
}
