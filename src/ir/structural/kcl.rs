//! Flow conservation at the non-ground nodes.

use super::topology::Graph;

/// Signed flows entering one node: `(edge, sign)` with `-1.0` when the node
/// is the edge's first endpoint and `+1.0` when it is the second.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NodeBalance {
    pub node: usize,
    pub terms: Vec<(usize, f64)>,
}

/// One balance per non-ground node, in node order, terms in edge order.
pub(crate) fn node_balances(graph: &Graph) -> Vec<NodeBalance> {
    (0..graph.node_count())
        .filter(|&n| !graph.ground[n])
        .map(|n| {
            let mut terms = Vec::new();
            for e in 0..graph.edge_count() {
                let (first, second) = graph.ends[e];
                if first == n {
                    terms.push((e, -1.0));
                } else if second == n {
                    terms.push((e, 1.0));
                }
            }
            NodeBalance { node: n, terms }
        })
        .collect()
}
