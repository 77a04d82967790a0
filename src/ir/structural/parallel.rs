//! Grouping of edges that join the same pair of nodes.

use serde::Serialize;

use super::topology::Graph;

/// Edges sharing one unordered node pair. The representative is the member
/// declared first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParallelGroup {
    pub representative: usize,
    pub others: Vec<usize>,
}

/// Groups with more than one member, ordered by representative.
pub(crate) fn find_parallel(graph: &Graph) -> Vec<ParallelGroup> {
    let mut grouped = vec![false; graph.edge_count()];
    let mut groups = Vec::new();
    for e in 0..graph.edge_count() {
        if grouped[e] {
            continue;
        }
        grouped[e] = true;
        let mut others = Vec::new();
        for other in (e + 1)..graph.edge_count() {
            if !grouped[other] && graph.is_parallel(e, other) {
                grouped[other] = true;
                others.push(other);
            }
        }
        if !others.is_empty() {
            groups.push(ParallelGroup {
                representative: e,
                others,
            });
        }
    }
    groups
}
