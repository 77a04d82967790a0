//! Structural analysis of a circuit topology.
//!
//! `analyze` turns a registered topology into the equations the element
//! relations alone cannot provide: one potential law per fundamental loop,
//! one potential equality per extra parallel edge and one flow law per
//! non-ground node. Malformed topologies never abort the analysis; they are
//! reported as `Diagnostic`s next to whatever equations could be derived.

pub mod kcl;
pub mod loops;
pub mod parallel;
pub mod spanning_tree;
pub mod topology;

use std::fmt;

use serde::Serialize;

use crate::ir::ast::{eq, neg, Edge, EquationSet, Expr};
use crate::ir::context::SynthesisContext;

pub use loops::GraphLoop;
pub use parallel::ParallelGroup;
pub use spanning_tree::SpanningTree;
pub use topology::Topology;

/// A non-fatal structural problem.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Diagnostic {
    /// The tree does not reach every node, so some potentials stay
    /// unconstrained.
    SpanningTreeShortfall { selected: usize, expected: usize },
    /// Adding this non-tree edge to the tree closes no loop.
    LoopNotClosed { edge: String },
    /// A non-ground node without any connected edge.
    IsolatedNode { node: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SpanningTreeShortfall { selected, expected } => write!(
                f,
                "spanning tree has {} edges, expected {}",
                selected, expected
            ),
            Diagnostic::LoopNotClosed { edge } => {
                write!(f, "edge '{}' closes no loop with the spanning tree", edge)
            }
            Diagnostic::IsolatedNode { node } => {
                write!(f, "node '{}' has no connected edges", node)
            }
        }
    }
}

/// Result of analyzing a topology.
#[derive(Clone, Debug)]
pub struct StructuralAnalysis {
    pub tree: SpanningTree,
    /// Non-tree edges in declaration order with the loop each one closes.
    pub loops: Vec<(usize, Option<GraphLoop>)>,
    pub parallel: Vec<ParallelGroup>,
    /// Loop equations followed by parallel equalities.
    pub kvl: EquationSet,
    pub kcl: EquationSet,
    pub diagnostics: Vec<Diagnostic>,
}

impl StructuralAnalysis {
    /// Tree edges in selection order.
    pub fn tree_edges<'a>(&'a self, topology: &'a Topology) -> impl Iterator<Item = &'a Edge> + 'a {
        self.tree
            .edges()
            .iter()
            .filter_map(move |&e| topology.edges().get_index(e))
    }
}

fn edge_at(topology: &Topology, e: usize) -> &Edge {
    &topology.edges()[e]
}

/// Derives loop, parallel and flow equations for `topology`.
///
/// Potential and flow symbols are interned in `ctx`.
pub fn analyze(topology: &Topology, ctx: &mut SynthesisContext) -> StructuralAnalysis {
    let graph = topology.graph();
    let mut diagnostics = Vec::new();

    let tree = spanning_tree::build(&graph);
    if !tree.is_complete() {
        diagnostics.push(Diagnostic::SpanningTreeShortfall {
            selected: tree.len(),
            expected: tree.expected(),
        });
    }

    let loops = loops::find_loops(&graph, &tree);
    let mut kvl = EquationSet::new();
    for (e, found) in &loops {
        match found {
            Some(found) => {
                let positive: Vec<Expr> = found
                    .positive
                    .iter()
                    .map(|&p| Expr::from(ctx.potential(edge_at(topology, p))))
                    .collect();
                let negative: Vec<Expr> = found
                    .negative
                    .iter()
                    .map(|&n| neg(ctx.potential(edge_at(topology, n))))
                    .collect();
                kvl.push(eq(Expr::sum(positive.into_iter().chain(negative)), 0.0));
            }
            None => diagnostics.push(Diagnostic::LoopNotClosed {
                edge: edge_at(topology, *e).alias().to_string(),
            }),
        }
    }

    let parallel = parallel::find_parallel(&graph);
    for group in &parallel {
        let representative = ctx.potential(edge_at(topology, group.representative));
        for &other in &group.others {
            kvl.push(eq(&representative, ctx.potential(edge_at(topology, other))));
        }
    }

    let mut kcl = EquationSet::new();
    for balance in kcl::node_balances(&graph) {
        if balance.terms.is_empty() {
            diagnostics.push(Diagnostic::IsolatedNode {
                node: topology.nodes()[balance.node].name().to_string(),
            });
            continue;
        }
        let flows: Vec<Expr> = balance
            .terms
            .iter()
            .map(|&(e, sign)| {
                let flow = Expr::from(ctx.flow(edge_at(topology, e)));
                if sign < 0.0 {
                    neg(flow)
                } else {
                    flow
                }
            })
            .collect();
        kcl.push(eq(Expr::sum(flows), 0.0));
    }

    for diagnostic in &diagnostics {
        log::warn!("{}", diagnostic);
    }

    StructuralAnalysis {
        tree,
        loops,
        parallel,
        kvl,
        kcl,
        diagnostics,
    }
}
