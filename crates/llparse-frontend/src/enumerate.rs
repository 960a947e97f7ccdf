//! Reachable node enumeration.

use std::collections::HashSet;

use crate::node::{Graph, NodeId};

/// Nodes reachable from `root`, root first, in depth-first preorder.
pub fn enumerate(graph: &Graph, root: NodeId) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);

        let successors: Vec<_> = graph.node(id).all_edges().collect();
        stack.extend(successors.into_iter().rev());
    }

    order
}
