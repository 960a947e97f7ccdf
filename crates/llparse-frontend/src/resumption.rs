//! Resumption targets of the translated graph.

use indexmap::IndexSet;

use crate::node::{Graph, NodeId, NodeKind};

/// Nodes generated code can resume at, in discovery order.
///
/// Nodes that read input suspend when the buffer runs out. A `SpanStart`
/// records the current position, so it is entered with input available.
/// `Empty` nodes left by the peephole pass advance before moving on. `Pause`
/// and `SpanEnd` return to the caller and continue at their otherwise target.
pub(crate) fn targets(graph: &Graph, root: NodeId, nodes: &[NodeId]) -> IndexSet<NodeId> {
    let mut targets = IndexSet::new();
    targets.insert(root);

    for &id in nodes {
        let node = graph.node(id);
        match node.kind {
            NodeKind::Consume { .. }
            | NodeKind::Empty
            | NodeKind::SpanStart { .. }
            | NodeKind::Single { .. }
            | NodeKind::Sequence { .. }
            | NodeKind::TableLookup { .. } => {
                targets.insert(id);
            }
            NodeKind::Pause { .. } | NodeKind::SpanEnd { .. } => {
                if let Some(otherwise) = node.otherwise() {
                    targets.insert(otherwise.node);
                }
            }
            NodeKind::Error { .. } | NodeKind::Invoke { .. } => {}
        }
    }

    targets
}
