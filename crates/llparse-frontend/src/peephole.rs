//! Peephole pass over the translated graph.
//!
//! An `Empty` node whose otherwise edge does not advance only forwards
//! control, so every edge into it can point at its target instead.

use std::collections::HashSet;

use crate::enumerate::enumerate;
use crate::node::{Graph, NodeId, NodeKind};

/// Redirect edges past pass-through `Empty` nodes. Returns the new root.
pub fn optimize(graph: &mut Graph, root: NodeId) -> NodeId {
    let mut redirected = 0usize;

    for id in enumerate(graph, root) {
        let targets: Vec<_> = graph
            .node(id)
            .all_edges()
            .map(|target| see_through(graph, target))
            .collect();

        for (slot, target) in graph.node_mut(id).all_edges_mut().zip(targets) {
            if *slot != target {
                *slot = target;
                redirected += 1;
            }
        }
    }

    let new_root = see_through(graph, root);
    log::debug!(
        "peephole redirected {redirected} edges, root {}",
        graph.node(new_root).name()
    );
    new_root
}

/// Follow pass-through `Empty` nodes starting at `start`.
///
/// Returns `start` itself if the chain loops.
fn see_through(graph: &Graph, start: NodeId) -> NodeId {
    let mut current = start;
    let mut visited = HashSet::new();

    loop {
        if !visited.insert(current) {
            return start;
        }

        let node = graph.node(current);
        let (NodeKind::Empty, Some(otherwise)) = (&node.kind, node.otherwise()) else {
            return current;
        };
        if !otherwise.no_advance {
            return current;
        }
        current = otherwise.node;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Transform;
    use crate::identifier::Identifier;
    use crate::node::{Node, SingleEdge};

    struct Builder {
        graph: Graph,
        ids: Identifier,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                graph: Graph::new(),
                ids: Identifier::new(""),
            }
        }

        fn add(&mut self, name: &str, kind: NodeKind) -> NodeId {
            let id = self.ids.id(name);
            self.graph.add_node(Node::new(id, kind))
        }

        fn link(&mut self, from: NodeId, to: NodeId, no_advance: bool) {
            self.graph.node_mut(from).set_otherwise(to, no_advance, None);
        }
    }

    fn error() -> NodeKind {
        NodeKind::Error {
            code: 1,
            reason: "done".into(),
        }
    }

    #[test]
    fn skips_empty_chain() {
        let mut b = Builder::new();
        let transform = b.graph.add_transform(Transform::Id);
        let start = b.add(
            "start",
            NodeKind::Single {
                edges: Vec::new(),
                transform,
            },
        );
        let e1 = b.add("e1", NodeKind::Empty);
        let e2 = b.add("e2", NodeKind::Empty);
        let end = b.add("end", error());
        b.graph.node_mut(start).add_single_edge(SingleEdge {
            key: b'a',
            no_advance: false,
            node: e1,
            value: None,
        });
        b.link(start, end, true);
        b.link(e1, e2, true);
        b.link(e2, end, true);

        let root = optimize(&mut b.graph, start);

        assert_eq!(root, start);
        let targets: Vec<_> = b.graph.node(start).all_edges().collect();
        assert_eq!(targets, vec![end, end]);
    }

    #[test]
    fn advancing_empty_is_kept() {
        let mut b = Builder::new();
        let start = b.add("start", NodeKind::Empty);
        let skip = b.add("skip", NodeKind::Empty);
        let end = b.add("end", error());
        b.link(start, skip, true);
        b.link(skip, end, false);

        let root = optimize(&mut b.graph, start);

        assert_eq!(root, skip);
        assert_eq!(b.graph.node(skip).otherwise().unwrap().node, end);
    }

    #[test]
    fn root_moves_past_empty() {
        let mut b = Builder::new();
        let start = b.add("start", NodeKind::Empty);
        let end = b.add("end", error());
        b.link(start, end, true);

        assert_eq!(optimize(&mut b.graph, start), end);
    }

    #[test]
    fn empty_loop_is_left_alone() {
        let mut b = Builder::new();
        let a = b.add("a", NodeKind::Empty);
        let c = b.add("c", NodeKind::Empty);
        b.link(a, c, true);
        b.link(c, a, true);

        let root = optimize(&mut b.graph, a);

        assert_eq!(root, a);
        assert_eq!(b.graph.node(a).otherwise().unwrap().node, c);
        assert_eq!(b.graph.node(c).otherwise().unwrap().node, a);
    }
}
