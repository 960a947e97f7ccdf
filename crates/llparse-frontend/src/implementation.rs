//! Backend hooks.

use crate::code::{Code, CodeId, Transform, TransformId};
use crate::node::{Node, NodeId};

/// Builds backend payloads for the translated graph.
///
/// Each hook runs once per object in creation order, after the graph is fully
/// wired, so a hook always sees a node's final edges. Callbacks are
/// deduplicated first: `code` runs once per distinct callback.
///
/// The unit type is the no-op backend used when only the graph is wanted.
pub trait Implementation {
    type Node;
    type Code;
    type Transform;

    fn node(&mut self, id: NodeId, node: &Node) -> Self::Node;

    fn code(&mut self, id: CodeId, code: &Code) -> Self::Code;

    fn transform(&mut self, id: TransformId, transform: Transform) -> Self::Transform;
}

impl Implementation for () {
    type Node = ();
    type Code = ();
    type Transform = ();

    fn node(&mut self, _: NodeId, _: &Node) {}

    fn code(&mut self, _: CodeId, _: &Code) {}

    fn transform(&mut self, _: TransformId, _: Transform) {}
}
