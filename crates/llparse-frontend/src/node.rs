//! Target node graph.
//!
//! Nodes are created first and wired afterwards, so the translator can hand
//! out a node's handle before its successors exist. [`Graph::finish`] checks
//! that the wiring is complete.

use crate::code::{Code, CodeId, Transform, TransformId};
use crate::identifier::UniqueName;
use crate::{Error, Result};

/// Handle of a node in a [`Graph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Default transition of a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Otherwise {
    pub node: NodeId,
    pub no_advance: bool,
    /// Value passed to the target, set only by trie leaves with a value.
    pub value: Option<i64>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct InvokeEdge {
    pub code: i32,
    pub node: NodeId,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SingleEdge {
    pub key: u8,
    pub no_advance: bool,
    pub node: NodeId,
    pub value: Option<i64>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SequenceEdge {
    pub node: NodeId,
    pub value: Option<i64>,
}

/// All bytes of one table entry lead to the same target.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TableEdge {
    pub keys: Vec<u8>,
    pub no_advance: bool,
    pub node: NodeId,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NodeKind {
    /// Match node without keyed edges; only follows its otherwise edge.
    Empty,
    Error {
        code: i32,
        reason: String,
    },
    Pause {
        code: i32,
        reason: String,
    },
    Consume {
        field: String,
    },
    SpanStart {
        field: usize,
        callback: CodeId,
    },
    SpanEnd {
        field: usize,
        callback: CodeId,
    },
    Invoke {
        code: CodeId,
        edges: Vec<InvokeEdge>,
    },
    Single {
        edges: Vec<SingleEdge>,
        transform: TransformId,
    },
    Sequence {
        select: Vec<u8>,
        edge: Option<SequenceEdge>,
        transform: TransformId,
    },
    TableLookup {
        edges: Vec<TableEdge>,
        transform: TransformId,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Error { .. } => "error",
            Self::Pause { .. } => "pause",
            Self::Consume { .. } => "consume",
            Self::SpanStart { .. } => "span_start",
            Self::SpanEnd { .. } => "span_end",
            Self::Invoke { .. } => "invoke",
            Self::Single { .. } => "single",
            Self::Sequence { .. } => "sequence",
            Self::TableLookup { .. } => "table",
        }
    }

    pub fn transform(&self) -> Option<TransformId> {
        match self {
            Self::Single { transform, .. }
            | Self::Sequence { transform, .. }
            | Self::TableLookup { transform, .. } => Some(*transform),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Node {
    pub id: UniqueName,
    pub kind: NodeKind,
    otherwise: Option<Otherwise>,
}

impl Node {
    pub fn new(id: UniqueName, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            otherwise: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }

    pub fn otherwise(&self) -> Option<&Otherwise> {
        self.otherwise.as_ref()
    }

    pub fn set_otherwise(&mut self, node: NodeId, no_advance: bool, value: Option<i64>) {
        self.otherwise = Some(Otherwise {
            node,
            no_advance,
            value,
        });
    }

    /// # Panics
    /// If this is not an `Invoke` node.
    pub fn add_invoke_edge(&mut self, edge: InvokeEdge) {
        match &mut self.kind {
            NodeKind::Invoke { edges, .. } => edges.push(edge),
            _ => self.wrong_kind("add_invoke_edge"),
        }
    }

    /// # Panics
    /// If this is not a `Single` node.
    pub fn add_single_edge(&mut self, edge: SingleEdge) {
        match &mut self.kind {
            NodeKind::Single { edges, .. } => edges.push(edge),
            _ => self.wrong_kind("add_single_edge"),
        }
    }

    /// # Panics
    /// If this is not a `TableLookup` node.
    pub fn add_table_edge(&mut self, edge: TableEdge) {
        match &mut self.kind {
            NodeKind::TableLookup { edges, .. } => edges.push(edge),
            _ => self.wrong_kind("add_table_edge"),
        }
    }

    /// # Panics
    /// If this is not a `Sequence` node.
    pub fn set_sequence_edge(&mut self, node: NodeId, value: Option<i64>) {
        match &mut self.kind {
            NodeKind::Sequence { edge, .. } => *edge = Some(SequenceEdge { node, value }),
            _ => self.wrong_kind("set_sequence_edge"),
        }
    }

    /// Every successor: the otherwise target first, then keyed edges in order.
    pub fn all_edges(&self) -> impl Iterator<Item = NodeId> + '_ {
        let keyed: Box<dyn Iterator<Item = NodeId> + '_> = match &self.kind {
            NodeKind::Invoke { edges, .. } => Box::new(edges.iter().map(|e| e.node)),
            NodeKind::Single { edges, .. } => Box::new(edges.iter().map(|e| e.node)),
            NodeKind::TableLookup { edges, .. } => Box::new(edges.iter().map(|e| e.node)),
            NodeKind::Sequence { edge, .. } => Box::new(edge.iter().map(|e| e.node)),
            _ => Box::new(std::iter::empty()),
        };
        self.otherwise.iter().map(|o| o.node).chain(keyed)
    }

    /// Mutable view of [`Node::all_edges`], in the same order.
    pub fn all_edges_mut(&mut self) -> impl Iterator<Item = &mut NodeId> + '_ {
        let Self {
            kind, otherwise, ..
        } = self;
        let keyed: Box<dyn Iterator<Item = &mut NodeId> + '_> = match kind {
            NodeKind::Invoke { edges, .. } => Box::new(edges.iter_mut().map(|e| &mut e.node)),
            NodeKind::Single { edges, .. } => Box::new(edges.iter_mut().map(|e| &mut e.node)),
            NodeKind::TableLookup { edges, .. } => {
                Box::new(edges.iter_mut().map(|e| &mut e.node))
            }
            NodeKind::Sequence { edge, .. } => Box::new(edge.iter_mut().map(|e| &mut e.node)),
            _ => Box::new(std::iter::empty()),
        };
        otherwise.iter_mut().map(|o| &mut o.node).chain(keyed)
    }

    fn unfinished(&self) -> bool {
        match &self.kind {
            NodeKind::Error { .. } => false,
            NodeKind::Sequence { edge: None, .. } => true,
            _ => self.otherwise.is_none(),
        }
    }
}

/// Arena of translated nodes, callbacks and transforms.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    codes: Vec<Code>,
    transforms: Vec<Transform>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn add_code(&mut self, code: Code) -> CodeId {
        let id = CodeId(self.codes.len() as u32);
        self.codes.push(code);
        id
    }

    pub fn code(&self, id: CodeId) -> &Code {
        &self.codes[id.index()]
    }

    pub fn add_transform(&mut self, transform: Transform) -> TransformId {
        let id = TransformId(self.transforms.len() as u32);
        self.transforms.push(transform);
        id
    }

    pub fn transform(&self, id: TransformId) -> Transform {
        self.transforms[id.index()]
    }

    /// Number of nodes, reachable or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }

    pub fn codes(&self) -> impl Iterator<Item = (CodeId, &Code)> {
        self.codes
            .iter()
            .enumerate()
            .map(|(i, c)| (CodeId(i as u32), c))
    }

    pub fn transforms(&self) -> impl Iterator<Item = (TransformId, Transform)> + '_ {
        self.transforms
            .iter()
            .enumerate()
            .map(|(i, t)| (TransformId(i as u32), *t))
    }

    /// Check that every node received the edges its kind requires.
    ///
    /// Every node except `Error` needs an otherwise edge, and a `Sequence`
    /// needs the edge taken after its bytes match.
    pub fn finish(&self) -> Result<()> {
        match self.nodes.iter().find(|n| n.unfinished()) {
            Some(node) => Err(Error::UnfinishedNode {
                node: node.id.name.clone(),
            }),
            None => Ok(()),
        }
    }
}
