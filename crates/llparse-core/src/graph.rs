//! Arena-backed source graph and its builder API.
//!
//! Nodes, spans and callbacks live in flat vectors and are referenced by
//! `Copy` handles, so cycles in the parser description never turn into
//! ownership cycles.

use crate::code::{Code, CodeKind, MulAddOptions, Property, PropertyType, Signature};
use crate::{GraphError, Result};

/// Handle of a node in a [`SourceGraph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeRef(u32);

impl NodeRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Create a handle from a raw index. Use only for tests and debugging.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }
}

/// Handle of a span in a [`SourceGraph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SpanRef(u32);

impl SpanRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a callback in a [`SourceGraph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CodeRef(u32);

impl CodeRef {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Byte normalization applied by a match node before comparing input.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Transform {
    pub name: String,
}

impl Transform {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// ASCII lowercasing that assumes the input is alphabetic.
    pub fn to_lower_unsafe() -> Self {
        Self::new("to_lower_unsafe")
    }
}

/// What a source node does when control reaches it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SourceKind {
    /// Stop parsing with an error code.
    Error { code: i32, reason: String },
    /// Suspend parsing; resuming continues at the otherwise edge.
    Pause { code: i32, reason: String },
    /// Skip the number of bytes stored in `field`.
    Consume { field: String },
    SpanStart { span: SpanRef },
    SpanEnd { span: SpanRef },
    /// Run a callback and branch on its return code.
    Invoke { code: CodeRef },
    /// Branch on the next input bytes.
    Match { transform: Option<Transform> },
}

/// Key of a keyed edge.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum EdgeKey {
    /// Byte sequence matched by a `Match` node.
    Bytes(Vec<u8>),
    /// Return code of an `Invoke` node's callback.
    Code(i32),
}

impl EdgeKey {
    fn describe(&self) -> String {
        match self {
            Self::Bytes(bytes) => bytes.escape_ascii().to_string(),
            Self::Code(code) => code.to_string(),
        }
    }
}

/// Keyed transition out of a node.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Edge {
    pub key: EdgeKey,
    /// Taking this edge leaves the input cursor in place.
    pub no_advance: bool,
    pub node: NodeRef,
    /// Value passed along to the target (used by `select`).
    pub value: Option<i64>,
}

impl Edge {
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.key {
            EdgeKey::Bytes(bytes) => Some(bytes),
            EdgeKey::Code(_) => None,
        }
    }

    pub fn code(&self) -> Option<i32> {
        match self.key {
            EdgeKey::Code(code) => Some(code),
            EdgeKey::Bytes(_) => None,
        }
    }
}

/// Default transition taken when no keyed edge applies.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct OtherwiseEdge {
    pub node: NodeRef,
    pub no_advance: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SourceNode {
    pub name: String,
    pub kind: SourceKind,
    edges: Vec<Edge>,
    otherwise: Option<OtherwiseEdge>,
}

impl SourceNode {
    fn new(name: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            edges: Vec::new(),
            otherwise: None,
        }
    }

    /// Keyed edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn otherwise(&self) -> Option<&OtherwiseEdge> {
        self.otherwise.as_ref()
    }

    /// Every node this node can transfer control to: keyed edges first.
    pub fn successors(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.edges
            .iter()
            .map(|e| e.node)
            .chain(self.otherwise.map(|o| o.node))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, SourceKind::Error { .. })
    }
}

/// A capture region. Its callback is invoked with the captured bytes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Span {
    pub callback: CodeRef,
}

/// Parser description: nodes, spans, callbacks and state properties.
#[derive(Clone, Debug, Default)]
pub struct SourceGraph {
    nodes: Vec<SourceNode>,
    spans: Vec<Span>,
    codes: Vec<Code>,
    properties: Vec<Property>,
}

impl SourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, node: NodeRef) -> &SourceNode {
        &self.nodes[node.index()]
    }

    pub fn span(&self, span: SpanRef) -> &Span {
        &self.spans[span.index()]
    }

    pub fn code(&self, code: CodeRef) -> &Code {
        &self.codes[code.index()]
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Nodes
    // ─────────────────────────────────────────────────────────────────────

    fn add_node(&mut self, node: SourceNode) -> NodeRef {
        let id = NodeRef(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a match node.
    pub fn match_node(&mut self, name: impl Into<String>) -> NodeRef {
        self.add_node(SourceNode::new(name, SourceKind::Match { transform: None }))
    }

    pub fn error(&mut self, code: i32, reason: impl Into<String>) -> NodeRef {
        let kind = SourceKind::Error {
            code,
            reason: reason.into(),
        };
        self.add_node(SourceNode::new("error", kind))
    }

    pub fn pause(&mut self, code: i32, reason: impl Into<String>) -> NodeRef {
        let kind = SourceKind::Pause {
            code,
            reason: reason.into(),
        };
        self.add_node(SourceNode::new("pause", kind))
    }

    pub fn consume(&mut self, field: impl Into<String>) -> NodeRef {
        let field = field.into();
        let name = format!("consume_{field}");
        self.add_node(SourceNode::new(name, SourceKind::Consume { field }))
    }

    /// Create an invoke node branching on the callback's return code.
    pub fn invoke(&mut self, code: CodeRef, map: &[(i32, NodeRef)]) -> Result<NodeRef> {
        let name = format!("invoke_{}", self.code(code).name);
        let node = self.add_node(SourceNode::new(name, SourceKind::Invoke { code }));
        for &(key, next) in map {
            self.push_edge(node, EdgeKey::Code(key), true, next, None)?;
        }
        Ok(node)
    }

    /// Declare a span captured by `callback`.
    pub fn new_span(&mut self, callback: CodeRef) -> Result<SpanRef> {
        self.expect_signature(callback, Signature::Span)?;
        let span = SpanRef(self.spans.len() as u32);
        self.spans.push(Span { callback });
        Ok(span)
    }

    pub fn span_start(&mut self, span: SpanRef) -> NodeRef {
        let name = format!("span_start_{}", self.span_callback_name(span));
        self.add_node(SourceNode::new(name, SourceKind::SpanStart { span }))
    }

    pub fn span_end(&mut self, span: SpanRef) -> NodeRef {
        let name = format!("span_end_{}", self.span_callback_name(span));
        self.add_node(SourceNode::new(name, SourceKind::SpanEnd { span }))
    }

    fn span_callback_name(&self, span: SpanRef) -> &str {
        &self.code(self.span(span).callback).name
    }

    // ─────────────────────────────────────────────────────────────────────
    // Callbacks and properties
    // ─────────────────────────────────────────────────────────────────────

    pub fn add_code(&mut self, code: Code) -> CodeRef {
        let id = CodeRef(self.codes.len() as u32);
        self.codes.push(code);
        id
    }

    pub fn is_equal(&mut self, name: &str, field: &str, value: i64) -> CodeRef {
        let field = field.to_owned();
        self.add_code(Code::new(name, CodeKind::IsEqual { field, value }))
    }

    pub fn load(&mut self, name: &str, field: &str) -> CodeRef {
        let field = field.to_owned();
        self.add_code(Code::new(name, CodeKind::Load { field }))
    }

    pub fn mul_add(&mut self, name: &str, field: &str, options: MulAddOptions) -> CodeRef {
        let field = field.to_owned();
        self.add_code(Code::new(name, CodeKind::MulAdd { field, options }))
    }

    pub fn or(&mut self, name: &str, field: &str, value: i64) -> CodeRef {
        let field = field.to_owned();
        self.add_code(Code::new(name, CodeKind::Or { field, value }))
    }

    pub fn store(&mut self, name: &str, field: &str) -> CodeRef {
        let field = field.to_owned();
        self.add_code(Code::new(name, CodeKind::Store { field }))
    }

    pub fn test(&mut self, name: &str, field: &str, value: i64) -> CodeRef {
        let field = field.to_owned();
        self.add_code(Code::new(name, CodeKind::Test { field, value }))
    }

    pub fn update(&mut self, name: &str, field: &str, value: i64) -> CodeRef {
        let field = field.to_owned();
        self.add_code(Code::new(name, CodeKind::Update { field, value }))
    }

    /// User callback returning an integer.
    pub fn match_cb(&mut self, name: &str) -> CodeRef {
        self.add_code(Code::new(name, CodeKind::Match))
    }

    /// User callback receiving a matched value.
    pub fn value_cb(&mut self, name: &str) -> CodeRef {
        self.add_code(Code::new(name, CodeKind::Value))
    }

    /// User callback receiving span data.
    pub fn span_cb(&mut self, name: &str) -> CodeRef {
        self.add_code(Code::new(name, CodeKind::Span))
    }

    pub fn property(&mut self, ty: PropertyType, name: impl Into<String>) {
        self.properties.push(Property::new(ty, name));
    }

    fn expect_signature(&self, code: CodeRef, expected: Signature) -> Result<()> {
        let code = self.code(code);
        let signature = code.signature();
        if signature != expected {
            return Err(GraphError::WrongSignature {
                code: code.name.clone(),
                signature,
                expected,
            });
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Edges
    // ─────────────────────────────────────────────────────────────────────

    /// Match `key` and advance past it.
    pub fn match_bytes(
        &mut self,
        node: NodeRef,
        key: impl AsRef<[u8]>,
        next: NodeRef,
    ) -> Result<()> {
        self.push_match_edge(node, key.as_ref(), false, next, None)
    }

    /// Match a single byte without consuming it.
    pub fn peek(&mut self, node: NodeRef, byte: u8, next: NodeRef) -> Result<()> {
        self.push_match_edge(node, &[byte], true, next, None)
    }

    /// Match `key`, advance past it, and pass `value` to the target.
    pub fn select(
        &mut self,
        node: NodeRef,
        key: impl AsRef<[u8]>,
        value: i64,
        next: NodeRef,
    ) -> Result<()> {
        self.push_match_edge(node, key.as_ref(), false, next, Some(value))
    }

    /// Fall through to `next` without consuming input.
    pub fn otherwise(&mut self, node: NodeRef, next: NodeRef) -> Result<()> {
        self.set_otherwise(node, next, true)
    }

    /// Consume one byte and continue at `next`.
    pub fn skip_to(&mut self, node: NodeRef, next: NodeRef) -> Result<()> {
        self.set_otherwise(node, next, false)
    }

    pub fn set_transform(&mut self, node: NodeRef, transform: Transform) -> Result<()> {
        let target = &mut self.nodes[node.index()];
        match &mut target.kind {
            SourceKind::Match { transform: slot } => {
                *slot = Some(transform);
                Ok(())
            }
            _ => Err(GraphError::TransformOnNonMatch {
                node: target.name.clone(),
            }),
        }
    }

    fn set_otherwise(&mut self, node: NodeRef, next: NodeRef, no_advance: bool) -> Result<()> {
        let target = &mut self.nodes[node.index()];
        if target.is_error() {
            return Err(GraphError::TerminalOtherwise {
                node: target.name.clone(),
            });
        }
        if target.otherwise.is_some() {
            return Err(GraphError::DuplicateOtherwise {
                node: target.name.clone(),
            });
        }
        target.otherwise = Some(OtherwiseEdge {
            node: next,
            no_advance,
        });
        Ok(())
    }

    fn push_match_edge(
        &mut self,
        node: NodeRef,
        key: &[u8],
        no_advance: bool,
        next: NodeRef,
        value: Option<i64>,
    ) -> Result<()> {
        let target = &self.nodes[node.index()];
        if !matches!(target.kind, SourceKind::Match { .. }) {
            return Err(GraphError::EdgesNotAllowed {
                node: target.name.clone(),
            });
        }
        if key.is_empty() {
            return Err(GraphError::EmptyKey {
                node: target.name.clone(),
            });
        }
        if no_advance && key.len() != 1 {
            return Err(GraphError::MultiBytePeek {
                node: target.name.clone(),
            });
        }
        self.push_edge(node, EdgeKey::Bytes(key.to_vec()), no_advance, next, value)
    }

    fn push_edge(
        &mut self,
        node: NodeRef,
        key: EdgeKey,
        no_advance: bool,
        next: NodeRef,
        value: Option<i64>,
    ) -> Result<()> {
        let target = &mut self.nodes[node.index()];
        if target.edges.iter().any(|e| e.key == key) {
            return Err(GraphError::DuplicateKey {
                node: target.name.clone(),
                key: key.describe(),
            });
        }
        target.edges.push(Edge {
            key,
            no_advance,
            node: next,
            value,
        });
        Ok(())
    }
}
