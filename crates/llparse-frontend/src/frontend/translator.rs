//! Memoized translation of source nodes.

use std::collections::HashMap;

use indexmap::IndexMap;
use llparse_core::{NodeRef, SourceGraph, SourceKind, SourceNode, SpanRef};

use crate::code::{CacheKey, CodeId, Transform, TransformId};
use crate::identifier::Identifier;
use crate::node::{Graph, InvokeEdge, Node, NodeId, NodeKind, SingleEdge};
use crate::options::FrontendOptions;
use crate::trie::{Trie, TrieNode, TrieSequence, TrieSingle};
use crate::{Error, Result};

use super::SpanField;

/// Translation state of one compilation.
///
/// `map` receives a source node's entry before its successors are
/// translated, so a cycle back to the node finds the entry and stops.
pub(crate) struct Translator<'a> {
    pub(super) source: &'a SourceGraph,
    pub(super) options: FrontendOptions,
    pub(super) graph: Graph,
    pub(super) node_ids: Identifier,
    pub(super) code_ids: Identifier,
    pub(super) map: HashMap<NodeRef, NodeId>,
    pub(super) span_map: HashMap<SpanRef, usize>,
    pub(super) spans: Vec<SpanField>,
    pub(super) code_cache: IndexMap<CacheKey, CodeId>,
    pub(super) transform_cache: IndexMap<Transform, TransformId>,
}

/// The source match node a trie is being translated for.
#[derive(Clone, Copy)]
pub(super) struct MatchCtx<'a> {
    pub(super) node: NodeRef,
    pub(super) name: &'a str,
    pub(super) transform: TransformId,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(source: &'a SourceGraph, prefix: &str, options: FrontendOptions) -> Self {
        Self {
            source,
            options,
            graph: Graph::new(),
            node_ids: Identifier::new(format!("{prefix}__n_")),
            code_ids: Identifier::new(format!("{prefix}__c_")),
            map: HashMap::new(),
            span_map: HashMap::new(),
            spans: Vec::new(),
            code_cache: IndexMap::new(),
            transform_cache: IndexMap::new(),
        }
    }

    pub(crate) fn into_parts(self) -> (Graph, Vec<SpanField>) {
        (self.graph, self.spans)
    }

    pub(crate) fn translate(&mut self, node: NodeRef) -> Result<NodeId> {
        if let Some(&id) = self.map.get(&node) {
            return Ok(id);
        }

        let graph = self.source;
        let source = graph.node(node);
        if !source.is_error() && source.otherwise().is_none() {
            return Err(Error::MissingOtherwise {
                node: source.name.clone(),
            });
        }

        let kind = match &source.kind {
            SourceKind::Match { transform } => {
                let transform = self.translate_transform(source, transform.as_ref())?;
                return self.translate_match(node, source, transform);
            }
            SourceKind::Error { code, reason } => NodeKind::Error {
                code: *code,
                reason: reason.clone(),
            },
            SourceKind::Pause { code, reason } => NodeKind::Pause {
                code: *code,
                reason: reason.clone(),
            },
            SourceKind::Consume { field } => NodeKind::Consume {
                field: field.clone(),
            },
            SourceKind::SpanStart { span } => {
                let (field, callback) = self.span_parts(source, *span)?;
                NodeKind::SpanStart { field, callback }
            }
            SourceKind::SpanEnd { span } => {
                let (field, callback) = self.span_parts(source, *span)?;
                NodeKind::SpanEnd { field, callback }
            }
            SourceKind::Invoke { code } => NodeKind::Invoke {
                code: self.translate_invoke_code(source, *code)?,
                edges: Vec::new(),
            },
        };

        let id = self.add_node(&source.name, kind);
        self.map.insert(node, id);

        if let Some(otherwise) = source.otherwise() {
            let next = self.translate(otherwise.node)?;
            self.graph
                .node_mut(id)
                .set_otherwise(next, otherwise.no_advance, None);
        }

        for edge in source.edges() {
            let Some(code) = edge.code() else {
                continue;
            };
            let next = self.translate(edge.node)?;
            self.graph
                .node_mut(id)
                .add_invoke_edge(InvokeEdge { code, node: next });
        }

        Ok(id)
    }

    /// Translate a match node into its trie of target nodes.
    ///
    /// Every trie node without an otherwise edge of its own falls back to
    /// the source node's otherwise edge.
    fn translate_match(
        &mut self,
        node: NodeRef,
        source: &'a SourceNode,
        transform: TransformId,
    ) -> Result<NodeId> {
        let ctx = MatchCtx {
            node,
            name: &source.name,
            transform,
        };

        let mut children = Vec::new();
        let root = match Trie::new(&source.name).build(source.edges())? {
            Some(trie) => self.translate_trie(ctx, &trie, &mut children)?,
            None => self.add_match_node(ctx, NodeKind::Empty, &mut children),
        };

        let Some(otherwise) = source.otherwise() else {
            return Err(Error::MissingOtherwise {
                node: source.name.clone(),
            });
        };

        let mut next = None;
        for child in children {
            if self.graph.node(child).otherwise().is_some() {
                continue;
            }
            let target = match next {
                Some(target) => target,
                None => *next.insert(self.translate(otherwise.node)?),
            };
            self.graph
                .node_mut(child)
                .set_otherwise(target, otherwise.no_advance, None);
        }

        Ok(root)
    }

    pub(super) fn translate_trie(
        &mut self,
        ctx: MatchCtx<'a>,
        trie: &TrieNode,
        children: &mut Vec<NodeId>,
    ) -> Result<NodeId> {
        match trie {
            TrieNode::Empty(empty) => self.translate(empty.node),
            TrieNode::Single(single) => self.translate_single(ctx, single, children),
            TrieNode::Sequence(sequence) => self.translate_sequence(ctx, sequence, children),
        }
    }

    fn translate_single(
        &mut self,
        ctx: MatchCtx<'a>,
        single: &TrieSingle,
        children: &mut Vec<NodeId>,
    ) -> Result<NodeId> {
        if let Some(table) = self.maybe_table_lookup(ctx, single, children)? {
            return Ok(table);
        }

        let kind = NodeKind::Single {
            edges: Vec::new(),
            transform: ctx.transform,
        };
        let id = self.add_match_node(ctx, kind, children);

        for child in &single.children {
            let next = self.translate_trie(ctx, &child.node, children)?;
            self.graph.node_mut(id).add_single_edge(SingleEdge {
                key: child.key,
                no_advance: child.no_advance,
                node: next,
                value: child.node.value(),
            });
        }

        if let Some(otherwise) = &single.otherwise {
            let next = self.translate(otherwise.node)?;
            self.graph
                .node_mut(id)
                .set_otherwise(next, true, otherwise.value);
        }

        Ok(id)
    }

    fn translate_sequence(
        &mut self,
        ctx: MatchCtx<'a>,
        sequence: &TrieSequence,
        children: &mut Vec<NodeId>,
    ) -> Result<NodeId> {
        let kind = NodeKind::Sequence {
            select: sequence.select.clone(),
            edge: None,
            transform: ctx.transform,
        };
        let id = self.add_match_node(ctx, kind, children);

        let next = self.translate_trie(ctx, &sequence.child, children)?;
        self.graph
            .node_mut(id)
            .set_sequence_edge(next, sequence.child.value());

        Ok(id)
    }

    fn add_node(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = self.node_ids.id(name);
        self.graph.add_node(Node::new(id, kind))
    }

    /// Create a trie node. The first one created stands for the source node.
    pub(super) fn add_match_node(
        &mut self,
        ctx: MatchCtx<'a>,
        kind: NodeKind,
        children: &mut Vec<NodeId>,
    ) -> NodeId {
        let id = self.add_node(ctx.name, kind);
        children.push(id);
        self.map.entry(ctx.node).or_insert(id);
        id
    }
}
