//! Source graph translation.
//!
//! [`Frontend::compile`] runs the whole pipeline:
//! 1. span allocation, then one field per concurrency group
//! 2. depth-first translation from the root
//! 3. wiring check ([`Graph::finish`])
//! 4. peephole pass and resumption target collection
//! 5. backend hooks of the [`Implementation`]
//!
//! # Module Organization
//!
//! - `translator`: memoized graph walk, trie expansion of match nodes
//! - `table`: lookup table optimization of single-byte branches
//! - `code`: callback and transform translation with deduplication
//! - `spans`: span field assignment

mod code;
mod spans;
mod table;
mod translator;

#[cfg(test)]
mod translator_tests;

use indexmap::IndexSet;
use llparse_core::{NodeRef, Property, ReachabilitySpanAllocator, SourceGraph, SpanAllocator};

use crate::code::CodeId;
use crate::enumerate::enumerate;
use crate::implementation::Implementation;
use crate::node::{Graph, NodeId};
use crate::options::FrontendOptions;
use crate::{Result, peephole, resumption};

pub(crate) use translator::Translator;

/// Storage shared by spans that are never open at the same time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct SpanField {
    pub index: usize,
    /// Callback of every span stored in this field, in allocation order.
    pub callbacks: Vec<CodeId>,
}

/// Everything a backend needs to emit a parser.
pub struct FrontendResult<I: Implementation> {
    pub prefix: String,
    pub properties: Vec<Property>,
    pub root: NodeId,
    pub graph: Graph,
    pub spans: Vec<SpanField>,
    /// Nodes where generated code may resume after returning to the caller.
    pub resumption_targets: IndexSet<NodeId>,
    /// Backend payloads, indexed like the graph's nodes.
    pub nodes: Vec<I::Node>,
    pub codes: Vec<I::Code>,
    pub transforms: Vec<I::Transform>,
}

/// Translates source graphs for one backend.
pub struct Frontend<I> {
    prefix: String,
    options: FrontendOptions,
    implementation: I,
}

impl<I: Implementation> Frontend<I> {
    /// Fails on invalid options before anything is translated.
    pub fn new(
        prefix: impl Into<String>,
        implementation: I,
        options: FrontendOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            prefix: prefix.into(),
            options,
            implementation,
        })
    }

    /// Translate the graph reachable from `root`.
    ///
    /// Consumes the frontend: names and caches belong to one compilation.
    pub fn compile(
        mut self,
        source: &SourceGraph,
        root: NodeRef,
        allocator: &dyn SpanAllocator,
    ) -> Result<FrontendResult<I>> {
        log::debug!("allocating spans");
        let allocation = allocator.allocate(source, root)?;

        let mut translator = Translator::new(source, &self.prefix, self.options);
        translator.assign_spans(&allocation);

        log::debug!("translating from `{}`", source.node(root).name);
        let root = translator.translate(root)?;
        let (mut graph, spans) = translator.into_parts();
        graph.finish()?;

        log::debug!("running peephole pass over {} nodes", graph.len());
        let root = peephole::optimize(&mut graph, root);

        let reachable = enumerate(&graph, root);
        let resumption_targets = resumption::targets(&graph, root, &reachable);
        log::debug!(
            "{} reachable nodes, {} resumption targets",
            reachable.len(),
            resumption_targets.len()
        );

        let nodes = graph
            .nodes()
            .map(|(id, node)| self.implementation.node(id, node))
            .collect();
        let codes = graph
            .codes()
            .map(|(id, code)| self.implementation.code(id, code))
            .collect();
        let transforms = graph
            .transforms()
            .map(|(id, transform)| self.implementation.transform(id, transform))
            .collect();

        Ok(FrontendResult {
            prefix: self.prefix,
            properties: source.properties().to_vec(),
            root,
            graph,
            spans,
            resumption_targets,
            nodes,
            codes,
            transforms,
        })
    }

    /// [`Frontend::compile`] with the reachability span allocator.
    pub fn compile_default(
        self,
        source: &SourceGraph,
        root: NodeRef,
    ) -> Result<FrontendResult<I>> {
        self.compile(source, root, &ReachabilitySpanAllocator)
    }
}
