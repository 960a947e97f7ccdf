#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Source graph model for the llparse parser generator.
//!
//! A parser is described as a possibly cyclic network of nodes, each of which
//! either matches input bytes, runs a callback, or reports an outcome. This
//! crate owns that description:
//!
//! - [`SourceGraph`]: arena of nodes, spans, callbacks and properties, plus the
//!   builder methods used to wire them together
//! - [`SpanAllocator`]: partitions spans into groups that can share storage
//!
//! Nodes are addressed by [`NodeRef`] handles. Two handles are the same node
//! exactly when they are equal, which is what the translation stage relies on
//! to preserve sharing and break cycles.

mod code;
mod graph;
mod span_alloc;

#[cfg(test)]
mod graph_tests;

pub use code::{Code, CodeKind, MulAddOptions, Property, PropertyType, Signature};
pub use graph::{
    CodeRef, Edge, EdgeKey, NodeRef, OtherwiseEdge, SourceGraph, SourceKind, SourceNode, Span,
    SpanRef, Transform,
};
pub use span_alloc::{ReachabilitySpanAllocator, SpanAllocError, SpanAllocation, SpanAllocator};

/// Errors raised while building a source graph.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Only match and invoke nodes carry keyed edges.
    #[error("node `{node}` can't have keyed edges")]
    EdgesNotAllowed { node: String },

    /// Error nodes are terminal.
    #[error("error node `{node}` can't have an otherwise edge")]
    TerminalOtherwise { node: String },

    #[error("node `{node}` already has an otherwise edge")]
    DuplicateOtherwise { node: String },

    #[error("empty key on node `{node}`")]
    EmptyKey { node: String },

    #[error("duplicate key `{key}` on node `{node}`")]
    DuplicateKey { node: String, key: String },

    /// `peek` consumes nothing, so it only makes sense for a single byte.
    #[error("peek on node `{node}` must use a single byte")]
    MultiBytePeek { node: String },

    #[error("transform can only be applied to match node, got `{node}`")]
    TransformOnNonMatch { node: String },

    #[error("callback `{code}` has signature `{signature}`, expected `{expected}`")]
    WrongSignature {
        code: String,
        signature: Signature,
        expected: Signature,
    },
}

/// Result type for graph construction.
pub type Result<T> = std::result::Result<T, GraphError>;
