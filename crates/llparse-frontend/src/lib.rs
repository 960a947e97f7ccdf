//! llparse frontend: source graph to target node graph translation.
//!
//! This crate turns a [`llparse_core::SourceGraph`] into a graph of target
//! nodes that a code generator can emit as a byte-at-a-time state machine:
//! - `frontend` - the translator: memoized graph walk, span fields, callbacks
//! - `trie` - byte transition trie with multi-byte sequence compression
//! - `node` - target node graph and its edge-mutation operations
//! - `code` - translated callbacks and transforms, with cache keys
//! - `peephole` - skips pass-through `Empty` nodes after translation
//! - `dump` - text rendering of a translated graph
//!
//! Backends plug in through [`Implementation`], which is called once for every
//! node, callback and transform the translator creates.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod code;
pub mod dump;
pub mod frontend;
pub mod identifier;
pub mod implementation;
pub mod node;
pub mod options;
pub mod peephole;
pub mod trie;

mod enumerate;
mod invariants;
mod resumption;

#[cfg(test)]
pub mod test_utils;

pub use code::{CacheKey, Code, CodeId, CodeKind, Transform, TransformId};
pub use dump::GraphPrinter;
pub use enumerate::enumerate;
pub use frontend::{Frontend, FrontendResult, SpanField};
pub use identifier::{Identifier, UniqueName};
pub use implementation::Implementation;
pub use node::{Graph, Node, NodeId, NodeKind, Otherwise};
pub use options::FrontendOptions;

use llparse_core::SpanAllocError;

/// Errors that abort a translation.
///
/// Every variant that concerns a node names it by its source name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid `maxTableElemWidth` {0}, must be positive")]
    InvalidMaxTableElemWidth(u32),

    #[error("node `{node}` has no `.otherwise()`")]
    MissingOtherwise { node: String },

    #[error("empty root entry at `{node}`")]
    EmptyRootEntry { node: String },

    #[error("duplicate entries in `{node}` at: [ {path} ]")]
    DuplicateEntry { node: String, path: String },

    #[error("conflicting `.peek()` and `.match()` entries in `{node}` at: [ {path} ]")]
    ConflictingPeek { node: String, path: String },

    #[error("`.peek()` can't be part of a multi-byte sequence in `{node}`")]
    PeekInSequence { node: String },

    #[error("passing `span` callback `{code}` to `invoke` in `{node}` is not allowed")]
    SpanCallbackInInvoke { node: String, code: String },

    #[error("span of `{node}` was not allocated to any span field")]
    UnallocatedSpan { node: String },

    #[error("unsupported transform `{name}` in `{node}`")]
    UnsupportedTransform { node: String, name: String },

    #[error("node `{node}` was left without a required edge")]
    UnfinishedNode { node: String },

    #[error(transparent)]
    SpanAlloc(#[from] SpanAllocError),
}

/// Result type for translation.
pub type Result<T> = std::result::Result<T, Error>;
