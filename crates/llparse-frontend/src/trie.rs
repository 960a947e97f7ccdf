//! Byte transition trie of a single match node.
//!
//! Keys are sorted so that the common prefix of the first and last key is the
//! common prefix of all of them. A shared prefix longer than one byte becomes
//! a [`TrieSequence`]; anything else branches on the first byte in a
//! [`TrieSingle`]. Keys that run out become [`TrieEmpty`] leaves.

use indexmap::IndexMap;
use llparse_core::{Edge, NodeRef};

use crate::{Error, Result};

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TrieNode {
    Empty(TrieEmpty),
    Single(TrieSingle),
    Sequence(TrieSequence),
}

impl TrieNode {
    /// Value carried into the target when this node is a leaf.
    pub fn value(&self) -> Option<i64> {
        match self {
            Self::Empty(empty) => empty.value,
            Self::Single(_) | Self::Sequence(_) => None,
        }
    }
}

/// Leaf: the whole key has matched, control goes to `node`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TrieEmpty {
    pub node: NodeRef,
    pub value: Option<i64>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrieSingleChild {
    pub key: u8,
    pub no_advance: bool,
    pub node: TrieNode,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrieSingle {
    /// Ordered by key.
    pub children: Vec<TrieSingleChild>,
    /// Key that ended at this level while longer keys continue.
    pub otherwise: Option<TrieEmpty>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TrieSequence {
    pub select: Vec<u8>,
    pub child: Box<TrieNode>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct TrieEdge<'a> {
    key: &'a [u8],
    no_advance: bool,
    node: NodeRef,
    value: Option<i64>,
}

impl TrieEdge<'_> {
    fn leaf(&self) -> TrieEmpty {
        TrieEmpty {
            node: self.node,
            value: self.value,
        }
    }
}

/// Builds the trie of one match node. `name` is used in error messages.
pub struct Trie<'n> {
    name: &'n str,
}

impl<'n> Trie<'n> {
    pub fn new(name: &'n str) -> Self {
        Self { name }
    }

    /// Build a trie over the byte-keyed edges. `None` when there are none.
    pub fn build(&self, edges: &[Edge]) -> Result<Option<TrieNode>> {
        let edges: Vec<_> = edges
            .iter()
            .filter_map(|edge| {
                edge.bytes().map(|key| TrieEdge {
                    key,
                    no_advance: edge.no_advance,
                    node: edge.node,
                    value: edge.value,
                })
            })
            .collect();

        if edges.is_empty() {
            return Ok(None);
        }

        log::trace!("building trie of `{}` from {} edges", self.name, edges.len());
        self.level(slice(edges, 0), &[]).map(Some)
    }

    fn level(&self, edges: Vec<TrieEdge<'_>>, path: &[u8]) -> Result<TrieNode> {
        let first = edges[0].key;
        let last = edges[edges.len() - 1].key;

        if edges.len() == 1 && first.is_empty() {
            if path.is_empty() {
                return Err(self.empty_root());
            }
            return Ok(TrieNode::Empty(edges[0].leaf()));
        }

        let common = first
            .iter()
            .zip(last)
            .take_while(|(a, b)| a == b)
            .count();

        if common > 1 {
            let prefix = &first[..common];
            return self.sequence(edges, prefix, path);
        }
        self.single(edges, path)
    }

    fn sequence(&self, edges: Vec<TrieEdge<'_>>, prefix: &[u8], path: &[u8]) -> Result<TrieNode> {
        if edges.iter().any(|e| e.no_advance) {
            return Err(Error::PeekInSequence {
                node: self.name.to_owned(),
            });
        }

        let subpath = [path, prefix].concat();
        let child = self.level(slice(edges, prefix.len()), &subpath)?;

        Ok(TrieNode::Sequence(TrieSequence {
            select: prefix.to_vec(),
            child: Box::new(child),
        }))
    }

    fn single(&self, edges: Vec<TrieEdge<'_>>, path: &[u8]) -> Result<TrieNode> {
        // Sorted: empty keys come first.
        if edges[0].key.is_empty() {
            if path.is_empty() {
                return Err(self.empty_root());
            }
            if edges.len() > 1 && edges[1].key.is_empty() {
                return Err(Error::DuplicateEntry {
                    node: self.name.to_owned(),
                    path: describe(path),
                });
            }
        }

        let mut otherwise = None;
        let mut groups: IndexMap<u8, Vec<TrieEdge<'_>>> = IndexMap::new();
        for edge in edges {
            match edge.key.first() {
                None => otherwise = Some(edge.leaf()),
                Some(&byte) => groups.entry(byte).or_default().push(edge),
            }
        }

        let mut children = Vec::with_capacity(groups.len());
        for (key, group) in groups {
            let subpath = [path, &[key][..]].concat();
            let no_advance = group[0].no_advance;
            if group.iter().any(|e| e.no_advance != no_advance) {
                return Err(Error::ConflictingPeek {
                    node: self.name.to_owned(),
                    path: describe(&subpath),
                });
            }

            let node = self.level(slice(group, 1), &subpath)?;
            children.push(TrieSingleChild {
                key,
                no_advance,
                node,
            });
        }

        Ok(TrieNode::Single(TrieSingle {
            children,
            otherwise,
        }))
    }

    fn empty_root(&self) -> Error {
        Error::EmptyRootEntry {
            node: self.name.to_owned(),
        }
    }
}

/// Drop the first `offset` bytes of every key, then sort and deduplicate.
fn slice(edges: Vec<TrieEdge<'_>>, offset: usize) -> Vec<TrieEdge<'_>> {
    let mut sliced: Vec<_> = edges
        .into_iter()
        .map(|edge| TrieEdge {
            key: &edge.key[offset..],
            ..edge
        })
        .collect();
    sliced.sort_by(|a, b| a.key.cmp(b.key));
    sliced.dedup();
    sliced
}

fn describe(path: &[u8]) -> String {
    path.escape_ascii().to_string()
}
