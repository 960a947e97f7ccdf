//! Lookup table optimization of single-byte branches.

use indexmap::IndexMap;
use indexmap::map::Entry;
use llparse_core::NodeRef;

use crate::Result;
use crate::node::{NodeId, NodeKind, TableEdge};
use crate::trie::{TrieNode, TrieSingle};

use super::translator::{MatchCtx, Translator};

/// Bytes that lead to one target.
struct TableTarget {
    keys: Vec<u8>,
    no_advance: bool,
}

impl<'a> Translator<'a> {
    /// Replace a `Single` trie node with a `TableLookup` when it pays off.
    ///
    /// `None` leaves the caller to emit a `Single` node.
    pub(super) fn maybe_table_lookup(
        &mut self,
        ctx: MatchCtx<'a>,
        single: &TrieSingle,
        children: &mut Vec<NodeId>,
    ) -> Result<Option<NodeId>> {
        let Some(targets) = self.table_targets(ctx.name, single) else {
            return Ok(None);
        };

        let kind = NodeKind::TableLookup {
            edges: Vec::new(),
            transform: ctx.transform,
        };
        let id = self.add_match_node(ctx, kind, children);

        for (target, entry) in targets {
            let next = self.translate(target)?;
            self.graph.node_mut(id).add_table_edge(TableEdge {
                keys: entry.keys,
                no_advance: entry.no_advance,
                node: next,
            });
        }

        if let Some(otherwise) = &single.otherwise {
            let next = self.translate(otherwise.node)?;
            self.graph
                .node_mut(id)
                .set_otherwise(next, true, otherwise.value);
        }

        log::debug!("optimized `{}` to a table lookup node", ctx.name);
        Ok(Some(id))
    }

    /// Group the children by target, or `None` if a table can't hold them.
    fn table_targets(
        &self,
        name: &str,
        single: &TrieSingle,
    ) -> Option<IndexMap<NodeRef, TableTarget>> {
        let min = self.options.min_table_size;
        if single.children.len() < min {
            log::debug!(
                "not enough children of `{name}` to allocate table, got {} need {min}",
                single.children.len()
            );
            return None;
        }

        let mut targets: IndexMap<NodeRef, TableTarget> = IndexMap::new();
        for child in &single.children {
            let TrieNode::Empty(leaf) = &child.node else {
                log::debug!("non-leaf trie child of `{name}` prevents table allocation");
                return None;
            };
            if leaf.value.is_some() {
                log::debug!("value passing trie leaf of `{name}` prevents table allocation");
                return None;
            }

            match targets.entry(leaf.node) {
                Entry::Vacant(slot) => {
                    slot.insert(TableTarget {
                        keys: vec![child.key],
                        no_advance: child.no_advance,
                    });
                }
                Entry::Occupied(mut slot) => {
                    let target = slot.get_mut();
                    if target.no_advance != child.no_advance {
                        log::debug!(
                            "noAdvance mismatch in a trie leaf of `{name}` prevents table allocation"
                        );
                        return None;
                    }
                    target.keys.push(child.key);
                }
            }
        }

        if !self.options.fits_table(targets.len()) {
            log::debug!(
                "too many different trie targets of `{name}` for a table allocation, got {}",
                targets.len()
            );
            return None;
        }

        Some(targets)
    }
}
