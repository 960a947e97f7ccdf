//! Span storage allocation.
//!
//! Every span needs a slot holding its start position while it is open. Spans
//! that are never open at the same time can share a slot. The allocator
//! returns the spans partitioned into such shareable groups; the translator
//! turns each group into one span field.
//!
//! # Algorithm
//!
//! 1. Collect nodes reachable from the root
//! 2. Propagate the set of open spans along every edge until a fixed point
//! 3. Reject span ends that can be reached with their span closed
//! 4. Spans open together at any node overlap
//! 5. Greedy colouring of the overlap relation, in discovery order

use std::collections::{HashMap, HashSet};

use indexmap::IndexSet;

use crate::graph::{NodeRef, SourceGraph, SourceKind, SpanRef};

/// Errors raised while allocating span storage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanAllocError {
    #[error("span end `{node}` is reachable while its span is not started")]
    UnmatchedSpanEnd { node: String },
}

/// Spans partitioned into groups that can share one storage slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpanAllocation {
    /// Spans reachable from the root, in discovery order.
    pub spans: Vec<SpanRef>,
    /// Group `i` becomes span field `i`. Spans in one group are never open
    /// simultaneously; spans open together always land in different groups.
    pub concurrency: Vec<Vec<SpanRef>>,
}

/// Partitions the spans of a graph into storage groups.
pub trait SpanAllocator {
    fn allocate(
        &self,
        graph: &SourceGraph,
        root: NodeRef,
    ) -> Result<SpanAllocation, SpanAllocError>;
}

/// Allocator based on span liveness over the reachable graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReachabilitySpanAllocator;

impl SpanAllocator for ReachabilitySpanAllocator {
    fn allocate(
        &self,
        graph: &SourceGraph,
        root: NodeRef,
    ) -> Result<SpanAllocation, SpanAllocError> {
        let nodes = reachable(graph, root);
        let active = compute_active(graph, &nodes);
        check(graph, &nodes, &active)?;

        let spans = collect_spans(graph, &nodes);
        let overlap = compute_overlap(&active);
        let concurrency = color(&spans, &overlap);

        log::debug!(
            "allocated {} spans into {} fields",
            spans.len(),
            concurrency.len()
        );

        Ok(SpanAllocation {
            spans: spans.into_iter().collect(),
            concurrency,
        })
    }
}

type ActiveMap = HashMap<NodeRef, IndexSet<SpanRef>>;

/// Nodes reachable from `root`, depth-first, root first.
fn reachable(graph: &SourceGraph, root: NodeRef) -> Vec<NodeRef> {
    let mut seen = IndexSet::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if !seen.insert(node) {
            continue;
        }
        let successors: Vec<_> = graph.node(node).successors().collect();
        stack.extend(successors.into_iter().rev());
    }

    seen.into_iter().collect()
}

/// Spans open on entry to each node.
fn compute_active(graph: &SourceGraph, nodes: &[NodeRef]) -> ActiveMap {
    let mut active: ActiveMap = nodes.iter().map(|&n| (n, IndexSet::new())).collect();

    let mut changed = true;
    while changed {
        changed = false;

        for &node in nodes {
            let source = graph.node(node);
            let mut outgoing = active.get(&node).cloned().unwrap_or_default();
            match source.kind {
                SourceKind::SpanStart { span } => {
                    outgoing.insert(span);
                }
                SourceKind::SpanEnd { span } => {
                    outgoing.shift_remove(&span);
                }
                _ => {}
            }

            for succ in source.successors() {
                let target = active.entry(succ).or_default();
                for &span in &outgoing {
                    changed |= target.insert(span);
                }
            }
        }
    }

    active
}

fn check(
    graph: &SourceGraph,
    nodes: &[NodeRef],
    active: &ActiveMap,
) -> Result<(), SpanAllocError> {
    for &node in nodes {
        let source = graph.node(node);
        let SourceKind::SpanEnd { span } = source.kind else {
            continue;
        };
        if !active.get(&node).is_some_and(|open| open.contains(&span)) {
            return Err(SpanAllocError::UnmatchedSpanEnd {
                node: source.name.clone(),
            });
        }
    }
    Ok(())
}

fn collect_spans(graph: &SourceGraph, nodes: &[NodeRef]) -> IndexSet<SpanRef> {
    nodes
        .iter()
        .filter_map(|&node| match graph.node(node).kind {
            SourceKind::SpanStart { span } | SourceKind::SpanEnd { span } => Some(span),
            _ => None,
        })
        .collect()
}

fn compute_overlap(active: &ActiveMap) -> HashMap<SpanRef, HashSet<SpanRef>> {
    let mut overlap: HashMap<SpanRef, HashSet<SpanRef>> = HashMap::new();
    for open in active.values() {
        for &a in open {
            for &b in open {
                if a != b {
                    overlap.entry(a).or_default().insert(b);
                }
            }
        }
    }
    overlap
}

fn color(
    spans: &IndexSet<SpanRef>,
    overlap: &HashMap<SpanRef, HashSet<SpanRef>>,
) -> Vec<Vec<SpanRef>> {
    let mut colors: HashMap<SpanRef, usize> = HashMap::new();
    let mut groups: Vec<Vec<SpanRef>> = Vec::new();

    for &span in spans {
        let used: HashSet<usize> = overlap
            .get(&span)
            .into_iter()
            .flatten()
            .filter_map(|other| colors.get(other).copied())
            .collect();

        let mut color = 0;
        while used.contains(&color) {
            color += 1;
        }

        colors.insert(span, color);
        if color == groups.len() {
            groups.push(Vec::new());
        }
        groups[color].push(span);
    }

    groups
}
