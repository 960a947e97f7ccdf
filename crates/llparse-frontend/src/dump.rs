//! Text rendering of a translated graph for inspection and testing.

use std::fmt::{self, Write};

use crate::code::Transform;
use crate::enumerate::enumerate;
use crate::node::{Graph, Node, NodeId, NodeKind};

/// Printer for a translated [`Graph`].
///
/// Prints the nodes reachable from the root in enumeration order, one header
/// line per node followed by its edges.
pub struct GraphPrinter<'a> {
    graph: &'a Graph,
    root: NodeId,
}

impl<'a> GraphPrinter<'a> {
    pub fn new(graph: &'a Graph, root: NodeId) -> Self {
        Self { graph, root }
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> fmt::Result {
        writeln!(w, "root = {}", self.name(self.root))?;
        writeln!(w)?;

        for id in enumerate(self.graph, self.root) {
            let node = self.graph.node(id);
            write!(w, "{}: ", node.name())?;
            self.format_header(w, node)?;
            writeln!(w)?;
            self.format_edges(w, node)?;
            self.format_otherwise(w, node)?;
        }

        Ok(())
    }

    fn format_header(&self, w: &mut String, node: &Node) -> fmt::Result {
        write!(w, "{}", node.kind.name())?;
        match &node.kind {
            NodeKind::Empty | NodeKind::Single { .. } | NodeKind::TableLookup { .. } => {}
            NodeKind::Error { code, reason } | NodeKind::Pause { code, reason } => {
                write!(w, " {code} {reason:?}")?;
            }
            NodeKind::Consume { field } => write!(w, " {field}")?,
            NodeKind::SpanStart { field, callback } | NodeKind::SpanEnd { field, callback } => {
                write!(w, " #{field} {}", self.graph.code(*callback).name)?;
            }
            NodeKind::Invoke { code, .. } => write!(w, " {}", self.graph.code(*code).name)?,
            NodeKind::Sequence { select, .. } => write!(w, " \"{}\"", select.escape_ascii())?,
        }

        if let Some(transform) = node.kind.transform() {
            let transform = self.graph.transform(transform);
            if transform != Transform::Id {
                write!(w, " [{}]", transform.name())?;
            }
        }
        Ok(())
    }

    fn format_edges(&self, w: &mut String, node: &Node) -> fmt::Result {
        match &node.kind {
            NodeKind::Invoke { edges, .. } => {
                for edge in edges {
                    writeln!(w, "  {} => {}", edge.code, self.name(edge.node))?;
                }
            }
            NodeKind::Single { edges, .. } => {
                for edge in edges {
                    write!(w, "  '{}'", [edge.key].escape_ascii())?;
                    format_flags(w, edge.no_advance, edge.value)?;
                    writeln!(w, " => {}", self.name(edge.node))?;
                }
            }
            NodeKind::Sequence {
                edge: Some(edge), ..
            } => {
                write!(w, "  match")?;
                format_flags(w, false, edge.value)?;
                writeln!(w, " => {}", self.name(edge.node))?;
            }
            NodeKind::TableLookup { edges, .. } => {
                for edge in edges {
                    let keys: Vec<_> = edge
                        .keys
                        .iter()
                        .map(|key| format!("'{}'", [*key].escape_ascii()))
                        .collect();
                    write!(w, "  [{}]", keys.join(", "))?;
                    format_flags(w, edge.no_advance, None)?;
                    writeln!(w, " => {}", self.name(edge.node))?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn format_otherwise(&self, w: &mut String, node: &Node) -> fmt::Result {
        let Some(otherwise) = node.otherwise() else {
            return Ok(());
        };
        let label = if otherwise.no_advance {
            "otherwise"
        } else {
            "skip_to"
        };
        write!(w, "  {label}")?;
        format_flags(w, false, otherwise.value)?;
        writeln!(w, " => {}", self.name(otherwise.node))
    }

    fn name(&self, id: NodeId) -> &str {
        self.graph.node(id).name()
    }
}

fn format_flags(w: &mut String, no_advance: bool, value: Option<i64>) -> fmt::Result {
    if no_advance {
        write!(w, " (peek)")?;
    }
    if let Some(value) = value {
        write!(w, " value={value}")?;
    }
    Ok(())
}

impl Graph {
    /// Create a printer for the part of this graph reachable from `root`.
    pub fn printer(&self, root: NodeId) -> GraphPrinter<'_> {
        GraphPrinter::new(self, root)
    }
}
