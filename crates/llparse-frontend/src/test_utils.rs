//! Test utilities.

use llparse_core::{NodeRef, SourceGraph};

use crate::code::{Code, CodeId, Transform, TransformId};
use crate::node::{Node, NodeId};
use crate::{Frontend, FrontendOptions, FrontendResult, Implementation, Result};

pub const PREFIX: &str = "p";

pub fn compile(g: &SourceGraph, root: NodeRef) -> Result<FrontendResult<()>> {
    compile_with(g, root, FrontendOptions::default())
}

pub fn compile_with(
    g: &SourceGraph,
    root: NodeRef,
    options: FrontendOptions,
) -> Result<FrontendResult<()>> {
    let _ = env_logger::builder().is_test(true).try_init();
    Frontend::new(PREFIX, (), options)?.compile_default(g, root)
}

/// Options that turn any branch of `min_table_size` or more into a table.
pub fn table_options(min_table_size: usize) -> FrontendOptions {
    FrontendOptions {
        min_table_size,
        ..Default::default()
    }
}

pub fn dump<I: Implementation>(result: &FrontendResult<I>) -> String {
    result.graph.printer(result.root).dump()
}

/// Node names in `p__n_{name}` form.
pub fn n(name: &str) -> String {
    format!("{PREFIX}__n_{name}")
}

/// Backend whose payloads describe the hook call that built them.
pub struct Recorder;

impl Implementation for Recorder {
    type Node = String;
    type Code = String;
    type Transform = String;

    fn node(&mut self, id: NodeId, node: &Node) -> String {
        format!("node {} {}", id.index(), node.name())
    }

    fn code(&mut self, id: CodeId, code: &Code) -> String {
        format!("code {} {}", id.index(), code.name)
    }

    fn transform(&mut self, id: TransformId, transform: Transform) -> String {
        format!("transform {} {}", id.index(), transform.name())
    }
}
