//! Span field assignment.

use llparse_core::{SourceNode, SpanAllocation, SpanRef};

use crate::code::CodeId;
use crate::{Error, Result};

use super::SpanField;
use super::translator::Translator;

impl Translator<'_> {
    /// Create one field per concurrency group of the allocation.
    pub(crate) fn assign_spans(&mut self, allocation: &SpanAllocation) {
        log::debug!(
            "assigning {} spans to {} fields",
            allocation.spans.len(),
            allocation.concurrency.len()
        );
        for (index, group) in allocation.concurrency.iter().enumerate() {
            let mut callbacks = Vec::with_capacity(group.len());
            for &span in group {
                let callback = self.source.span(span).callback;
                callbacks.push(self.translate_code(callback));
                self.span_map.insert(span, index);
            }
            self.spans.push(SpanField { index, callbacks });
        }
    }

    /// Field index and callback for a span start or end node.
    pub(super) fn span_parts(
        &mut self,
        node: &SourceNode,
        span: SpanRef,
    ) -> Result<(usize, CodeId)> {
        let Some(&field) = self.span_map.get(&span) else {
            return Err(Error::UnallocatedSpan {
                node: node.name.clone(),
            });
        };
        let callback = self.translate_code(self.source.span(span).callback);
        Ok((field, callback))
    }
}
