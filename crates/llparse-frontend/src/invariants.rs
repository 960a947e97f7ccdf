//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::node::Node;

impl Node {
    pub(crate) fn wrong_kind(&self, operation: &str) -> ! {
        panic!(
            "Node: `{operation}` called on {} node `{}` \
             (translator must only wire edges its kind supports)",
            self.kind.name(),
            self.id.name
        )
    }
}
