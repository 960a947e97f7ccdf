//! Unique, human-readable names for generated nodes and callbacks.

use std::collections::HashSet;

/// A generated name together with the source name it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UniqueName {
    pub name: String,
    pub original: String,
}

/// Allocates `{prefix}{name}` names, suffixing `_1`, `_2`, ... on collision.
///
/// Scoped to one translation; nothing is shared between allocators.
#[derive(Debug, Clone, Default)]
pub struct Identifier {
    prefix: String,
    used: HashSet<String>,
}

impl Identifier {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            used: HashSet::new(),
        }
    }

    pub fn id(&mut self, name: &str) -> UniqueName {
        let target = format!("{}{}", self.prefix, name);

        let mut unique = target.clone();
        let mut suffix = 1u64;
        while self.used.contains(&unique) {
            unique = format!("{target}_{suffix}");
            suffix += 1;
        }

        self.used.insert(unique.clone());
        UniqueName {
            name: unique,
            original: name.to_owned(),
        }
    }
}
