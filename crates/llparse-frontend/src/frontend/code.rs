//! Callback and transform translation with deduplication.

use llparse_core::{CodeRef, Signature, SourceNode};

use crate::code::{CacheKey, Code, CodeId, CodeKind, Transform, TransformId};
use crate::{Error, Result};

use super::translator::Translator;

impl Translator<'_> {
    /// Translate a callback, reusing an earlier one with the same cache key.
    ///
    /// Field operations get a prefixed unique name. User callbacks keep their
    /// name, since generated code links against it.
    pub(super) fn translate_code(&mut self, code: CodeRef) -> CodeId {
        let source = self.source.code(code);
        let kind = CodeKind::from_source(&source.kind);
        let key = CacheKey::new(&kind, &source.name);

        if let Some(&id) = self.code_cache.get(&key) {
            return id;
        }

        let name = if kind.is_external() {
            source.name.clone()
        } else {
            self.code_ids.id(&source.name).name
        };
        let id = self.graph.add_code(Code { name, kind });
        self.code_cache.insert(key, id);
        id
    }

    pub(super) fn translate_invoke_code(
        &mut self,
        node: &SourceNode,
        code: CodeRef,
    ) -> Result<CodeId> {
        let source = self.source.code(code);
        if source.signature() == Signature::Span {
            return Err(Error::SpanCallbackInInvoke {
                node: node.name.clone(),
                code: source.name.clone(),
            });
        }
        Ok(self.translate_code(code))
    }

    /// Absent transforms translate to the identity.
    pub(super) fn translate_transform(
        &mut self,
        node: &SourceNode,
        transform: Option<&llparse_core::Transform>,
    ) -> Result<TransformId> {
        let transform = match transform {
            None => Transform::Id,
            Some(t) => Transform::from_name(&t.name).ok_or_else(|| Error::UnsupportedTransform {
                node: node.name.clone(),
                name: t.name.clone(),
            })?,
        };

        if let Some(&id) = self.transform_cache.get(&transform) {
            return Ok(id);
        }
        let id = self.graph.add_transform(transform);
        self.transform_cache.insert(transform, id);
        Ok(id)
    }
}
