//! Translated callbacks and byte transforms.

use std::fmt;

use llparse_core::{MulAddOptions, Signature};

/// Handle of a translated callback in a [`Graph`](crate::Graph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct CodeId(pub(crate) u32);

impl CodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a translated transform in a [`Graph`](crate::Graph).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TransformId(pub(crate) u32);

impl TransformId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Callback operation with every optional parameter resolved.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum CodeKind {
    IsEqual {
        field: String,
        value: i64,
    },
    Load {
        field: String,
    },
    MulAdd {
        field: String,
        base: i64,
        max: Option<i64>,
        signed: bool,
    },
    Or {
        field: String,
        value: i64,
    },
    Store {
        field: String,
    },
    Test {
        field: String,
        value: i64,
    },
    Update {
        field: String,
        value: i64,
    },
    Match,
    Span,
    Value,
}

impl CodeKind {
    /// Resolve a source operation. `MulAdd` is signed unless stated otherwise.
    pub fn from_source(kind: &llparse_core::CodeKind) -> Self {
        use llparse_core::CodeKind as Source;

        match kind {
            Source::IsEqual { field, value } => Self::IsEqual {
                field: field.clone(),
                value: *value,
            },
            Source::Load { field } => Self::Load {
                field: field.clone(),
            },
            Source::MulAdd {
                field,
                options: MulAddOptions { base, max, signed },
            } => Self::MulAdd {
                field: field.clone(),
                base: *base,
                max: *max,
                signed: signed.unwrap_or(true),
            },
            Source::Or { field, value } => Self::Or {
                field: field.clone(),
                value: *value,
            },
            Source::Store { field } => Self::Store {
                field: field.clone(),
            },
            Source::Test { field, value } => Self::Test {
                field: field.clone(),
                value: *value,
            },
            Source::Update { field, value } => Self::Update {
                field: field.clone(),
                value: *value,
            },
            Source::Match => Self::Match,
            Source::Span => Self::Span,
            Source::Value => Self::Value,
        }
    }

    /// User callbacks are implemented outside the generated parser.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Match | Self::Span | Self::Value)
    }

    pub fn signature(&self) -> Signature {
        match self {
            Self::IsEqual { .. } | Self::Load { .. } | Self::Test { .. } | Self::Match => {
                Signature::Match
            }
            Self::MulAdd { .. }
            | Self::Or { .. }
            | Self::Store { .. }
            | Self::Update { .. }
            | Self::Value => Signature::Value,
            Self::Span => Signature::Span,
        }
    }
}

/// Identity of a callback for deduplication.
///
/// Field operations are keyed by what they compute. User callbacks are keyed
/// by signature and name, since their behavior is opaque.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(kind: &CodeKind, name: &str) -> Self {
        let key = match kind {
            CodeKind::IsEqual { field, value } => format!("is_equal_{field}_{value}"),
            CodeKind::Load { field } => format!("load_{field}"),
            CodeKind::MulAdd {
                field,
                base,
                max,
                signed,
            } => {
                let max = max.map_or_else(|| "none".to_owned(), |max| max.to_string());
                format!("mul_add_{field}_{base}_{max}_{signed}")
            }
            CodeKind::Or { field, value } => format!("or_{field}_{value}"),
            CodeKind::Store { field } => format!("store_{field}"),
            CodeKind::Test { field, value } => format!("test_{field}_{value}"),
            CodeKind::Update { field, value } => format!("update_{field}_{value}"),
            CodeKind::Match | CodeKind::Span | CodeKind::Value => {
                format!("external_{}_{name}", kind.signature())
            }
        };
        Self(key)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A translated callback, shared by every node that invokes it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Code {
    pub name: String,
    pub kind: CodeKind,
}

impl Code {
    pub fn signature(&self) -> Signature {
        self.kind.signature()
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(&self.kind, &self.name)
    }
}

/// Byte normalization applied by match-family nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Transform {
    Id,
    ToLowerUnsafe,
}

impl Transform {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "to_lower_unsafe" => Some(Self::ToLowerUnsafe),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ToLowerUnsafe => "to_lower_unsafe",
        }
    }
}
