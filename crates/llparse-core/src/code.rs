//! Callbacks and state properties referenced by source nodes.

use std::fmt;

/// What a callback returns, and therefore where it may be used.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Signature {
    /// Called with the current position, returns an integer.
    Match,
    /// Called with the current position and a matched value.
    Value,
    /// Called with the bounds of a captured span.
    Span,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Match => "match",
            Self::Value => "value",
            Self::Span => "span",
        })
    }
}

/// Parameters of a `MulAdd` operation.
///
/// `signed` stays optional here; the translator decides its default.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct MulAddOptions {
    pub base: i64,
    pub max: Option<i64>,
    pub signed: Option<bool>,
}

/// Operation performed by a callback.
///
/// Field operations act on a named property of the parser state. `Match`,
/// `Span` and `Value` are user callbacks implemented outside the generated
/// parser.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum CodeKind {
    IsEqual { field: String, value: i64 },
    Load { field: String },
    MulAdd { field: String, options: MulAddOptions },
    Or { field: String, value: i64 },
    Store { field: String },
    Test { field: String, value: i64 },
    Update { field: String, value: i64 },
    Match,
    Span,
    Value,
}

/// A named callback.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Code {
    pub name: String,
    pub kind: CodeKind,
}

impl Code {
    pub fn new(name: impl Into<String>, kind: CodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn signature(&self) -> Signature {
        match self.kind {
            CodeKind::IsEqual { .. }
            | CodeKind::Load { .. }
            | CodeKind::Test { .. }
            | CodeKind::Match => Signature::Match,
            CodeKind::MulAdd { .. }
            | CodeKind::Or { .. }
            | CodeKind::Store { .. }
            | CodeKind::Update { .. }
            | CodeKind::Value => Signature::Value,
            CodeKind::Span => Signature::Span,
        }
    }

    /// The state property this callback reads or writes, if any.
    pub fn field(&self) -> Option<&str> {
        match &self.kind {
            CodeKind::IsEqual { field, .. }
            | CodeKind::Load { field }
            | CodeKind::MulAdd { field, .. }
            | CodeKind::Or { field, .. }
            | CodeKind::Store { field }
            | CodeKind::Test { field, .. }
            | CodeKind::Update { field, .. } => Some(field),
            CodeKind::Match | CodeKind::Span | CodeKind::Value => None,
        }
    }
}

/// Storage type of a parser state property.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    I8,
    I16,
    I32,
    I64,
    Ptr,
}

/// A user-declared field of the parser state.
#[derive(Clone, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub ty: PropertyType,
    pub name: String,
}

impl Property {
    pub fn new(ty: PropertyType, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: name.into(),
        }
    }
}
