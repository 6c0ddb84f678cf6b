//! Argument schemas: typed records describing one operation's accepted inputs.
//!
//! A schema is an ordinary `serde` record whose field metadata is declared
//! once through [`ArgumentSchema::fields`]. The metadata drives flag
//! generation, defaulting, choice validation and JSON decoding of composite
//! fields; the record itself is filled by structural decoding of the
//! resolved argument map.

pub mod introspect;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

pub use introspect::{introspect, ArgumentDescriptor};

/// Bit width of an integer field; values outside the width are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
}

impl IntWidth {
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::W8 => 8,
            Self::W16 => 16,
            Self::W32 => 32,
            Self::W64 => 64,
        }
    }
}

/// Declared type of a schema field.
#[derive(Clone, Copy)]
pub enum FieldKind {
    Bool,
    Int(IntWidth),
    Uint(IntWidth),
    Float,
    String,
    StringList,
    /// `key=value` pairs.
    StringMap,
    /// String-keyed mapping of records, supplied as JSON.
    RecordMap,
    /// Sequence of records, supplied as JSON.
    RecordList,
    /// Sub-record whose fields are inlined into the parent.
    Embedded(fn() -> Vec<FieldSpec>),
}

impl FieldKind {
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::RecordMap | Self::RecordList)
    }

    /// Human readable name used in error messages and help text.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Bool => "boolean".to_string(),
            Self::Int(width) => format!("int{}", width.bits()),
            Self::Uint(width) => format!("uint{}", width.bits()),
            Self::Float => "float".to_string(),
            Self::String => "string".to_string(),
            Self::StringList => "string list".to_string(),
            Self::StringMap => "key=value map".to_string(),
            Self::RecordMap => "JSON object".to_string(),
            Self::RecordList => "JSON array".to_string(),
            Self::Embedded(_) => "embedded record".to_string(),
        }
    }
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded(_) => f.write_str("Embedded(..)"),
            Self::Int(width) => write!(f, "Int({width:?})"),
            Self::Uint(width) => write!(f, "Uint({width:?})"),
            other => f.write_str(&other.type_name()),
        }
    }
}

impl PartialEq for FieldKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) | (Self::Uint(a), Self::Uint(b)) => a == b,
            (Self::Embedded(a), Self::Embedded(b)) => *a as usize == *b as usize,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// Metadata for one field of an argument schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Wire name; must match the record's serialized field name.
    pub name: &'static str,
    pub help: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// String-encoded default, coerced like a command-line value.
    pub default: Option<&'static str>,
    pub choices: &'static [&'static str],
    /// Non-public fields are never exposed as flags.
    pub public: bool,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            help: "",
            kind,
            required: false,
            default: None,
            choices: &[],
            public: true,
        }
    }

    /// Inlines the fields of another schema ("squashed" sub-record).
    #[must_use]
    pub fn embedded<T: ArgumentSchema>() -> Self {
        Self::new("", FieldKind::Embedded(T::fields))
    }

    #[must_use]
    pub const fn help(mut self, help: &'static str) -> Self {
        self.help = help;
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub const fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    #[must_use]
    pub const fn private(mut self) -> Self {
        self.public = false;
        self
    }
}

/// A typed argument record.
///
/// Implementors pair `serde` derives with explicit field metadata. Wire
/// names in [`fields`](Self::fields) must match the serialized names, and
/// embedded records must be `#[serde(flatten)]`.
pub trait ArgumentSchema: Default + Serialize + DeserializeOwned + Send + 'static {
    fn fields() -> Vec<FieldSpec>;
}

/// Type-erased reference to an [`ArgumentSchema`], stored in action definitions.
#[derive(Clone, Copy)]
pub struct SchemaRef {
    pub type_name: &'static str,
    pub fields: fn() -> Vec<FieldSpec>,
}

impl SchemaRef {
    #[must_use]
    pub fn of<T: ArgumentSchema>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            fields: T::fields,
        }
    }

    /// Short type name without the module path.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.type_name.rsplit("::").next().unwrap_or(self.type_name)
    }
}

impl fmt::Debug for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRef")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
