//! Catalogue interface consumed by the plan-space builder
//!
//! The engine never discovers types or operations on its own. Everything it
//! knows about "how to obtain a value of type T" comes through the
//! [`Catalogue`] trait:
//!
//! - preset values for a type (literals and variable references), already
//!   filtered by a [`NullFilter`]
//! - constructing operations for a type under a [`VisibilityPolicy`]
//! - known subtypes of a type
//!
//! The order of every list a catalogue returns defines the canonical index
//! order of the spaces built from it, so implementations must return the same
//! order on every call within a run.

pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use self::registry::{Operation, RegistryCatalogue};

/// Name of a type known to the catalogue
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        TypeName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        TypeName(name.to_string())
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        TypeName(name)
    }
}

/// Whether the "no value" literal may appear at a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullFilter {
    /// Suppress [`LiteralValue::Null`]
    Forbid,
    /// Admit [`LiteralValue::Null`]
    Admit,
}

impl NullFilter {
    /// Filter for a receiver position: a receiver can never be absent
    pub fn narrow(self) -> Self {
        NullFilter::Forbid
    }

    /// Filter for an ordinary argument position below the top level
    pub fn widen(self) -> Self {
        NullFilter::Admit
    }

    pub fn admits(self, preset: &Preset) -> bool {
        match self {
            NullFilter::Admit => true,
            NullFilter::Forbid => !preset.is_null(),
        }
    }
}

impl Default for NullFilter {
    fn default() -> Self {
        NullFilter::Forbid
    }
}

/// Access level an operation is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Package,
    Private,
}

/// Which operations a caller is allowed to use
///
/// Passed through to the catalogue untouched; the engine only uses it as part
/// of the space cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityPolicy {
    PublicOnly,
    IncludePackage,
    All,
}

impl VisibilityPolicy {
    pub fn permits(self, visibility: Visibility) -> bool {
        match self {
            VisibilityPolicy::PublicOnly => visibility == Visibility::Public,
            VisibilityPolicy::IncludePackage => visibility != Visibility::Private,
            VisibilityPolicy::All => true,
        }
    }
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        VisibilityPolicy::PublicOnly
    }
}

/// A literal value the catalogue presets for a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Integer(i128),
    Float(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
}

impl Eq for LiteralValue {}

impl std::hash::Hash for LiteralValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            LiteralValue::Null => 0u8.hash(state),
            LiteralValue::Boolean(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            LiteralValue::Integer(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            LiteralValue::Float(f) => {
                3u8.hash(state);
                f.to_bits().hash(state);
            }
            LiteralValue::Char(c) => {
                4u8.hash(state);
                c.hash(state);
            }
            LiteralValue::String(s) => {
                5u8.hash(state);
                s.hash(state);
            }
            LiteralValue::Bytes(v) => {
                6u8.hash(state);
                v.hash(state);
            }
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => write!(f, "null"),
            LiteralValue::Boolean(b) => write!(f, "{}", b),
            LiteralValue::Integer(i) => write!(f, "{}", i),
            LiteralValue::Float(x) => write!(f, "{:?}", x),
            LiteralValue::Char(c) => write!(f, "{:?}", c),
            LiteralValue::String(s) => write!(f, "{:?}", s),
            LiteralValue::Bytes(v) => write!(f, "{:?}", v),
        }
    }
}

/// A ready-made way to obtain a value: a literal or a reference to a variable
/// the caller already has in scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preset {
    Literal(LiteralValue),
    Variable(String),
}

impl Preset {
    pub fn is_null(&self) -> bool {
        matches!(self, Preset::Literal(LiteralValue::Null))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Literal(value) => write!(f, "{}", value),
            Preset::Variable(name) => write!(f, "${}", name),
        }
    }
}

/// Handle to a constructing operation
///
/// The engine treats the handle as opaque apart from the accessors below.
pub trait OperationHandle: Clone + fmt::Debug + Send + Sync {
    /// Type that declares the operation (and the receiver type when one is needed)
    fn declaring_type(&self) -> &TypeName;

    /// Declared parameter types, in call order, excluding any receiver
    fn parameter_types(&self) -> &[TypeName];

    /// Whether the operation needs a receiver or enclosing instance
    fn needs_receiver(&self) -> bool;

    /// Stable identity of the operation, unique within a catalogue
    fn signature(&self) -> String;

    /// Declared argument count, excluding any receiver
    fn arity(&self) -> usize {
        self.parameter_types().len()
    }

    /// Type the receiver position is built from
    fn receiver_type(&self) -> &TypeName {
        self.declaring_type()
    }
}

/// Source of types, presets and constructing operations
pub trait Catalogue {
    type Operation: OperationHandle;

    /// Presets for `ty`, already filtered by `filter`
    fn literals_for(&self, ty: &TypeName, filter: NullFilter) -> Vec<Preset>;

    /// Constructing operations producing `ty` that `visibility` permits
    fn constructing_operations_for(
        &self,
        ty: &TypeName,
        visibility: VisibilityPolicy,
    ) -> Vec<Self::Operation>;

    /// Known subtypes of `ty`
    fn subtypes_of(&self, ty: &TypeName) -> Vec<TypeName>;
}
