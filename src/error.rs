//! Error types for plan-space construction and querying
//!
//! Every failure the engine can report is a [`PlanError`]. Errors fall into
//! three classes, exposed through [`PlanError::kind`]:
//!
//! - **Precondition**: the caller passed something invalid (an index outside
//!   `[0, size)`, an unknown type, an operation whose arity disagrees with its
//!   argument spaces, an empty type name from the catalogue). Never retried.
//! - **IllegalState**: the engine's own bookkeeping disagrees with itself.
//!   The current planning run must be abandoned.
//! - **NotReady**: the [`Allocator`](crate::allocator::Allocator) was queried
//!   before a successful `choose`.

use num_bigint::{BigInt, BigUint};

/// Result type for plan-space operations
pub type PlanResult<T> = Result<T, PlanError>;

/// Coarse classification of a [`PlanError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Precondition,
    IllegalState,
    NotReady,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Precondition => write!(f, "precondition"),
            ErrorKind::IllegalState => write!(f, "illegal state"),
            ErrorKind::NotReady => write!(f, "not ready"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("index {index} is outside [0, {size})")]
    IndexOutOfRange { index: BigInt, size: BigUint },

    #[error("operation {operation} declares {declared} arguments but {reconstructed} were reconstructed")]
    ArityMismatch {
        operation: String,
        declared: usize,
        reconstructed: usize,
    },

    #[error("type {0} was not built in this plan space")]
    UnknownType(String),

    #[error("type position {position} is outside the {count} allocated types")]
    TypePositionOutOfRange { position: usize, count: usize },

    #[error("catalogue is missing a required field: {0}")]
    MissingCatalogueField(String),

    #[error("invalid budget: {0}")]
    InvalidBudget(String),

    #[error("cumulative bound table is inconsistent: index {index} exceeds every bound (size {size})")]
    InconsistentBounds { index: BigUint, size: BigUint },

    #[error("allocator has not chosen sample counts yet")]
    NotReady,
}

impl PlanError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlanError::IndexOutOfRange { .. }
            | PlanError::ArityMismatch { .. }
            | PlanError::UnknownType(_)
            | PlanError::TypePositionOutOfRange { .. }
            | PlanError::MissingCatalogueField(_)
            | PlanError::InvalidBudget(_) => ErrorKind::Precondition,
            PlanError::InconsistentBounds { .. } => ErrorKind::IllegalState,
            PlanError::NotReady => ErrorKind::NotReady,
        }
    }

    pub(crate) fn out_of_range(index: &BigUint, size: &BigUint) -> Self {
        PlanError::IndexOutOfRange {
            index: BigInt::from(index.clone()),
            size: size.clone(),
        }
    }
}
