//! Exact arithmetic over plan-space sizes
//!
//! Sizes of construction spaces grow as products of products and leave the
//! native integer range after a handful of chaining levels, so every size and
//! index in this crate is a [`BigUint`].

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};

/// Number of plans in a space
pub type Cardinality = BigUint;

/// Convert a signed caller-supplied index into a checked unsigned one.
///
/// Negative indices are rejected with the same error as indices past the end.
pub fn checked_index(index: &BigInt, size: &Cardinality) -> PlanResult<BigUint> {
    match index.to_biguint() {
        Some(unsigned) if &unsigned < size => Ok(unsigned),
        _ => Err(PlanError::IndexOutOfRange {
            index: index.clone(),
            size: size.clone(),
        }),
    }
}

/// Exact non-negative rational `numerator / denominator`
///
/// Used by the allocator to stretch a small dense run of local sample indices
/// across a huge global space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingFactor {
    numerator: BigUint,
    denominator: BigUint,
}

impl ScalingFactor {
    /// Build `numerator / denominator`. The denominator must be non-zero.
    pub fn new(numerator: BigUint, denominator: BigUint) -> PlanResult<Self> {
        if denominator.is_zero() {
            return Err(PlanError::InvalidBudget(
                "scaling factor denominator is zero".to_string(),
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// The factor 1/1
    pub fn identity() -> Self {
        Self {
            numerator: BigUint::one(),
            denominator: BigUint::one(),
        }
    }

    pub fn numerator(&self) -> &BigUint {
        &self.numerator
    }

    pub fn denominator(&self) -> &BigUint {
        &self.denominator
    }

    pub fn is_identity(&self) -> bool {
        self.numerator == self.denominator
    }

    /// `floor(value * self)`
    pub fn scale(&self, value: &BigUint) -> BigUint {
        (value * &self.numerator) / &self.denominator
    }

    /// `floor(value / self)`
    pub fn divide(&self, value: &BigUint) -> BigUint {
        if self.numerator.is_zero() {
            return BigUint::zero();
        }
        (value * &self.denominator) / &self.numerator
    }
}

impl std::fmt::Display for ScalingFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
