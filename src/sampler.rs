//! Seeded uniform sampling of plan indices
//!
//! Indices are drawn with `ChaCha8Rng` so a given seed reproduces the same
//! samples on every platform.

use std::ops::Range;

use num_bigint::{BigUint, RandBigInt};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::allocator::Allocator;
use crate::catalogue::OperationHandle;
use crate::error::{PlanError, PlanResult};
use crate::space::{ChoiceSpace, ConstructionTree};

#[derive(Debug, Clone)]
pub struct IndexSampler {
    rng: ChaCha8Rng,
}

impl IndexSampler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniformly random index in `range`
    pub fn sample_range(&mut self, range: &Range<BigUint>) -> PlanResult<BigUint> {
        if range.start >= range.end {
            return Err(PlanError::out_of_range(&range.start, &range.end));
        }
        Ok(self.rng.gen_biguint_range(&range.start, &range.end))
    }

    /// Uniformly random plan from the sub-range `range` of `space`
    pub fn sample_space<O: OperationHandle>(
        &mut self,
        space: &ChoiceSpace<O>,
        range: &Range<BigUint>,
    ) -> PlanResult<(BigUint, ConstructionTree<O>)> {
        if &range.end > space.size() {
            return Err(PlanError::out_of_range(&range.end, space.size()));
        }
        let index = self.sample_range(range)?;
        let plan = space.plan(&index)?;
        Ok((index, plan))
    }

    /// One index per selected sample of the type at `position`, each drawn
    /// uniformly from its own stratum
    pub fn stratified_indices(
        &mut self,
        allocator: &Allocator,
        position: usize,
    ) -> PlanResult<Vec<BigUint>> {
        let count = allocator
            .selected_counts()?
            .get(position)
            .copied()
            .ok_or(PlanError::TypePositionOutOfRange {
                position,
                count: allocator.selected_counts()?.len(),
            })?;

        let mut indices = Vec::with_capacity(count as usize);
        for local in 0..count {
            let stratum = allocator.stratum(position, &BigUint::from(local))?;
            indices.push(self.sample_range(&stratum)?);
        }
        Ok(indices)
    }
}
