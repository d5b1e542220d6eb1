//! Sample allocation across several plan spaces
//!
//! Given one root space per type and a budget of `global_budget *
//! per_type_budget` samples, the allocator decides how many plans to take from
//! each space:
//!
//! - **Exhaustive**: when every space together holds no more plans than the
//!   budget, every plan of every space is selected.
//! - **Sampling**: otherwise every space gets a share proportional to its size,
//!   `floor(available / factor)` with `factor = total / budget`, and at least
//!   one sample if it has any plans. A local sample index `l` is projected to
//!   the global index `floor(l * factor)`, which spreads samples evenly across
//!   the whole space instead of clustering them at the low indices.

use std::ops::Range;
use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::cardinality::{Cardinality, ScalingFactor};
use crate::catalogue::{OperationHandle, TypeName};
use crate::error::{PlanError, PlanResult};
use crate::space::ChoiceSpace;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Allocation {
    available: Vec<Cardinality>,
    selected: Vec<u64>,
    factor: ScalingFactor,
    exhaustive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AllocationState {
    Unchosen,
    Chosen(Allocation),
}

/// Per-type sample counts and index projection
#[derive(Debug, Clone)]
pub struct Allocator {
    state: AllocationState,
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator {
    pub fn new() -> Self {
        Self {
            state: AllocationState::Unchosen,
        }
    }

    pub fn is_chosen(&self) -> bool {
        matches!(self.state, AllocationState::Chosen(_))
    }

    /// Allocate samples across `spaces`; may be called again to reallocate
    pub fn choose<O: OperationHandle>(
        &mut self,
        spaces: &[(TypeName, Arc<ChoiceSpace<O>>)],
        global_budget: u64,
        per_type_budget: u64,
    ) -> PlanResult<()> {
        let available = spaces.iter().map(|(_, space)| space.size().clone()).collect();
        self.choose_sizes(available, global_budget, per_type_budget)
    }

    /// Allocate samples across spaces of the given sizes
    pub fn choose_sizes(
        &mut self,
        available: Vec<Cardinality>,
        global_budget: u64,
        per_type_budget: u64,
    ) -> PlanResult<()> {
        if global_budget == 0 || per_type_budget == 0 {
            return Err(PlanError::InvalidBudget(format!(
                "budgets must be positive (global {}, per type {})",
                global_budget, per_type_budget
            )));
        }
        let budget = global_budget.checked_mul(per_type_budget).ok_or_else(|| {
            PlanError::InvalidBudget(format!(
                "global budget {} times per-type budget {} overflows",
                global_budget, per_type_budget
            ))
        })?;

        let total: BigUint = available.iter().sum();

        let allocation = if total <= BigUint::from(budget) {
            log::info!(
                "Selecting all {} plans across {} types (budget {})",
                total,
                available.len(),
                budget
            );
            // Each size is at most the total, which fits the budget
            let selected = available.iter().map(|a| a.to_u64().unwrap_or(budget)).collect();
            Allocation {
                available,
                selected,
                factor: ScalingFactor::identity(),
                exhaustive: true,
            }
        } else {
            let factor = ScalingFactor::new(total.clone(), BigUint::from(budget))?;
            log::info!(
                "Sampling {} of {} plans across {} types (factor {})",
                budget,
                total,
                available.len(),
                factor
            );

            let mut selected: Vec<u64> = available
                .iter()
                .map(|a| {
                    let share = factor.divide(a).to_u64().unwrap_or(budget);
                    if share == 0 && !a.is_zero() {
                        1
                    } else {
                        share
                    }
                })
                .collect();
            trim_to_budget(&mut selected, budget);

            let chosen: BigUint = selected.iter().map(|&s| BigUint::from(s)).sum();
            Allocation {
                exhaustive: chosen == total,
                available,
                selected,
                factor,
            }
        };

        self.state = AllocationState::Chosen(allocation);
        Ok(())
    }

    fn allocation(&self) -> PlanResult<&Allocation> {
        match &self.state {
            AllocationState::Chosen(allocation) => Ok(allocation),
            AllocationState::Unchosen => Err(PlanError::NotReady),
        }
    }

    fn checked_position(&self, position: usize) -> PlanResult<&Allocation> {
        let allocation = self.allocation()?;
        if position >= allocation.selected.len() {
            return Err(PlanError::TypePositionOutOfRange {
                position,
                count: allocation.selected.len(),
            });
        }
        Ok(allocation)
    }

    /// Samples per type, aligned with the order passed to `choose`
    pub fn selected_counts(&self) -> PlanResult<&[u64]> {
        Ok(&self.allocation()?.selected)
    }

    pub fn available(&self) -> PlanResult<&[Cardinality]> {
        Ok(&self.allocation()?.available)
    }

    /// Sum of the selected counts
    ///
    /// After trimming the sum is at most the budget, or the number of types
    /// when every type is down to one sample, so it fits in a `u64`.
    pub fn total_selected(&self) -> PlanResult<u64> {
        Ok(self
            .allocation()?
            .selected
            .iter()
            .fold(0u64, |total, &count| total.saturating_add(count)))
    }

    /// Whether every available plan of every type was selected
    pub fn is_exhaustive(&self) -> PlanResult<bool> {
        Ok(self.allocation()?.exhaustive)
    }

    pub fn factor(&self) -> PlanResult<&ScalingFactor> {
        Ok(&self.allocation()?.factor)
    }

    /// Global index of local sample `local` of the type at `position`
    pub fn project_index(&self, position: usize, local: &BigUint) -> PlanResult<Cardinality> {
        let allocation = self.checked_position(position)?;
        let selected = BigUint::from(allocation.selected[position]);
        if local >= &selected {
            return Err(PlanError::out_of_range(local, &selected));
        }
        Ok(allocation.factor.scale(local))
    }

    /// Range of global indices that local sample `local` stands for
    ///
    /// Picking uniformly inside the stratum instead of taking its start keeps
    /// sampling unbiased while preserving the even spread.
    pub fn stratum(&self, position: usize, local: &BigUint) -> PlanResult<Range<Cardinality>> {
        let start = self.project_index(position, local)?;
        let allocation = self.allocation()?;
        let available = &allocation.available[position];
        let mut end = allocation.factor.scale(&(local + 1u32));
        if &end > available {
            end = available.clone();
        }
        Ok(start..end)
    }

    /// Projected global indices for every sample of the type at `position`
    pub fn sample_indices(
        &self,
        position: usize,
    ) -> PlanResult<impl Iterator<Item = Cardinality> + '_> {
        let allocation = self.checked_position(position)?;
        let factor = &allocation.factor;
        Ok((0..allocation.selected[position])
            .map(move |local| factor.scale(&BigUint::from(local))))
    }
}

/// Take samples back from the largest shares until the total fits `budget`
///
/// Rounding shares up to one sample for tiny spaces can overshoot the budget by
/// at most the number of types.
///
/// The running sum is taken in `u128`: every share is at most `budget`, so
/// the bumped total can exceed `u64::MAX` when the budget sits near it.
fn trim_to_budget(selected: &mut [u64], budget: u64) {
    let sum: u128 = selected.iter().map(|&count| u128::from(count)).sum();
    if sum <= u128::from(budget) {
        return;
    }
    let mut excess = sum - u128::from(budget);

    let mut order: Vec<usize> = (0..selected.len()).collect();
    order.sort_by(|&a, &b| selected[b].cmp(&selected[a]).then(a.cmp(&b)));
    for pos in order {
        if excess == 0 {
            break;
        }
        let spare = selected[pos].saturating_sub(1);
        // Bounded by `spare`, so the narrowing is lossless
        let take = u128::from(spare).min(excess) as u64;
        selected[pos] -= take;
        excess -= u128::from(take);
    }

    if excess > 0 {
        log::warn!(
            "{} non-empty types exceed the sample budget of {}; keeping one sample each",
            selected.iter().filter(|&&s| s > 0).count(),
            budget
        );
    }
}
