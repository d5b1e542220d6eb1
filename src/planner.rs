//! Planner: the per-run entry point
//!
//! A [`Planner`] owns the configuration of one planning run and borrows the
//! caller's catalogue. [`Planner::build`] walks the catalogue once for a set of
//! root types and returns a [`PlanSpace`]: an immutable, fully sized view that
//! answers `size(type)` and `plan(type, index)` and can be shared across
//! threads.

use std::collections::HashMap;
use std::sync::Arc;

use num_bigint::BigInt;
use sha2::{Digest, Sha256};

use crate::allocator::Allocator;
use crate::builder::{SpaceBuilder, SpaceStats};
use crate::cardinality::{checked_index, Cardinality};
use crate::catalogue::{Catalogue, OperationHandle, TypeName};
use crate::config::PlannerConfig;
use crate::error::{PlanError, PlanResult};
use crate::sampler::IndexSampler;
use crate::space::{ChoiceSpace, ConstructionTree, SpaceNode};

pub struct Planner<'c, C: Catalogue> {
    catalogue: &'c C,
    config: PlannerConfig,
}

impl<'c, C: Catalogue> Planner<'c, C> {
    pub fn new(catalogue: &'c C, config: PlannerConfig) -> Self {
        Self { catalogue, config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Build one root space per type in `roots`, in the given order
    pub fn build(&self, roots: &[TypeName]) -> PlanResult<PlanSpace<C::Operation>> {
        let mut builder = SpaceBuilder::new(self.catalogue, self.config.visibility);
        let mut spaces: Vec<(TypeName, Arc<ChoiceSpace<C::Operation>>)> =
            Vec::with_capacity(roots.len());
        for ty in roots {
            if spaces.iter().any(|(known, _)| known == ty) {
                continue;
            }
            let space = builder.build(ty, self.config.max_depth, self.config.root_null_filter)?;
            log::debug!("Root space for {} has {} plans", ty, space.size());
            spaces.push((ty.clone(), space));
        }

        let stats = builder.stats().clone();
        log::info!(
            "Built {} root spaces: {} choice, {} call, {} leaf spaces ({} cache hits)",
            spaces.len(),
            stats.choice_spaces,
            stats.call_spaces,
            stats.leaf_spaces,
            stats.cache_hits
        );

        Ok(PlanSpace::new(spaces, stats, self.config.clone()))
    }
}

/// One plan picked by [`PlanSpace::select`]
#[derive(Debug, Clone, PartialEq)]
pub struct SampledPlan<O> {
    pub ty: TypeName,
    pub index: Cardinality,
    pub plan: ConstructionTree<O>,
}

/// Immutable set of sized root spaces produced by one planning run
///
/// Keeps the run's configuration so the default budgets and seed travel with
/// the spaces they were chosen for.
#[derive(Debug, Clone)]
pub struct PlanSpace<O> {
    roots: Vec<(TypeName, Arc<ChoiceSpace<O>>)>,
    positions: HashMap<TypeName, usize>,
    stats: SpaceStats,
    config: PlannerConfig,
}

impl<O: OperationHandle> PlanSpace<O> {
    fn new(
        roots: Vec<(TypeName, Arc<ChoiceSpace<O>>)>,
        stats: SpaceStats,
        config: PlannerConfig,
    ) -> Self {
        let positions = roots
            .iter()
            .enumerate()
            .map(|(pos, (ty, _))| (ty.clone(), pos))
            .collect();
        Self {
            roots,
            positions,
            stats,
            config,
        }
    }

    /// Root types in build order
    pub fn types(&self) -> Vec<&TypeName> {
        self.roots.iter().map(|(ty, _)| ty).collect()
    }

    /// Root spaces in build order, as the allocator consumes them
    pub fn roots(&self) -> &[(TypeName, Arc<ChoiceSpace<O>>)] {
        &self.roots
    }

    pub fn stats(&self) -> &SpaceStats {
        &self.stats
    }

    /// Configuration the spaces were built with
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn space(&self, ty: &TypeName) -> PlanResult<&Arc<ChoiceSpace<O>>> {
        self.positions
            .get(ty)
            .map(|&pos| &self.roots[pos].1)
            .ok_or_else(|| PlanError::UnknownType(ty.to_string()))
    }

    pub fn size(&self, ty: &TypeName) -> PlanResult<Cardinality> {
        Ok(self.space(ty)?.size().clone())
    }

    /// The plan at `index` in `ty`'s canonical order
    pub fn plan(&self, ty: &TypeName, index: &BigInt) -> PlanResult<ConstructionTree<O>> {
        let space = self.space(ty)?;
        let index = checked_index(index, space.size())?;
        space.plan(&index)
    }

    /// Run the allocator over every root space with the given budgets
    pub fn allocate(&self, global_budget: u64, per_type_budget: u64) -> PlanResult<Allocator> {
        let mut allocator = Allocator::new();
        allocator.choose(&self.roots, global_budget, per_type_budget)?;
        Ok(allocator)
    }

    /// Run the allocator with the configured budgets
    pub fn allocate_default(&self) -> PlanResult<Allocator> {
        self.allocate(self.config.global_budget, self.config.per_type_budget)
    }

    /// A fresh sampler seeded from the configuration
    pub fn sampler(&self) -> IndexSampler {
        IndexSampler::new(self.config.seed)
    }

    /// Allocate with the configured budgets and draw the selected plans with
    /// the configured seed
    ///
    /// Repeated calls return the same plans.
    pub fn sample_plans(&self) -> PlanResult<Vec<SampledPlan<O>>> {
        let allocator = self.allocate_default()?;
        let mut sampler = self.sampler();
        self.select(&allocator, Some(&mut sampler))
    }

    /// Materialize the plans an allocation selects, type by type
    ///
    /// Without a sampler each sample sits at the start of its stratum, which is
    /// fully deterministic. With a sampler each sample is drawn uniformly from
    /// its stratum.
    pub fn select(
        &self,
        allocator: &Allocator,
        mut sampler: Option<&mut IndexSampler>,
    ) -> PlanResult<Vec<SampledPlan<O>>> {
        let counts = allocator.selected_counts()?;
        if counts.len() != self.roots.len() {
            return Err(PlanError::TypePositionOutOfRange {
                position: self.roots.len(),
                count: counts.len(),
            });
        }

        let exhaustive = allocator.is_exhaustive()?;
        let mut selected = Vec::with_capacity(allocator.total_selected()? as usize);
        for (position, (ty, space)) in self.roots.iter().enumerate() {
            let indices: Vec<Cardinality> = match sampler.as_deref_mut() {
                Some(sampler) if !exhaustive => sampler.stratified_indices(allocator, position)?,
                _ => allocator.sample_indices(position)?.collect(),
            };
            for index in indices {
                let plan = space.plan(&index)?;
                selected.push(SampledPlan {
                    ty: ty.clone(),
                    index,
                    plan,
                });
            }
        }
        log::debug!("Selected {} plans from {} types", selected.len(), self.roots.len());
        Ok(selected)
    }

    /// SHA-256 over the canonical structure of `ty`'s space, hex encoded
    ///
    /// Two runs whose fingerprints agree address identical plans by identical
    /// indices.
    pub fn fingerprint(&self, ty: &TypeName) -> PlanResult<String> {
        let space = self.space(ty)?;
        let mut hasher = Sha256::new();
        let mut visited = HashMap::new();
        hash_choice(space, &mut hasher, &mut visited);
        Ok(hex::encode(hasher.finalize()))
    }
}

fn hash_choice<O: OperationHandle>(
    space: &ChoiceSpace<O>,
    hasher: &mut Sha256,
    visited: &mut HashMap<*const ChoiceSpace<O>, usize>,
) {
    // Shared subspaces are hashed once and referenced by visit order afterwards
    let id = space as *const ChoiceSpace<O>;
    if let Some(order) = visited.get(&id) {
        hasher.update(format!("ref {};", order).as_bytes());
        return;
    }
    let order = visited.len();
    visited.insert(id, order);

    hasher.update(
        format!(
            "choice {} {} {:?} {};",
            space.ty(),
            space.depth(),
            space.null_filter(),
            space.size()
        )
        .as_bytes(),
    );
    for child in space.children() {
        match child {
            SpaceNode::Leaf(leaf) => {
                hasher.update(format!("leaf {};", leaf.size()).as_bytes());
                for preset in leaf.presets() {
                    hasher.update(format!("{};", preset).as_bytes());
                }
            }
            SpaceNode::Call(call) => {
                hasher.update(
                    format!("call {} {};", call.operation().signature(), call.size()).as_bytes(),
                );
                for argument in call.children() {
                    hash_choice(argument, hasher, visited);
                }
            }
        }
    }
}
