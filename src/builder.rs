//! Catalogue traversal: building choice spaces
//!
//! `SpaceBuilder` walks the catalogue from a type downward, producing one
//! [`ChoiceSpace`] per (type, remaining depth, null filter, visibility) key.
//! Spaces for a key are built once per run and shared through `Arc`, which keeps
//! the walk linear in the number of distinct keys even though the resulting
//! plan space is exponentially large.
//!
//! For a type `T` at remaining depth `D` with null filter `F`:
//!
//! 1. the leaf space holds `T`'s presets admitted by `F`
//! 2. at `D = 0` nothing else is added; this is what makes cyclic catalogues
//!    ("an X is built from an X") terminate
//! 3. otherwise every constructing operation of `T` and of each known subtype
//!    of `T` becomes a call space whose positions are built at `D - 1`; a
//!    receiver position gets `F` narrowed (never null), every other position
//!    gets `F` widened (null allowed)

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::catalogue::{Catalogue, NullFilter, OperationHandle, TypeName, VisibilityPolicy};
use crate::error::{PlanError, PlanResult};
use crate::space::{CallSpace, ChoiceSpace, LeafSpace};

/// Cache key identifying one choice space within a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpaceKey {
    pub ty: TypeName,
    pub depth: usize,
    pub null_filter: NullFilter,
    pub visibility: VisibilityPolicy,
}

/// Counters collected while building spaces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpaceStats {
    pub choice_spaces: usize,
    pub call_spaces: usize,
    pub leaf_spaces: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
}

/// Per-run builder and cache of choice spaces
pub struct SpaceBuilder<'c, C: Catalogue> {
    catalogue: &'c C,
    visibility: VisibilityPolicy,
    cache: HashMap<SpaceKey, Arc<ChoiceSpace<C::Operation>>>,
    stats: SpaceStats,
}

impl<'c, C: Catalogue> SpaceBuilder<'c, C> {
    pub fn new(catalogue: &'c C, visibility: VisibilityPolicy) -> Self {
        Self {
            catalogue,
            visibility,
            cache: HashMap::new(),
            stats: SpaceStats::default(),
        }
    }

    pub fn stats(&self) -> &SpaceStats {
        &self.stats
    }

    /// Number of distinct spaces built so far
    pub fn cached_spaces(&self) -> usize {
        self.cache.len()
    }

    /// Build (or fetch from the run cache) the choice space for `ty`
    pub fn build(
        &mut self,
        ty: &TypeName,
        depth: usize,
        null_filter: NullFilter,
    ) -> PlanResult<Arc<ChoiceSpace<C::Operation>>> {
        if ty.is_empty() {
            return Err(PlanError::MissingCatalogueField("type name".to_string()));
        }

        let key = SpaceKey {
            ty: ty.clone(),
            depth,
            null_filter,
            visibility: self.visibility,
        };
        if let Some(space) = self.cache.get(&key) {
            self.stats.cache_hits += 1;
            return Ok(Arc::clone(space));
        }
        self.stats.cache_misses += 1;

        let presets = self
            .catalogue
            .literals_for(ty, null_filter)
            .into_iter()
            .filter(|preset| null_filter.admits(preset))
            .collect();
        let leaf = LeafSpace::new(presets);
        self.stats.leaf_spaces += 1;

        let mut calls = Vec::new();
        if depth > 0 {
            for candidate in self.type_and_subtypes(ty) {
                let operations = self
                    .catalogue
                    .constructing_operations_for(&candidate, self.visibility);
                for operation in operations {
                    calls.push(self.build_call(operation, depth - 1, null_filter)?);
                }
            }
        }

        let space = Arc::new(ChoiceSpace::new(
            ty.clone(),
            depth,
            null_filter,
            self.visibility,
            leaf,
            calls,
        ));
        self.stats.choice_spaces += 1;
        self.cache.insert(key, Arc::clone(&space));
        Ok(space)
    }

    fn build_call(
        &mut self,
        operation: C::Operation,
        depth: usize,
        null_filter: NullFilter,
    ) -> PlanResult<CallSpace<C::Operation>> {
        let mut children = Vec::with_capacity(operation.arity() + 1);
        if operation.needs_receiver() {
            let receiver_type = operation.receiver_type().clone();
            if receiver_type.is_empty() {
                return Err(PlanError::MissingCatalogueField(format!(
                    "receiver type of {}",
                    operation.signature()
                )));
            }
            children.push(self.build(&receiver_type, depth, null_filter.narrow())?);
        }
        for (position, parameter) in operation.parameter_types().iter().enumerate() {
            if parameter.is_empty() {
                return Err(PlanError::MissingCatalogueField(format!(
                    "parameter {} of {}",
                    position,
                    operation.signature()
                )));
            }
            children.push(self.build(parameter, depth, null_filter.widen())?);
        }

        self.stats.call_spaces += 1;
        Ok(CallSpace::new(operation, children))
    }

    /// `ty` followed by every subtype reachable from it, breadth first, each once
    fn type_and_subtypes(&self, ty: &TypeName) -> Vec<TypeName> {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(ty.clone());

        while let Some(next) = queue.pop_front() {
            if !seen.insert(next.clone()) {
                continue;
            }
            for subtype in self.catalogue.subtypes_of(&next) {
                if !seen.contains(&subtype) {
                    queue.push_back(subtype);
                }
            }
            ordered.push(next);
        }
        ordered
    }
}
