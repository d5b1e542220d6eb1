//! Leaf spaces: the preset values of a type

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use super::ConstructionTree;
use crate::cardinality::Cardinality;
use crate::catalogue::Preset;
use crate::error::{PlanError, PlanResult};

/// Fixed list of presets; index `i` is `presets[i]`
#[derive(Debug, Clone, PartialEq)]
pub struct LeafSpace {
    presets: Vec<Preset>,
    size: Cardinality,
}

impl LeafSpace {
    pub fn new(presets: Vec<Preset>) -> Self {
        let size = BigUint::from(presets.len());
        Self { presets, size }
    }

    pub fn size(&self) -> &Cardinality {
        &self.size
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn plan<O>(&self, index: &BigUint) -> PlanResult<ConstructionTree<O>> {
        index
            .to_usize()
            .and_then(|i| self.presets.get(i))
            .map(ConstructionTree::from_preset)
            .ok_or_else(|| PlanError::out_of_range(index, &self.size))
    }
}
