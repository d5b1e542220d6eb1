//! Plan spaces
//!
//! A plan space is a tree of three node kinds:
//!
//! - [`LeafSpace`]: the preset values of a type
//! - [`CallSpace`]: one constructing operation, the product of its argument spaces
//! - [`ChoiceSpace`]: every way to obtain a type, the sum of a leaf and call spaces
//!
//! Every node is sized when it is constructed and is immutable afterwards, so
//! `size()` is a field read and `plan(index)` is a pure walk from the node down
//! to the leaves, one step per level of chaining.

mod call;
mod choice;
mod leaf;
mod tree;

use num_bigint::BigUint;

pub use self::call::CallSpace;
pub use self::choice::ChoiceSpace;
pub use self::leaf::LeafSpace;
pub use self::tree::ConstructionTree;

use crate::cardinality::Cardinality;
use crate::catalogue::OperationHandle;
use crate::error::PlanResult;

/// A child of a choice space
///
/// Choice spaces only ever appear as the shared (`Arc`) children of call
/// spaces and as roots, so they are not a variant here.
#[derive(Debug, Clone)]
pub enum SpaceNode<O> {
    Leaf(LeafSpace),
    Call(CallSpace<O>),
}

impl<O: OperationHandle> SpaceNode<O> {
    pub fn size(&self) -> &Cardinality {
        match self {
            SpaceNode::Leaf(leaf) => leaf.size(),
            SpaceNode::Call(call) => call.size(),
        }
    }

    pub fn plan(&self, index: &BigUint) -> PlanResult<ConstructionTree<O>> {
        match self {
            SpaceNode::Leaf(leaf) => leaf.plan(index),
            SpaceNode::Call(call) => call.plan(index),
        }
    }
}
