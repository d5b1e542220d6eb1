//! Choice spaces: every way to obtain a value of one type
//!
//! A choice space is the disjoint union of its children: the type's leaf space
//! first, then one call space per applicable constructing operation. Its size is
//! the sum of the children's sizes, and a flat index is routed to a child by
//! looking it up in the table of cumulative bounds.
//!
//! ```text
//! children:  [ Leaf(3) | Call(0) | Call(4) ]
//! ends:      [   3     |   3     |   7     ]
//! index 5 -> child 2, local index 5 - 3 = 2
//! ```

use num_bigint::BigUint;
use num_traits::Zero;

use super::{CallSpace, ConstructionTree, LeafSpace, SpaceNode};
use crate::cardinality::Cardinality;
use crate::catalogue::{NullFilter, OperationHandle, TypeName, VisibilityPolicy};
use crate::error::{PlanError, PlanResult};

#[derive(Debug, Clone)]
pub struct ChoiceSpace<O> {
    ty: TypeName,
    depth: usize,
    null_filter: NullFilter,
    visibility: VisibilityPolicy,
    children: Vec<SpaceNode<O>>,
    /// `ends[k]` is one past the last global index owned by child `k`
    ends: Vec<BigUint>,
    size: Cardinality,
}

impl<O: OperationHandle> ChoiceSpace<O> {
    /// Combine a leaf space and call spaces, leaf first, and size the result
    pub fn new(
        ty: TypeName,
        depth: usize,
        null_filter: NullFilter,
        visibility: VisibilityPolicy,
        leaf: LeafSpace,
        calls: Vec<CallSpace<O>>,
    ) -> Self {
        let mut children = Vec::with_capacity(calls.len() + 1);
        children.push(SpaceNode::Leaf(leaf));
        children.extend(calls.into_iter().map(SpaceNode::Call));

        let mut ends = Vec::with_capacity(children.len());
        let mut running = BigUint::zero();
        for child in &children {
            running += child.size();
            ends.push(running.clone());
        }

        log::debug!(
            "Sized choice space for {} at depth {} ({:?}): {} children, {} plans",
            ty,
            depth,
            null_filter,
            children.len(),
            running
        );

        Self {
            ty,
            depth,
            null_filter,
            visibility,
            children,
            ends,
            size: running,
        }
    }

    pub fn ty(&self) -> &TypeName {
        &self.ty
    }

    /// Remaining chaining depth this space was built with
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn null_filter(&self) -> NullFilter {
        self.null_filter
    }

    pub fn visibility(&self) -> VisibilityPolicy {
        self.visibility
    }

    pub fn children(&self) -> &[SpaceNode<O>] {
        &self.children
    }

    pub fn leaf(&self) -> Option<&LeafSpace> {
        match self.children.first() {
            Some(SpaceNode::Leaf(leaf)) => Some(leaf),
            _ => None,
        }
    }

    pub fn calls(&self) -> impl Iterator<Item = &CallSpace<O>> {
        self.children.iter().filter_map(|child| match child {
            SpaceNode::Call(call) => Some(call),
            _ => None,
        })
    }

    /// Inclusive upper bound of each child's index range
    ///
    /// Children with no plans repeat the previous bound. A bound of `None`
    /// stands for `-1` (a zero-sized prefix).
    pub fn cumulative_bounds(&self) -> Vec<Option<BigUint>> {
        self.ends
            .iter()
            .map(|end| {
                if end.is_zero() {
                    None
                } else {
                    Some(end - 1u32)
                }
            })
            .collect()
    }

    pub fn size(&self) -> &Cardinality {
        &self.size
    }

    /// Find the child owning `index` and the index local to that child
    pub fn locate(&self, index: &BigUint) -> PlanResult<(usize, BigUint)> {
        if index >= &self.size {
            return Err(PlanError::out_of_range(index, &self.size));
        }

        let position = self.ends.partition_point(|end| end <= index);
        if position >= self.children.len() {
            log::error!(
                "Index {} fell past every bound of {} (size {})",
                index,
                self.ty,
                self.size
            );
            return Err(PlanError::InconsistentBounds {
                index: index.clone(),
                size: self.size.clone(),
            });
        }

        let local = match position {
            0 => index.clone(),
            _ => index - &self.ends[position - 1],
        };
        Ok((position, local))
    }

    pub fn plan(&self, index: &BigUint) -> PlanResult<ConstructionTree<O>> {
        let (position, local) = self.locate(index)?;
        self.children[position].plan(&local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{LiteralValue, Operation, Preset};
    use std::sync::Arc;

    fn ints(ty: &str, values: &[i128]) -> ChoiceSpace<Operation> {
        let presets = values
            .iter()
            .map(|v| Preset::Literal(LiteralValue::Integer(*v)))
            .collect();
        ChoiceSpace::new(
            TypeName::from(ty),
            0,
            NullFilter::Forbid,
            VisibilityPolicy::PublicOnly,
            LeafSpace::new(presets),
            Vec::new(),
        )
    }

    fn boxed_space() -> ChoiceSpace<Operation> {
        let int = Arc::new(ints("int", &[0, 1]));
        let empty = Arc::new(ints("never", &[]));
        let wrap = Operation::constructor("Box", vec![TypeName::from("int")]);
        let broken = Operation::constructor("Box", vec![TypeName::from("never")]);
        let pair = Operation::factory(
            "Box",
            "pair",
            vec![TypeName::from("int"), TypeName::from("int")],
            "Box",
        );

        ChoiceSpace::new(
            TypeName::from("Box"),
            1,
            NullFilter::Forbid,
            VisibilityPolicy::PublicOnly,
            LeafSpace::new(vec![Preset::Variable("b".to_string())]),
            vec![
                CallSpace::new(wrap, vec![int.clone()]),
                CallSpace::new(broken, vec![empty]),
                CallSpace::new(pair, vec![int.clone(), int]),
            ],
        )
    }

    #[test]
    fn test_sum_cardinality_and_bounds() {
        let space = boxed_space();
        assert_eq!(space.size(), &BigUint::from(7u32));
        assert_eq!(
            space.cumulative_bounds(),
            vec![
                Some(BigUint::from(0u32)),
                Some(BigUint::from(2u32)),
                Some(BigUint::from(2u32)),
                Some(BigUint::from(6u32)),
            ]
        );
        assert_eq!(space.calls().count(), 3);
        assert!(space.leaf().is_some());
    }

    #[test]
    fn test_locate_skips_empty_children() {
        let space = boxed_space();
        let expect = [(0, 0u32), (1, 0), (1, 1), (3, 0), (3, 1), (3, 2), (3, 3)];
        for (index, (child, local)) in expect.iter().enumerate() {
            let located = space.locate(&BigUint::from(index)).unwrap();
            assert_eq!(located, (*child, BigUint::from(*local)));
        }
        assert!(space.locate(&BigUint::from(7u32)).is_err());
    }

    #[test]
    fn test_plan_routes_to_children() {
        let space = boxed_space();
        assert_eq!(
            space.plan(&BigUint::from(0u32)).unwrap(),
            ConstructionTree::Variable("b".to_string())
        );
        match space.plan(&BigUint::from(5u32)).unwrap() {
            ConstructionTree::Apply { operation, arguments, .. } => {
                assert_eq!(operation.name(), "pair");
                assert_eq!(
                    arguments,
                    vec![
                        ConstructionTree::Literal(LiteralValue::Integer(1)),
                        ConstructionTree::Literal(LiteralValue::Integer(0)),
                    ]
                );
            }
            other => panic!("expected an application, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_choice_space() {
        let space = ints("never", &[]);
        assert!(space.size().is_zero());
        assert_eq!(space.cumulative_bounds(), vec![None]);
        assert!(space.plan(&BigUint::from(0u32)).is_err());
    }
}
