//! Call spaces: every way to apply one constructing operation
//!
//! A call space is the cartesian product of its argument-position spaces. With
//! child sizes `(c0, ..., ck-1)` the space has `c0 * ... * ck-1` plans and
//! index `i` decomposes in mixed radix, leftmost position slowest:
//!
//! ```text
//! stride[j] = c(j+1) * ... * c(k-1)        (stride[k-1] = 1)
//! child[j]  = (i mod stride[j-1]) / stride[j]
//! ```
//!
//! When the operation needs a receiver, the receiver occupies position 0 and
//! is split off from the arguments when the plan is assembled.

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::{ChoiceSpace, ConstructionTree};
use crate::cardinality::Cardinality;
use crate::catalogue::OperationHandle;
use crate::error::{PlanError, PlanResult};

#[derive(Debug, Clone)]
pub struct CallSpace<O> {
    operation: O,
    children: Vec<Arc<ChoiceSpace<O>>>,
    strides: Vec<BigUint>,
    size: Cardinality,
}

impl<O: OperationHandle> CallSpace<O> {
    /// Combine argument-position spaces for `operation`, sizing them in one pass
    pub fn new(operation: O, children: Vec<Arc<ChoiceSpace<O>>>) -> Self {
        let mut strides = Vec::new();
        let size = if children.iter().any(|child| child.size().is_zero()) {
            BigUint::zero()
        } else {
            strides = vec![BigUint::one(); children.len()];
            let mut running = BigUint::one();
            for (pos, child) in children.iter().enumerate().rev() {
                strides[pos] = running.clone();
                running *= child.size();
            }
            running
        };

        log::debug!(
            "Sized call space for {} with {} children: {}",
            operation.signature(),
            children.len(),
            size
        );

        Self {
            operation,
            children,
            strides,
            size,
        }
    }

    pub fn operation(&self) -> &O {
        &self.operation
    }

    pub fn children(&self) -> &[Arc<ChoiceSpace<O>>] {
        &self.children
    }

    /// Sub-space size below each position (the mixed-radix divisors)
    pub fn strides(&self) -> &[BigUint] {
        &self.strides
    }

    pub fn size(&self) -> &Cardinality {
        &self.size
    }

    /// Split `index` into one index per argument position
    pub fn decompose(&self, index: &BigUint) -> PlanResult<Vec<BigUint>> {
        if index >= &self.size {
            return Err(PlanError::out_of_range(index, &self.size));
        }

        let mut remaining = index.clone();
        let mut child_indices = Vec::with_capacity(self.children.len());
        for stride in &self.strides {
            let child_index = &remaining / stride;
            remaining -= &child_index * stride;
            child_indices.push(child_index);
        }
        Ok(child_indices)
    }

    pub fn plan(&self, index: &BigUint) -> PlanResult<ConstructionTree<O>> {
        let child_indices = self.decompose(index)?;

        let mut trees = Vec::with_capacity(self.children.len());
        for (child, child_index) in self.children.iter().zip(&child_indices) {
            trees.push(child.plan(child_index)?);
        }

        let receiver = if self.operation.needs_receiver() && !trees.is_empty() {
            Some(Box::new(trees.remove(0)))
        } else {
            None
        };

        let declared = self.operation.arity();
        if (receiver.is_none() && self.operation.needs_receiver()) || trees.len() != declared {
            return Err(PlanError::ArityMismatch {
                operation: self.operation.signature(),
                declared,
                reconstructed: trees.len(),
            });
        }

        Ok(ConstructionTree::Apply {
            operation: self.operation.clone(),
            receiver,
            arguments: trees,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{LiteralValue, NullFilter, Operation, Preset, TypeName, VisibilityPolicy};
    use crate::space::LeafSpace;

    fn int_space(values: &[i128]) -> Arc<ChoiceSpace<Operation>> {
        let presets = values
            .iter()
            .map(|v| Preset::Literal(LiteralValue::Integer(*v)))
            .collect();
        Arc::new(ChoiceSpace::new(
            TypeName::from("int"),
            0,
            NullFilter::Admit,
            VisibilityPolicy::PublicOnly,
            LeafSpace::new(presets),
            Vec::new(),
        ))
    }

    fn pair_op() -> Operation {
        Operation::constructor("Pair", vec![TypeName::from("int"), TypeName::from("int")])
    }

    #[test]
    fn test_product_cardinality_and_strides() {
        let call = CallSpace::new(pair_op(), vec![int_space(&[0, 1, 2]), int_space(&[5, 6])]);
        assert_eq!(call.size(), &BigUint::from(6u32));
        assert_eq!(call.strides(), &[BigUint::from(2u32), BigUint::from(1u32)]);
    }

    #[test]
    fn test_zero_argument_operation_has_one_plan() {
        let op = Operation::constructor("Unit", vec![]);
        let call = CallSpace::new(op.clone(), vec![]);
        assert_eq!(call.size(), &BigUint::from(1u32));

        let plan = call.plan(&BigUint::from(0u32)).unwrap();
        assert_eq!(
            plan,
            ConstructionTree::Apply {
                operation: op,
                receiver: None,
                arguments: vec![]
            }
        );
        assert!(call.plan(&BigUint::from(1u32)).is_err());
    }

    #[test]
    fn test_zero_sized_child_empties_the_product() {
        let call = CallSpace::new(pair_op(), vec![int_space(&[1, 2]), int_space(&[])]);
        assert!(call.size().is_zero());
        assert!(call.plan(&BigUint::from(0u32)).is_err());
    }

    #[test]
    fn test_mixed_radix_decomposition() {
        let call = CallSpace::new(pair_op(), vec![int_space(&[0, 1, 2]), int_space(&[0, 1, 2])]);
        assert_eq!(call.size(), &BigUint::from(9u32));
        assert_eq!(
            call.decompose(&BigUint::from(5u32)).unwrap(),
            vec![BigUint::from(1u32), BigUint::from(2u32)]
        );

        match call.plan(&BigUint::from(5u32)).unwrap() {
            ConstructionTree::Apply { arguments, receiver, .. } => {
                assert!(receiver.is_none());
                assert_eq!(
                    arguments,
                    vec![
                        ConstructionTree::Literal(LiteralValue::Integer(1)),
                        ConstructionTree::Literal(LiteralValue::Integer(2)),
                    ]
                );
            }
            other => panic!("expected an application, got {:?}", other),
        }
    }

    #[test]
    fn test_receiver_is_split_from_arguments() {
        let op = Operation::method("int", "plus", vec![TypeName::from("int")], "int");
        let call = CallSpace::new(op, vec![int_space(&[10, 20]), int_space(&[1, 2, 3])]);
        assert_eq!(call.size(), &BigUint::from(6u32));

        match call.plan(&BigUint::from(4u32)).unwrap() {
            ConstructionTree::Apply { receiver, arguments, .. } => {
                assert_eq!(
                    receiver.map(|r| *r),
                    Some(ConstructionTree::Literal(LiteralValue::Integer(20)))
                );
                assert_eq!(arguments, vec![ConstructionTree::Literal(LiteralValue::Integer(2))]);
            }
            other => panic!("expected an application, got {:?}", other),
        }
    }

    #[test]
    fn test_arity_mismatch_is_reported() {
        // Declares two arguments but is given one space
        let call = CallSpace::new(pair_op(), vec![int_space(&[1])]);
        let err = call.plan(&BigUint::from(0u32)).unwrap_err();
        assert_eq!(
            err,
            PlanError::ArityMismatch {
                operation: "Pair.new(int, int) -> Pair".to_string(),
                declared: 2,
                reconstructed: 1,
            }
        );
    }
}
