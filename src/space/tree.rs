//! Construction trees: the plans a space hands back
//!
//! A [`ConstructionTree`] is an unevaluated description of how to obtain one
//! value. It never runs anything; collaborators render or invoke it.

use serde::Serialize;

use crate::catalogue::{LiteralValue, Preset};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConstructionTree<O> {
    /// Use a literal value
    Literal(LiteralValue),
    /// Use a variable the caller already has in scope
    Variable(String),
    /// Apply an operation to a receiver (if it needs one) and arguments
    Apply {
        operation: O,
        receiver: Option<Box<ConstructionTree<O>>>,
        arguments: Vec<ConstructionTree<O>>,
    },
}

impl<O> ConstructionTree<O> {
    pub fn from_preset(preset: &Preset) -> Self {
        match preset {
            Preset::Literal(value) => ConstructionTree::Literal(value.clone()),
            Preset::Variable(name) => ConstructionTree::Variable(name.clone()),
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, ConstructionTree::Apply { .. })
    }

    /// Nesting depth of operation applications; leaves have depth 0
    pub fn depth(&self) -> usize {
        match self {
            ConstructionTree::Literal(_) | ConstructionTree::Variable(_) => 0,
            ConstructionTree::Apply {
                receiver,
                arguments,
                ..
            } => {
                let deepest = receiver
                    .iter()
                    .map(|r| r.depth())
                    .chain(arguments.iter().map(ConstructionTree::depth))
                    .max()
                    .unwrap_or(0);
                deepest + 1
            }
        }
    }

    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            ConstructionTree::Literal(_) | ConstructionTree::Variable(_) => 1,
            ConstructionTree::Apply {
                receiver,
                arguments,
                ..
            } => {
                1 + receiver.as_ref().map_or(0, |r| r.node_count())
                    + arguments.iter().map(ConstructionTree::node_count).sum::<usize>()
            }
        }
    }

    /// Applied operations in pre-order: an application, then its receiver, then
    /// its arguments left to right
    pub fn operations(&self) -> Vec<&O> {
        let mut found = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let ConstructionTree::Apply {
                operation,
                receiver,
                arguments,
            } = node
            {
                found.push(operation);
                for argument in arguments.iter().rev() {
                    stack.push(argument);
                }
                if let Some(receiver) = receiver {
                    stack.push(receiver);
                }
            }
        }
        found
    }
}
