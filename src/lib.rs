//! # planspace
//!
//! Indexable spaces of construction plans for test generation.
//!
//! Given a catalogue of ways to obtain a value of each type (preset literals and
//! constructing operations whose arguments are values of other types), this
//! crate represents every bounded-depth way of building a value as one
//! addressable space. It reports the exact size of that space, however large,
//! returns the plan at any index in a fixed canonical order without enumerating
//! the rest, and allocates a sample budget across several spaces.
//!
//! ```text
//! Catalogue ──► SpaceBuilder ──► PlanSpace ──► size(T) / plan(T, i)
//!                                    │
//!                                    └──► Allocator ──► IndexSampler ──► SampledPlan
//! ```

pub mod allocator;
pub mod builder;
pub mod cardinality;
pub mod catalogue;
pub mod config;
pub mod error;
pub mod planner;
pub mod sampler;
pub mod space;

// Re-export core types for easy access
pub use allocator::Allocator;
pub use builder::{SpaceBuilder, SpaceKey, SpaceStats};
pub use cardinality::{Cardinality, ScalingFactor};
pub use catalogue::{
    Catalogue, LiteralValue, NullFilter, Operation, OperationHandle, Preset, RegistryCatalogue,
    TypeName, Visibility, VisibilityPolicy,
};
pub use config::{ConfigError, ConfigResult, PlannerConfig};
pub use error::{ErrorKind, PlanError, PlanResult};
pub use planner::{PlanSpace, Planner, SampledPlan};
pub use sampler::IndexSampler;
pub use space::{CallSpace, ChoiceSpace, ConstructionTree, LeafSpace, SpaceNode};
