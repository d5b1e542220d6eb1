//! Allocator integration tests
//!
//! Budget conservation, exhaustive versus sampling mode, and end-to-end
//! selection of plans from several root types.

use num_bigint::BigUint;

use planspace::{
    Allocator, ErrorKind, IndexSampler, LiteralValue, Operation, PlanError, Planner,
    PlannerConfig, RegistryCatalogue, TypeName,
};

fn sizes(values: &[u64]) -> Vec<BigUint> {
    values.iter().map(|&v| BigUint::from(v)).collect()
}

fn assert_conserved(allocator: &Allocator, available: &[u64], global: u64, per_type: u64) {
    let selected: u64 = allocator.selected_counts().unwrap().iter().sum();
    let total: u64 = available.iter().sum();
    assert!(selected <= (global * per_type).min(total));
}

// ========== Conservation ==========

#[test]
fn test_three_type_sampling_scenario() {
    let available = [10, 1_000_000, 5];
    let mut allocator = Allocator::new();
    allocator.choose_sizes(sizes(&available), 100, 40).unwrap();

    assert!(!allocator.is_exhaustive().unwrap());
    assert!(allocator.selected_counts().unwrap().iter().all(|&count| count >= 1));
    assert_conserved(&allocator, &available, 100, 40);
    assert_eq!(allocator.factor().unwrap().to_string(), "1000015/4000");
}

#[test]
fn test_conservation_over_many_shapes() {
    let shapes: [&[u64]; 6] = [
        &[1, 2, 3],
        &[0, 0, 0],
        &[1000, 1000, 1000],
        &[7, 0, 123456, 1],
        &[99, 1],
        &[5],
    ];
    for available in shapes.iter() {
        // Every budget here covers at least one sample per non-empty type
        for (global, per_type) in [(1, 4), (2, 3), (10, 10), (100, 40)] {
            let mut allocator = Allocator::new();
            allocator.choose_sizes(sizes(available), global, per_type).unwrap();
            assert_conserved(&allocator, available, global, per_type);

            let total: u64 = available.iter().sum();
            if total <= global * per_type {
                assert!(allocator.is_exhaustive().unwrap());
                assert_eq!(allocator.selected_counts().unwrap(), *available);
            } else {
                assert!(!allocator.is_exhaustive().unwrap());
            }

            for (position, &count) in allocator.selected_counts().unwrap().iter().enumerate() {
                if available[position] == 0 {
                    assert_eq!(count, 0);
                }
            }
        }
    }
}

#[test]
fn test_more_types_than_budget_keeps_one_each() {
    let mut allocator = Allocator::new();
    allocator.choose_sizes(sizes(&[50, 60, 70]), 1, 2).unwrap();
    assert_eq!(allocator.selected_counts().unwrap(), &[1, 1, 1]);
    assert!(!allocator.is_exhaustive().unwrap());

    // Five single-plan types over a budget of two: the one-sample floor takes
    // every plan, so the allocation is exhaustive after all
    allocator.choose_sizes(sizes(&[1, 1, 1, 1, 1]), 1, 2).unwrap();
    assert_eq!(allocator.selected_counts().unwrap(), &[1, 1, 1, 1, 1]);
    assert_eq!(allocator.total_selected().unwrap(), 5);
    assert!(allocator.is_exhaustive().unwrap());
}

#[test]
fn test_not_ready_before_choose() {
    let allocator = Allocator::new();
    let err = allocator.total_selected().unwrap_err();
    assert_eq!(err, PlanError::NotReady);
    assert_eq!(err.kind(), ErrorKind::NotReady);
}

// ========== End to end ==========

fn catalogue() -> RegistryCatalogue {
    let mut registry = RegistryCatalogue::new();
    for value in 0..10 {
        registry.add_literal("int", LiteralValue::Integer(value));
    }
    registry
        .add_literal("bool", LiteralValue::Boolean(false))
        .add_literal("bool", LiteralValue::Boolean(true))
        .add_operation(Operation::constructor(
            "Matrix",
            vec![
                TypeName::from("int"),
                TypeName::from("int"),
                TypeName::from("int"),
                TypeName::from("int"),
            ],
        ))
        .add_operation(Operation::constructor("Flag", vec![TypeName::from("bool")]));
    registry
}

#[test]
fn test_select_spreads_samples_across_large_space() {
    let registry = catalogue();
    let config = PlannerConfig::default().with_budget(2, 5).with_seed(3);
    let planner = Planner::new(&registry, config);
    let roots = [TypeName::from("Matrix"), TypeName::from("Flag")];
    let space = planner.build(&roots).unwrap();

    assert_eq!(space.size(&roots[0]).unwrap(), BigUint::from(10_000u32));
    assert_eq!(space.size(&roots[1]).unwrap(), BigUint::from(2u32));

    let allocator = space.allocate_default().unwrap();
    assert!(!allocator.is_exhaustive().unwrap());
    assert_eq!(allocator.selected_counts().unwrap(), &[9, 1]);

    let plans = space.select(&allocator, None).unwrap();
    assert_eq!(plans.len(), 10);
    let matrix_indices: Vec<&BigUint> = plans
        .iter()
        .filter(|sampled| sampled.ty == roots[0])
        .map(|sampled| &sampled.index)
        .collect();
    assert_eq!(matrix_indices.first(), Some(&&BigUint::from(0u32)));
    assert!(matrix_indices.last().unwrap() > &&BigUint::from(8_000u32));

    let sampled = space.sample_plans().unwrap();
    assert_eq!(sampled.len(), 10);
    let mut sampler = IndexSampler::new(3);
    assert_eq!(sampled, space.select(&allocator, Some(&mut sampler)).unwrap());
    for (deterministic, random) in plans.iter().zip(&sampled) {
        assert_eq!(deterministic.ty, random.ty);
        let position = if random.ty == roots[0] { 0 } else { 1 };
        let local = plans
            .iter()
            .filter(|p| p.ty == random.ty)
            .position(|p| p.index == deterministic.index)
            .unwrap();
        let stratum = allocator.stratum(position, &BigUint::from(local)).unwrap();
        assert!(stratum.contains(&random.index));
    }
}
