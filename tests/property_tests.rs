//! Property-based tests for scheduling and randomness.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;

use marketseed::core::random::{pick, RandomSource, SequenceRandom, StdRandom};
use marketseed::core::types::SellerId;
use marketseed::engine::{GraphError, SeedPlan, StepGraph, StepId};

/// Strategy for a step.
fn step() -> impl Strategy<Value = StepId> {
    (0..StepId::ALL.len()).prop_map(|i| StepId::ALL[i])
}

/// Strategy for an acyclic graph: edges only point from later to earlier
/// steps.
fn acyclic_graph() -> impl Strategy<Value = StepGraph> {
    prop::collection::vec((step(), step()), 0..40).prop_map(|edges| {
        let mut graph = StepGraph::new();
        for s in StepId::ALL {
            graph.add_node(s);
        }
        for (a, b) in edges {
            if a > b {
                graph.add_edge(a, b);
            }
        }
        graph
    })
}

/// Strategy for a graph with arbitrary edges, possibly cyclic.
fn any_graph() -> impl Strategy<Value = StepGraph> {
    prop::collection::vec((step(), step()), 0..30).prop_map(|edges| {
        let mut graph = StepGraph::new();
        for s in StepId::ALL {
            graph.add_node(s);
        }
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    })
}

/// The steps `seed` needs, transitively, plus `seed` itself.
fn closure(seed: &[StepId]) -> BTreeSet<StepId> {
    let mut out = BTreeSet::new();
    let mut stack: Vec<StepId> = seed.to_vec();
    while let Some(s) = stack.pop() {
        if out.insert(s) {
            stack.extend(s.dependencies().iter().copied());
        }
    }
    out
}

proptest! {
    #[test]
    fn topological_order_respects_every_edge(graph in acyclic_graph()) {
        let order = graph.topological_order().unwrap();
        prop_assert_eq!(order.len(), graph.len());

        let position: HashMap<StepId, usize> =
            order.iter().enumerate().map(|(i, s)| (*s, i)).collect();
        for s in graph.steps() {
            for dep in graph.dependencies(s) {
                prop_assert!(position[&dep] < position[&s]);
            }
        }
    }

    #[test]
    fn layers_partition_and_follow_dependencies(graph in acyclic_graph()) {
        let layers = graph.layers().unwrap();
        let mut layer_of = HashMap::new();
        for (i, layer) in layers.iter().enumerate() {
            prop_assert!(!layer.is_empty());
            for s in layer {
                prop_assert!(layer_of.insert(*s, i).is_none(), "{} placed twice", s);
            }
        }
        prop_assert_eq!(layer_of.len(), graph.len());
        for s in graph.steps() {
            for dep in graph.dependencies(s) {
                prop_assert!(layer_of[&dep] < layer_of[&s]);
            }
        }
    }

    #[test]
    fn cycles_are_always_detected(graph in any_graph()) {
        match graph.topological_order() {
            Ok(order) => prop_assert_eq!(order.len(), graph.len()),
            Err(GraphError::Cycle(step)) => {
                prop_assert!(graph.contains(step));
                prop_assert!(graph.layers().is_err());
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn closed_subplans_are_valid(seed in prop::collection::vec(step(), 1..5)) {
        let steps = closure(&seed);
        let plan = SeedPlan::from_steps(steps.iter().copied()).unwrap();
        let order = plan.sequential_order().unwrap();
        prop_assert_eq!(order.len(), steps.len());

        // Sequential order of a subplan is the full order restricted to it.
        let full: Vec<StepId> = SeedPlan::full()
            .unwrap()
            .sequential_order()
            .unwrap()
            .into_iter()
            .filter(|s| steps.contains(s))
            .collect();
        prop_assert_eq!(order, full);
    }

    #[test]
    fn remaining_excludes_completed(done in prop::collection::btree_set(step(), 0..14)) {
        let plan = SeedPlan::full().unwrap();
        let remaining = plan.remaining(&done).unwrap();
        prop_assert_eq!(remaining.len() + done.len(), StepId::ALL.len());
        prop_assert!(remaining.iter().all(|s| !done.contains(s)));
    }

    #[test]
    fn std_random_stays_in_closed_range(seed: u64, low in 0u32..100, high in 0u32..100) {
        let rng = StdRandom::seeded(seed);
        let (lo, hi) = if low <= high { (low, high) } else { (high, low) };
        for _ in 0..20 {
            let v = rng.in_range(low, high);
            prop_assert!(lo <= v && v <= hi);
        }
    }

    #[test]
    fn pick_is_none_only_for_empty(seed: u64, items in prop::collection::vec(any::<u8>(), 0..10)) {
        let rng = StdRandom::seeded(seed);
        match pick(&rng, &items) {
            Some(item) => prop_assert!(items.contains(item)),
            None => prop_assert!(items.is_empty()),
        }
    }

    #[test]
    fn sequence_random_indexes_are_in_bounds(values in prop::collection::vec(any::<u64>(), 0..8), len in 1usize..20) {
        let rng = SequenceRandom::new(values);
        for _ in 0..10 {
            let i = rng.index(len).unwrap();
            prop_assert!(i < len);
        }
    }

    #[test]
    fn ids_reject_whitespace(prefix in "[a-z]{1,5}", suffix in "[a-z0-9]{1,5}") {
        let joined = format!("{}_{}", prefix, suffix);
        let spaced = format!("{} {}", prefix, suffix);
        prop_assert!(SellerId::new(joined).is_ok());
        prop_assert!(SellerId::new(spaced).is_err());
        prop_assert!(SellerId::new("").is_err());
    }
}
