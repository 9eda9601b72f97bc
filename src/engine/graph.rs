//! engine::graph
//!
//! Step dependency graph.
//!
//! # Architecture
//!
//! The step graph is a DAG where:
//! - Nodes are seed steps
//! - Edges point from a step to each step whose output it consumes
//!
//! The executor schedules from [`StepGraph::layers`]: every step in a layer
//! depends only on steps in earlier layers, so a layer's steps may run
//! concurrently. [`StepGraph::topological_order`] is the sequential
//! schedule; it breaks ties by step order, so when the reference order is
//! already a valid schedule it comes back unchanged.
//!
//! # Invariants
//!
//! - Graph must be acyclic
//! - Every dependency must itself be a node

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::plan::StepId;

/// Errors from graph validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// The dependency edges form a cycle through this step.
    #[error("dependency cycle through step '{0}'")]
    Cycle(StepId),

    /// A step depends on a step that is not in the graph.
    #[error("step '{step}' depends on '{dependency}', which is not part of the plan")]
    UnknownDependency { step: StepId, dependency: StepId },
}

#[derive(Debug, Clone, Default)]
pub struct StepGraph {
    /// Dependencies of each step
    dependencies: BTreeMap<StepId, BTreeSet<StepId>>,
    /// Cached dependents (derived from dependencies)
    dependents: BTreeMap<StepId, BTreeSet<StepId>>,
}

impl StepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step with no dependencies. Adding an existing step is a no-op.
    pub fn add_node(&mut self, step: StepId) {
        self.dependencies.entry(step).or_default();
    }

    /// Record that `step` consumes the output of `dependency`.
    ///
    /// This also updates the dependents cache. The dependency is not added
    /// as a node; [`validate`](Self::validate) reports it if it never is.
    pub fn add_edge(&mut self, step: StepId, dependency: StepId) {
        self.dependencies.entry(step).or_default().insert(dependency);
        self.dependents.entry(dependency).or_default().insert(step);
    }

    pub fn contains(&self, step: StepId) -> bool {
        self.dependencies.contains_key(&step)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// All steps, in step order.
    pub fn steps(&self) -> impl Iterator<Item = StepId> + '_ {
        self.dependencies.keys().copied()
    }

    pub fn dependencies(&self, step: StepId) -> impl Iterator<Item = StepId> + '_ {
        self.dependencies.get(&step).into_iter().flatten().copied()
    }

    pub fn dependents(&self, step: StepId) -> impl Iterator<Item = StepId> + '_ {
        self.dependents.get(&step).into_iter().flatten().copied()
    }

    /// Check that every dependency is a node and that there is no cycle.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (step, deps) in &self.dependencies {
            if let Some(missing) = deps.iter().find(|d| !self.contains(**d)) {
                return Err(GraphError::UnknownDependency {
                    step: *step,
                    dependency: *missing,
                });
            }
        }
        match self.find_cycle() {
            Some(step) => Err(GraphError::Cycle(step)),
            None => Ok(()),
        }
    }

    /// Returns `Some(step)` if a cycle is reachable from that step.
    pub fn find_cycle(&self) -> Option<StepId> {
        let mut visited = BTreeSet::new();
        let mut path = BTreeSet::new();

        self.steps()
            .find(|step| self.has_cycle_from(*step, &mut visited, &mut path))
    }

    fn has_cycle_from(
        &self,
        step: StepId,
        visited: &mut BTreeSet<StepId>,
        path: &mut BTreeSet<StepId>,
    ) -> bool {
        if path.contains(&step) {
            return true;
        }
        if !visited.insert(step) {
            return false;
        }

        path.insert(step);
        for dependency in self.dependencies(step) {
            if self.has_cycle_from(dependency, visited, path) {
                return true;
            }
        }
        path.remove(&step);
        false
    }

    /// Partition the steps into dependency layers.
    ///
    /// Layer 0 holds the steps with no dependencies; layer `n` holds the
    /// steps whose dependencies all sit in layers `< n`. Steps within a
    /// layer are in step order.
    pub fn layers(&self) -> Result<Vec<Vec<StepId>>, GraphError> {
        self.validate()?;

        let mut placed: BTreeSet<StepId> = BTreeSet::new();
        let mut layers = Vec::new();
        while placed.len() < self.len() {
            let layer: Vec<StepId> = self
                .steps()
                .filter(|step| !placed.contains(step))
                .filter(|step| self.dependencies(*step).all(|d| placed.contains(&d)))
                .collect();
            // validate() ruled out cycles, so every pass places something.
            if layer.is_empty() {
                break;
            }
            placed.extend(layer.iter().copied());
            layers.push(layer);
        }
        Ok(layers)
    }

    /// A sequential schedule: at each point the earliest ready step runs.
    pub fn topological_order(&self) -> Result<Vec<StepId>, GraphError> {
        self.validate()?;

        let mut remaining: BTreeMap<StepId, usize> = self
            .dependencies
            .iter()
            .map(|(step, deps)| (*step, deps.len()))
            .collect();
        let mut ready: BTreeSet<StepId> = remaining
            .iter()
            .filter(|(_, pending)| **pending == 0)
            .map(|(step, _)| *step)
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(step) = ready.pop_first() {
            order.push(step);
            for dependent in self.dependents(step) {
                if let Some(pending) = remaining.get_mut(&dependent) {
                    *pending -= 1;
                    if *pending == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> StepGraph {
        let mut graph = StepGraph::new();
        graph.add_node(StepId::SalesChannel);
        graph.add_node(StepId::Region);
        graph.add_edge(StepId::StoreUpdate, StepId::SalesChannel);
        graph.add_edge(StepId::StoreUpdate, StepId::Region);
        graph.add_edge(StepId::PublishableKey, StepId::SalesChannel);
        graph
    }

    #[test]
    fn empty_graph_has_no_cycles() {
        let graph = StepGraph::new();
        assert!(graph.find_cycle().is_none());
        assert!(graph.layers().unwrap().is_empty());
    }

    #[test]
    fn layers_group_independent_steps() {
        let layers = diamond().layers().unwrap();
        assert_eq!(
            layers,
            vec![
                vec![StepId::SalesChannel, StepId::Region],
                vec![StepId::StoreUpdate, StepId::PublishableKey],
            ]
        );
    }

    #[test]
    fn topological_order_prefers_step_order() {
        let order = diamond().topological_order().unwrap();
        assert_eq!(
            order,
            vec![
                StepId::SalesChannel,
                StepId::Region,
                StepId::StoreUpdate,
                StepId::PublishableKey,
            ]
        );
    }

    #[test]
    fn dependents_are_cached() {
        let graph = diamond();
        let dependents: Vec<_> = graph.dependents(StepId::SalesChannel).collect();
        assert_eq!(dependents, vec![StepId::StoreUpdate, StepId::PublishableKey]);
        assert_eq!(graph.dependents(StepId::StoreUpdate).count(), 0);
    }

    #[test]
    fn cycle_is_detected() {
        let mut graph = StepGraph::new();
        graph.add_edge(StepId::Seller, StepId::StockLocation);
        graph.add_edge(StepId::StockLocation, StepId::Seller);

        assert!(graph.find_cycle().is_some());
        assert!(matches!(graph.layers(), Err(GraphError::Cycle(_))));
        assert!(matches!(graph.topological_order(), Err(GraphError::Cycle(_))));
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let mut graph = StepGraph::new();
        graph.add_edge(StepId::Products, StepId::Categories);

        assert_eq!(
            graph.validate(),
            Err(GraphError::UnknownDependency {
                step: StepId::Products,
                dependency: StepId::Categories,
            })
        );
    }
}
