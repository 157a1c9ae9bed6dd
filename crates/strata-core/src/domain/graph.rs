//! The layer dependency graph for one generation run.
//!
//! Vertices are the selected layers and are fixed at construction. Edges are
//! declared dependencies ("`from` references `to`"). Whether an edge is
//! *permitted* is not this type's concern; see `dependency_validator`.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    policy::{self, DependencyPolicy, FOUNDATION},
    value_objects::Layer,
};

/// Directed graph over the selected layers.
///
/// Backed by ordered maps so iteration is always in layer precedence order,
/// whatever order the caller inserted things in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerGraph {
    edges: BTreeMap<Layer, BTreeSet<Layer>>,
}

impl LayerGraph {
    /// A graph with the given vertices and no edges.
    pub fn new(selected: impl IntoIterator<Item = Layer>) -> Self {
        Self {
            edges: selected.into_iter().map(|l| (l, BTreeSet::new())).collect(),
        }
    }

    /// The default graph for `selected`: every layer's required edges, plus
    /// consumer → foundation edges when `link_foundation` is set and the
    /// foundational layer is selected (and `policy` permits them).
    pub fn from_policy(
        selected: &BTreeSet<Layer>,
        policy: &DependencyPolicy,
        link_foundation: bool,
    ) -> Self {
        let mut graph = Self::new(selected.iter().copied());

        for &layer in selected {
            for required in policy.required(layer) {
                graph.add_edge(layer, required);
            }
        }

        if link_foundation && selected.contains(&FOUNDATION) {
            for def in policy::LAYER_REGISTRY.iter().filter(|d| d.foundation_consumer) {
                if policy.allows(def.layer, FOUNDATION) {
                    graph.add_edge(def.layer, FOUNDATION);
                }
            }
        }

        graph
    }

    /// Insert `from → to` if both layers are vertices.
    ///
    /// Returns `true` only when a new edge was inserted.
    pub fn add_edge(&mut self, from: Layer, to: Layer) -> bool {
        if !self.edges.contains_key(&to) {
            return false;
        }
        match self.edges.get_mut(&from) {
            Some(targets) => targets.insert(to),
            None => false,
        }
    }

    /// Record `from → to` even if `to` is not selected.
    ///
    /// Used for dependencies declared outside the policy; validation reports
    /// any that point at unselected layers.
    ///
    /// # Panics
    /// Panics if `from` is not a vertex of this graph.
    pub fn declare_edge(&mut self, from: Layer, to: Layer) -> bool {
        let targets = self
            .edges
            .get_mut(&from)
            .unwrap_or_else(|| panic!("{from} is not a vertex of this layer graph"));
        targets.insert(to)
    }

    /// Declared dependencies of `from` (empty if `from` is not a vertex).
    pub fn edges(&self, from: Layer) -> BTreeSet<Layer> {
        self.edges.get(&from).cloned().unwrap_or_default()
    }

    pub fn vertices(&self) -> BTreeSet<Layer> {
        self.edges.keys().copied().collect()
    }

    pub fn contains(&self, layer: Layer) -> bool {
        self.edges.contains_key(&layer)
    }

    /// Every `(from, to)` pair, in precedence order.
    pub fn edge_pairs(&self) -> impl Iterator<Item = (Layer, Layer)> + '_ {
        self.edges
            .iter()
            .flat_map(|(&from, targets)| targets.iter().map(move |&to| (from, to)))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Whether `to` is reachable from `from` by following one or more edges.
    pub fn reaches(&self, from: Layer, to: Layer) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<Layer> = self.edges(from).into_iter().collect();

        while let Some(next) = stack.pop() {
            if next == to {
                return true;
            }
            if seen.insert(next) {
                stack.extend(self.edges(next));
            }
        }
        false
    }
}
