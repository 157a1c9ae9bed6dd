//! Dependency rule validation.
//!
//! Enforces the inward-only rule set over a [`LayerGraph`]:
//!
//! 1. every declared edge must be permitted by the effective policy;
//! 2. zero-dependency layers must declare no edges at all;
//! 3. the graph must be acyclic.
//!
//! All violations are collected; nothing short-circuits. With the registry as
//! shipped a cycle is structurally impossible, but the check stays as an
//! invariant guard for future policy entries.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    graph::LayerGraph,
    policy::{self, DependencyPolicy},
    value_objects::Layer,
    violation::{Violation, ViolationList},
};

/// Stateless validator over a layer graph and an effective policy.
pub struct DependencyRuleValidator;

impl DependencyRuleValidator {
    /// Check `graph` against `policy`, reporting every violation.
    pub fn validate(graph: &LayerGraph, policy: &DependencyPolicy) -> Result<(), ViolationList> {
        let mut violations = ViolationList::new();
        let vertices = graph.vertices();

        // 1. Each declared edge must be allowed and point at a selected layer.
        for (from, to) in graph.edge_pairs() {
            if !policy.allows(from, to) {
                violations.push(Violation::InvalidDependency { from, to });
            } else if !vertices.contains(&to) {
                violations.push(Violation::UnselectedDependency { from, to });
            }
        }

        // 2. Zero-dependency layers may declare nothing, full stop.
        for &layer in &vertices {
            let targets = graph.edges(layer);
            if policy.is_zero_dependency(layer) && !targets.is_empty() {
                violations.push(Violation::ForbiddenDependency {
                    layer,
                    targets: targets.into_iter().collect(),
                });
            }
        }

        // 3. Cycles.
        if has_cycle(graph) {
            violations.push(Violation::CycleDetected);
        }

        violations.into_result()
    }

    /// Pure lookup against the static registry.
    pub fn is_edge_allowed(from: Layer, to: Layer) -> bool {
        policy::is_edge_allowed(from, to)
    }

    /// The policy's minimal expected edge set for `layer`.
    pub fn required_dependencies(layer: Layer) -> BTreeSet<Layer> {
        policy::required_dependencies(layer)
    }
}

// ── Cycle detection ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Colour {
    White,
    Grey,
    Black,
}

/// Three-colour depth-first search from every vertex.
fn has_cycle(graph: &LayerGraph) -> bool {
    let mut colours: BTreeMap<Layer, Colour> = BTreeMap::new();

    graph.vertices().into_iter().any(|start| {
        colours.get(&start).copied().unwrap_or(Colour::White) == Colour::White
            && visit(graph, start, &mut colours)
    })
}

/// Returns `true` as soon as a back edge into a grey vertex is found.
fn visit(graph: &LayerGraph, layer: Layer, colours: &mut BTreeMap<Layer, Colour>) -> bool {
    colours.insert(layer, Colour::Grey);

    for next in graph.edges(layer) {
        match colours.get(&next).copied().unwrap_or(Colour::White) {
            Colour::Grey => return true,
            Colour::White => {
                if visit(graph, next, colours) {
                    return true;
                }
            }
            Colour::Black => {}
        }
    }

    colours.insert(layer, Colour::Black);
    false
}
