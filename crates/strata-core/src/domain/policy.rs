//! Layer dependency policy registry.
//!
//! Every rule about a layer is described exactly once by its [`LayerDef`]:
//! whether it is mandatory, what it may reference and what its project folder
//! skeleton looks like. Validation, graph construction and project planning
//! are table lookups against [`LAYER_REGISTRY`]; there is no per-layer `if`
//! chain anywhere else.
//!
//! # Adding a New Layer
//!
//! 1. Add a variant to `Layer` in `value_objects.rs`
//! 2. Add one [`LayerDef`] entry to [`LAYER_REGISTRY`], at the same index
//! 3. The validator and the planner pick it up from the table

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::value_objects::Layer;

// ── Layer definitions ─────────────────────────────────────────────────────────

/// Describes everything the domain needs to know about one layer.
#[derive(Debug, Clone, Copy)]
pub struct LayerDef {
    /// The layer this definition describes.
    pub layer: Layer,

    /// Whether every solution must include this layer.
    pub mandatory: bool,

    /// `dotnet new` template the layer's project is based on.
    pub project_template: &'static str,

    /// Layers this layer may reference, before any dynamic extension.
    pub allowed: &'static [Layer],

    /// The minimal edge set: layers this layer references by default.
    ///
    /// MUST be a subset of `allowed`. The `registry_integrity` test enforces
    /// this invariant.
    pub required: &'static [Layer],

    /// Whether this layer gains permission to reference the foundational
    /// layer when the foundational layer is selected.
    pub foundation_consumer: bool,

    /// Folder skeleton created inside the project.
    pub folders: &'static [&'static str],

    /// One-line description for summaries.
    pub description: &'static str,
}

/// The optional layer with zero allowed dependencies that others may consume.
pub const FOUNDATION: Layer = Layer::SharedKernel;

/// Single source of truth for the layer policy.
///
/// Indexed by `Layer` declaration order.
pub static LAYER_REGISTRY: &[LayerDef] = &[
    LayerDef {
        layer: Layer::SharedKernel,
        mandatory: false,
        project_template: "classlib",
        allowed: &[],
        required: &[],
        foundation_consumer: false,
        folders: &["Primitives", "ValueObjects", "Exceptions", "Common"],
        description: "Shared domain concepts reused across bounded contexts",
    },
    LayerDef {
        layer: Layer::Domain,
        mandatory: true,
        project_template: "classlib",
        allowed: &[],
        required: &[],
        foundation_consumer: true,
        folders: &[
            "Entities",
            "ValueObjects",
            "Aggregates",
            "Specifications",
            "DomainServices",
            "DomainEvents",
            "Exceptions",
            "Common",
        ],
        description: "Enterprise business rules: entities, value objects, domain events",
    },
    LayerDef {
        layer: Layer::Application,
        mandatory: false,
        project_template: "classlib",
        allowed: &[Layer::Domain],
        required: &[Layer::Domain],
        foundation_consumer: true,
        folders: &[
            "UseCases",
            "Interfaces",
            "DTOs",
            "Validators",
            "Mappings",
            "Common",
        ],
        description: "Application business rules: use cases and ports",
    },
    LayerDef {
        layer: Layer::Infrastructure,
        mandatory: false,
        project_template: "classlib",
        allowed: &[Layer::Application],
        required: &[Layer::Application],
        foundation_consumer: false,
        folders: &[
            "Persistence/DbContext",
            "Persistence/Configurations",
            "Persistence/Migrations",
            "Repositories",
            "Services",
            "Messaging",
        ],
        description: "Adapters for persistence, messaging and external services",
    },
    LayerDef {
        layer: Layer::Api,
        mandatory: false,
        project_template: "webapi",
        allowed: &[Layer::Application],
        required: &[Layer::Application],
        foundation_consumer: false,
        folders: &[
            "Controllers",
            "Filters",
            "Middleware",
            "Contracts",
            "Extensions",
        ],
        description: "Delivery mechanism: HTTP or gRPC entry point",
    },
];

/// Look up the definition of a layer.
pub fn layer_def(layer: Layer) -> &'static LayerDef {
    &LAYER_REGISTRY[layer.precedence() as usize]
}

/// Layers every solution must contain.
pub fn mandatory_layers() -> impl Iterator<Item = Layer> {
    LAYER_REGISTRY
        .iter()
        .filter(|def| def.mandatory)
        .map(|def| def.layer)
}

// ── Static queries ────────────────────────────────────────────────────────────

/// Whether the static policy could ever permit `from → to`.
///
/// Consults the registry only. Foundation consumers are answered as if the
/// foundational layer were selected, since that is the widest permission the
/// table can grant.
pub fn is_edge_allowed(from: Layer, to: Layer) -> bool {
    let def = layer_def(from);
    def.allowed.contains(&to) || (def.foundation_consumer && to == FOUNDATION)
}

/// The policy's minimal expected edge set for `layer`.
pub fn required_dependencies(layer: Layer) -> BTreeSet<Layer> {
    layer_def(layer).required.iter().copied().collect()
}

// ── Effective policy ──────────────────────────────────────────────────────────

/// The allowed-dependency table in force for one generation run.
///
/// Starts as a copy of the static registry and may be widened exactly once
/// by [`DependencyPolicy::extend_for_foundation`]. The registry itself is
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPolicy {
    allowed: BTreeMap<Layer, BTreeSet<Layer>>,
}

impl DependencyPolicy {
    /// The static table, without any selection-dependent extension.
    pub fn standard() -> Self {
        let allowed = LAYER_REGISTRY
            .iter()
            .map(|def| (def.layer, def.allowed.iter().copied().collect()))
            .collect();
        Self { allowed }
    }

    /// The policy in force for `selected`: the static table plus the
    /// foundational extension when the foundational layer is selected.
    pub fn for_selection(selected: &BTreeSet<Layer>) -> Self {
        let mut policy = Self::standard();
        policy.extend_for_foundation(selected);
        policy
    }

    /// Permit every foundation consumer to reference the foundational layer,
    /// if the foundational layer is part of `selected`.
    ///
    /// Returns whether anything changed; calling it again is a no-op.
    pub fn extend_for_foundation(&mut self, selected: &BTreeSet<Layer>) -> bool {
        if !selected.contains(&FOUNDATION) {
            return false;
        }

        let mut changed = false;
        for def in LAYER_REGISTRY.iter().filter(|d| d.foundation_consumer) {
            if selected.contains(&def.layer) {
                changed |= self.allowed.entry(def.layer).or_default().insert(FOUNDATION);
            }
        }
        changed
    }

    /// Permit one extra edge. Returns whether it was newly granted.
    pub fn grant(&mut self, from: Layer, to: Layer) -> bool {
        self.allowed.entry(from).or_default().insert(to)
    }

    /// Layers `layer` may reference under this policy.
    pub fn allowed(&self, layer: Layer) -> BTreeSet<Layer> {
        self.allowed.get(&layer).cloned().unwrap_or_default()
    }

    pub fn allows(&self, from: Layer, to: Layer) -> bool {
        self.allowed.get(&from).is_some_and(|set| set.contains(&to))
    }

    /// Whether `layer` must have no dependencies at all under this policy.
    pub fn is_zero_dependency(&self, layer: Layer) -> bool {
        self.allowed.get(&layer).is_none_or(|set| set.is_empty())
    }

    /// Minimal expected edge set; never affected by the extension.
    pub fn required(&self, layer: Layer) -> BTreeSet<Layer> {
        required_dependencies(layer)
    }
}

impl Default for DependencyPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(layers: &[Layer]) -> BTreeSet<Layer> {
        layers.iter().copied().collect()
    }

    #[test]
    fn registry_integrity() {
        assert_eq!(LAYER_REGISTRY.len(), Layer::ALL.len());
        for (i, def) in LAYER_REGISTRY.iter().enumerate() {
            assert_eq!(def.layer.precedence() as usize, i, "{:?} out of place", def.layer);
            for req in def.required {
                assert!(def.allowed.contains(req), "{:?} requires {:?} it may not use", def.layer, req);
            }
            assert!(!def.allowed.contains(&def.layer), "{:?} allows itself", def.layer);
        }
        assert!(layer_def(FOUNDATION).allowed.is_empty());
        assert!(!layer_def(FOUNDATION).foundation_consumer);
    }

    #[test]
    fn only_domain_is_mandatory() {
        assert_eq!(mandatory_layers().collect::<Vec<_>>(), vec![Layer::Domain]);
        assert!(Layer::Domain.is_mandatory());
        assert!(!Layer::Api.is_mandatory());
    }

    #[test]
    fn static_edge_permissions() {
        assert!(is_edge_allowed(Layer::Application, Layer::Domain));
        assert!(is_edge_allowed(Layer::Domain, Layer::SharedKernel));
        assert!(is_edge_allowed(Layer::Application, Layer::SharedKernel));
        assert!(!is_edge_allowed(Layer::Infrastructure, Layer::Domain));
        assert!(!is_edge_allowed(Layer::Api, Layer::Infrastructure));
        assert!(!is_edge_allowed(Layer::SharedKernel, Layer::Domain));
        assert!(!is_edge_allowed(Layer::Domain, Layer::Application));
    }

    #[test]
    fn required_dependencies_follow_table() {
        assert!(required_dependencies(Layer::Domain).is_empty());
        assert_eq!(required_dependencies(Layer::Api), set(&[Layer::Application]));
    }

    #[test]
    fn extension_applies_only_when_foundation_selected() {
        let mut policy = DependencyPolicy::standard();
        assert!(!policy.extend_for_foundation(&set(&[Layer::Domain, Layer::Application])));
        assert!(policy.is_zero_dependency(Layer::Domain));

        let selected = set(&[Layer::SharedKernel, Layer::Domain, Layer::Application, Layer::Api]);
        assert!(policy.extend_for_foundation(&selected));
        assert!(policy.allows(Layer::Domain, Layer::SharedKernel));
        assert!(policy.allows(Layer::Application, Layer::SharedKernel));
        assert!(!policy.allows(Layer::Api, Layer::SharedKernel));
        assert!(!policy.is_zero_dependency(Layer::Domain));
        assert!(policy.is_zero_dependency(Layer::SharedKernel));
    }

    #[test]
    fn extension_is_idempotent() {
        let selected = set(&[Layer::SharedKernel, Layer::Domain]);
        let mut policy = DependencyPolicy::standard();
        assert!(policy.extend_for_foundation(&selected));
        let once = policy.clone();
        assert!(!policy.extend_for_foundation(&selected));
        assert_eq!(policy, once);
        assert_eq!(policy.allowed(Layer::Domain), set(&[Layer::SharedKernel]));
    }

    #[test]
    fn extension_never_touches_required_set() {
        let policy = DependencyPolicy::for_selection(&set(&[Layer::SharedKernel, Layer::Domain]));
        assert!(policy.required(Layer::Domain).is_empty());
    }
}
