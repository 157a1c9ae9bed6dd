//! Integration tests for strata-core: the layer rules and manifest synthesis
//! exercised through the public API only.

use std::collections::BTreeSet;

use strata_core::domain::{
    DependencyPolicy, DependencyRuleValidator, FolderGrouping, Layer, LayerGraph,
    ManifestDocument, ManifestSynthesizer, NameBasedIds, ProjectDescriptor, RandomIds,
    SolutionConfiguration, SolutionPlan, TestKind, Violation,
};

fn selection(layers: &[Layer]) -> BTreeSet<Layer> {
    layers.iter().copied().collect()
}

fn default_graph(layers: &[Layer]) -> (LayerGraph, DependencyPolicy) {
    let selected = selection(layers);
    let policy = DependencyPolicy::for_selection(&selected);
    let graph = LayerGraph::from_policy(&selected, &policy, true);
    (graph, policy)
}

// ============================================================================
// Dependency rules
// ============================================================================

#[test]
fn domain_and_application_validate() {
    let (graph, policy) = default_graph(&[Layer::Domain, Layer::Application]);

    assert!(DependencyRuleValidator::validate(&graph, &policy).is_ok());
    assert_eq!(graph.edges(Layer::Application), selection(&[Layer::Domain]));
}

#[test]
fn domain_may_not_depend_on_application() {
    let (mut graph, policy) = default_graph(&[Layer::Domain]);
    graph.declare_edge(Layer::Domain, Layer::Application);

    let violations = DependencyRuleValidator::validate(&graph, &policy).unwrap_err();
    assert!(violations.contains(&Violation::InvalidDependency {
        from: Layer::Domain,
        to: Layer::Application,
    }));
    assert!(
        violations
            .to_string()
            .contains("Domain layer may not depend on Application")
    );
}

#[test]
fn foundation_edges_are_optional() {
    let selected = selection(&[Layer::SharedKernel, Layer::Domain, Layer::Application]);
    let policy = DependencyPolicy::for_selection(&selected);

    assert!(policy.allows(Layer::Domain, Layer::SharedKernel));
    assert!(policy.allows(Layer::Application, Layer::SharedKernel));

    let linked = LayerGraph::from_policy(&selected, &policy, true);
    assert!(linked.edges(Layer::Domain).contains(&Layer::SharedKernel));
    assert!(linked.edges(Layer::Application).contains(&Layer::SharedKernel));
    assert!(DependencyRuleValidator::validate(&linked, &policy).is_ok());

    let unlinked = LayerGraph::from_policy(&selected, &policy, false);
    assert!(!unlinked.edges(Layer::Domain).contains(&Layer::SharedKernel));
    assert!(DependencyRuleValidator::validate(&unlinked, &policy).is_ok());
}

#[test]
fn foundation_without_selection_grants_nothing() {
    let (mut graph, policy) = default_graph(&[Layer::Domain, Layer::Application]);
    graph.declare_edge(Layer::Domain, Layer::SharedKernel);

    let violations = DependencyRuleValidator::validate(&graph, &policy).unwrap_err();
    assert!(violations.contains(&Violation::InvalidDependency {
        from: Layer::Domain,
        to: Layer::SharedKernel,
    }));
}

#[test]
fn static_queries() {
    assert!(DependencyRuleValidator::is_edge_allowed(Layer::Api, Layer::Application));
    assert!(!DependencyRuleValidator::is_edge_allowed(Layer::Api, Layer::Domain));
    assert_eq!(
        DependencyRuleValidator::required_dependencies(Layer::Infrastructure),
        selection(&[Layer::Application])
    );
}

#[test]
fn closing_a_cycle_is_always_detected() {
    // Every ordered pair of distinct layers, closed into a 2-cycle.
    for a in Layer::ALL {
        for b in Layer::ALL {
            if a == b {
                continue;
            }
            let mut graph = LayerGraph::new([a, b]);
            graph.add_edge(a, b);
            graph.add_edge(b, a);

            let violations =
                DependencyRuleValidator::validate(&graph, &DependencyPolicy::standard())
                    .unwrap_err();
            assert!(
                violations.contains(&Violation::CycleDetected),
                "{a:?} <-> {b:?}"
            );
        }
    }
}

// ============================================================================
// Manifest synthesis
// ============================================================================

fn test_descriptor(kind: TestKind, rank: u8) -> ProjectDescriptor {
    let name = format!("Shop.{}Tests", kind.as_str());
    ProjectDescriptor::new(&name, format!("tests/{name}/{name}.csproj"), "tests", rank)
}

#[test]
fn adding_a_second_test_project_is_incremental() {
    let synth = ManifestSynthesizer::new(Box::new(RandomIds));
    let groupings = [FolderGrouping::tests()];

    let with_unit = synth
        .synthesize(
            ManifestDocument::new(),
            &[test_descriptor(TestKind::Unit, 10)],
            &groupings,
        )
        .unwrap();
    let unit = with_unit
        .find_entry("Shop.UnitTests", "tests/Shop.UnitTests/Shop.UnitTests.csproj")
        .unwrap();

    let with_both = synth
        .synthesize(
            with_unit.clone(),
            &[
                test_descriptor(TestKind::Unit, 10),
                test_descriptor(TestKind::Integration, 11),
            ],
            &groupings,
        )
        .unwrap();

    assert_eq!(with_both.entries().len(), with_unit.entries().len() + 1);
    assert_eq!(with_both.nesting().len(), with_unit.nesting().len() + 1);
    assert_eq!(with_both.config_lines().len(), with_unit.config_lines().len() + 4);
    assert_eq!(with_both.entry(unit), with_unit.entry(unit));
    assert_eq!(with_both.parent_of(unit), with_unit.parent_of(unit));
    assert_eq!(with_both.config_lines_for(unit).count(), 4);
}

#[test]
fn planned_solution_synthesizes_idempotently() {
    let config = SolutionConfiguration::builder()
        .solution_name("Shop")
        .layers(Layer::ALL)
        .tests(true)
        .build()
        .unwrap();
    let (graph, policy) = default_graph(&Layer::ALL);
    DependencyRuleValidator::validate(&graph, &policy).unwrap();
    let plan = SolutionPlan::build(&config, &graph);

    let synth = ManifestSynthesizer::new(Box::new(NameBasedIds::new("Shop")));
    let once = synth
        .synthesize(ManifestDocument::new(), &plan.descriptors(), plan.groupings())
        .unwrap();
    let twice = synth
        .synthesize(once.clone(), &plan.descriptors(), plan.groupings())
        .unwrap();

    assert_eq!(once, twice);
    // 2 folders + 5 layers + 2 test projects
    assert_eq!(twice.entries().len(), 9);
    assert_eq!(twice.config_lines().len(), 7 * 4);

    let order: Vec<&str> = twice
        .projects()
        .map(|e| e.display_name())
        .collect();
    assert_eq!(
        order,
        [
            "Shop.SharedKernel",
            "Shop.Domain",
            "Shop.Application",
            "Shop.Infrastructure",
            "Shop.API",
            "Shop.UnitTests",
            "Shop.IntegrationTests",
        ]
    );
}
