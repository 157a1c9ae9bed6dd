//! What one generation run will produce.
//!
//! A [`SolutionPlan`] is derived from a configuration and a *validated*
//! [`LayerGraph`]: one [`ProjectSpec`] per selected layer (its references are
//! exactly the graph's edges) plus the test projects, and the folder
//! groupings they are nested under. The synthesizer consumes the plan's
//! [`ProjectDescriptor`]s; the renderer consumes its specs.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{
    entities::solution::SolutionConfiguration,
    graph::LayerGraph,
    value_objects::{Layer, TestKind},
};

/// Solution folder holding the layer projects.
pub const SOURCES_GROUP: &str = "src";
/// Solution folder holding the test projects.
pub const TESTS_GROUP: &str = "tests";

/// Extension of generated project files.
pub const PROJECT_EXTENSION: &str = "csproj";

// ── Roles ─────────────────────────────────────────────────────────────────────

/// What a generated project is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProjectRole {
    Layer(Layer),
    Test(TestKind),
}

impl ProjectRole {
    /// Emission rank: layers by precedence, then the test projects.
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Layer(layer) => layer.precedence(),
            Self::Test(TestKind::Unit) => 10,
            Self::Test(TestKind::Integration) => 11,
        }
    }

    pub const fn grouping(&self) -> &'static str {
        match self {
            Self::Layer(_) => SOURCES_GROUP,
            Self::Test(_) => TESTS_GROUP,
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layer(layer) => write!(f, "{layer} layer"),
            Self::Test(kind) => write!(f, "{kind} tests"),
        }
    }
}

// ── Synthesizer input ─────────────────────────────────────────────────────────

/// A solution folder the synthesizer must ensure exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderGrouping {
    name: String,
}

impl FolderGrouping {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn sources() -> Self {
        Self::new(SOURCES_GROUP)
    }

    pub fn tests() -> Self {
        Self::new(TESTS_GROUP)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One project as the manifest sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDescriptor {
    display_name: String,
    relative_path: String,
    grouping: String,
    rank: u8,
}

impl ProjectDescriptor {
    pub fn new(
        display_name: impl Into<String>,
        relative_path: impl Into<String>,
        grouping: impl Into<String>,
        rank: u8,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            relative_path: relative_path.into(),
            grouping: grouping.into(),
            rank,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Path of the project file relative to the solution file.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn grouping(&self) -> &str {
        &self.grouping
    }

    pub const fn rank(&self) -> u8 {
        self.rank
    }
}

// ── Project specs ─────────────────────────────────────────────────────────────

/// Everything needed to render and register one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    role: ProjectRole,
    name: String,
    /// Directory relative to the solution root, e.g. `src/Acme.Domain`.
    directory: String,
    /// Project files this one references, relative to `directory`.
    references: Vec<String>,
}

impl ProjectSpec {
    pub const fn role(&self) -> ProjectRole {
        self.role
    }

    pub fn layer(&self) -> Option<Layer> {
        match self.role {
            ProjectRole::Layer(layer) => Some(layer),
            ProjectRole::Test(_) => None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn file_name(&self) -> String {
        format!("{}.{PROJECT_EXTENSION}", self.name)
    }

    /// Project file path relative to the solution root.
    pub fn manifest_path(&self) -> String {
        format!("{}/{}", self.directory, self.file_name())
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }

    pub fn descriptor(&self) -> ProjectDescriptor {
        ProjectDescriptor::new(
            &self.name,
            self.manifest_path(),
            self.role.grouping(),
            self.role.rank(),
        )
    }
}

fn project_file(name: &str) -> String {
    format!("{name}/{name}.{PROJECT_EXTENSION}")
}

/// How one layer project refers to another, relative to its own directory.
fn layer_reference(config: &SolutionConfiguration, to: Layer) -> String {
    format!("../{}", project_file(&config.project_name(to)))
}

// ── Plan ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SolutionPlan {
    config: SolutionConfiguration,
    projects: Vec<ProjectSpec>,
    groupings: Vec<FolderGrouping>,
}

impl SolutionPlan {
    /// Plan a full solution. `graph` must already have passed validation.
    pub fn build(config: &SolutionConfiguration, graph: &LayerGraph) -> Self {
        let mut projects: Vec<ProjectSpec> = graph
            .vertices()
            .into_iter()
            .map(|layer| {
                let references = graph
                    .edges(layer)
                    .into_iter()
                    .filter(|dep| graph.contains(*dep))
                    .map(|dep| layer_reference(config, dep))
                    .collect();
                let name = config.project_name(layer);
                ProjectSpec {
                    role: ProjectRole::Layer(layer),
                    directory: format!("{SOURCES_GROUP}/{name}"),
                    name,
                    references,
                }
            })
            .collect();

        let layers = graph.vertices();
        projects.extend(
            config
                .test_kinds()
                .into_iter()
                .map(|kind| Self::test_spec(config, &layers, kind)),
        );

        Self::from_projects(config, projects)
    }

    /// Plan only test projects for an existing solution whose layer projects
    /// are `layers`.
    pub fn tests_only(
        config: &SolutionConfiguration,
        layers: &BTreeSet<Layer>,
        kinds: &[TestKind],
    ) -> Self {
        let kinds: BTreeSet<TestKind> = kinds.iter().copied().collect();
        let projects = kinds
            .into_iter()
            .map(|kind| Self::test_spec(config, layers, kind))
            .collect();
        Self::from_projects(config, projects)
    }

    fn test_spec(
        config: &SolutionConfiguration,
        layers: &BTreeSet<Layer>,
        kind: TestKind,
    ) -> ProjectSpec {
        let name = config.test_project_name(kind);
        let references = layers
            .iter()
            .map(|layer| {
                format!(
                    "../../{SOURCES_GROUP}/{}",
                    project_file(&config.project_name(*layer))
                )
            })
            .collect();
        ProjectSpec {
            role: ProjectRole::Test(kind),
            directory: format!("{TESTS_GROUP}/{name}"),
            name,
            references,
        }
    }

    fn from_projects(config: &SolutionConfiguration, mut projects: Vec<ProjectSpec>) -> Self {
        projects.sort_by(|a, b| {
            a.role
                .rank()
                .cmp(&b.role.rank())
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut groupings = Vec::new();
        for project in &projects {
            let group = FolderGrouping::new(project.role.grouping());
            if !groupings.contains(&group) {
                groupings.push(group);
            }
        }

        Self {
            config: config.clone(),
            projects,
            groupings,
        }
    }

    pub fn config(&self) -> &SolutionConfiguration {
        &self.config
    }

    /// Projects in emission order.
    pub fn projects(&self) -> &[ProjectSpec] {
        &self.projects
    }

    pub fn project(&self, role: ProjectRole) -> Option<&ProjectSpec> {
        self.projects.iter().find(|p| p.role == role)
    }

    /// The reference a layer project carries for a dependency on `to`.
    pub fn layer_reference(&self, to: Layer) -> String {
        layer_reference(&self.config, to)
    }

    pub fn groupings(&self) -> &[FolderGrouping] {
        &self.groupings
    }

    pub fn descriptors(&self) -> Vec<ProjectDescriptor> {
        self.projects.iter().map(ProjectSpec::descriptor).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
