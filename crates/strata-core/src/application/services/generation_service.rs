//! Generation Service - main application orchestrator.
//!
//! This service coordinates the whole workflow:
//! 1. Build and validate the layer graph (nothing is touched before this passes)
//! 2. Plan projects and synthesize the solution manifest
//! 3. Render project files
//! 4. Write to the filesystem, rolling back on failure
//!
//! It implements the driving port (incoming) and uses driven ports (outgoing).

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, ManifestCodec, ProjectRenderer},
    },
    domain::{
        DEFAULT_TARGET_FRAMEWORK, DependencyPolicy, DependencyRuleValidator, DomainError, FsEntry,
        IdStrategy, Layer, LayerGraph, ManifestDocument, ManifestSynthesizer, ProjectRole,
        ProjectStructure, SOURCES_GROUP, SolutionConfiguration, SolutionPlan, SynthesisSummary, TestKind,
        normalize_path, policy,
    },
    error::StrataResult,
};

/// Options for [`GenerationService::generate`].
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Plan and report, write nothing.
    pub dry_run: bool,
    /// Merge into an existing solution directory instead of refusing.
    pub force: bool,
    /// Dependencies declared on top of the policy defaults. They are
    /// validated like any other edge.
    pub extra_edges: Vec<(Layer, Layer)>,
}

/// Options for [`GenerationService::add_test_projects`].
#[derive(Debug, Clone, Default)]
pub struct AddTestsOptions {
    /// Target framework for the new projects; detected from the Domain
    /// project when absent.
    pub target_framework: Option<String>,
    pub dry_run: bool,
}

/// What a run did (or, for a dry run, would do).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub solution_root: PathBuf,
    pub solution_file: PathBuf,
    /// Projects whose files were generated by this run.
    pub projects_added: Vec<String>,
    /// Projects that were already there and were left alone.
    pub projects_existing: Vec<String>,
    /// Inter-layer references written into project files by this run.
    pub references: Vec<(Layer, Layer)>,
    /// References the graph requires but existing project files lack.
    /// Existing project files are never rewritten, so these need adding by
    /// hand.
    pub references_missing: Vec<(Layer, Layer)>,
    /// Paths written, relative to `solution_root`.
    pub paths: Vec<PathBuf>,
    pub synthesis: SynthesisSummary,
    pub dry_run: bool,
}

impl GenerationReport {
    fn new(solution_root: PathBuf, solution_file: PathBuf, dry_run: bool) -> Self {
        Self {
            solution_root,
            solution_file,
            projects_added: Vec::new(),
            projects_existing: Vec::new(),
            references: Vec::new(),
            references_missing: Vec::new(),
            paths: Vec::new(),
            synthesis: SynthesisSummary::default(),
            dry_run,
        }
    }

    /// Nothing was (or would be) written.
    pub fn is_noop(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn files_written(&self) -> usize {
        self.paths.len()
    }
}

/// Outcome of a successful [`GenerationService::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub layers: BTreeSet<Layer>,
    pub edges: Vec<(Layer, Layer)>,
}

/// What to undo if writing fails part-way.
#[derive(Debug, Default)]
struct Rollback {
    remove_dirs: Vec<PathBuf>,
    remove_files: Vec<PathBuf>,
    restore: Option<(PathBuf, String)>,
}

/// Main generation service.
pub struct GenerationService {
    filesystem: Box<dyn Filesystem>,
    codec: Box<dyn ManifestCodec>,
    renderer: Box<dyn ProjectRenderer>,
    id_strategy: IdStrategy,
}

impl GenerationService {
    /// Create a new generation service with the given adapters.
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        codec: Box<dyn ManifestCodec>,
        renderer: Box<dyn ProjectRenderer>,
    ) -> Self {
        Self {
            filesystem,
            codec,
            renderer,
            id_strategy: IdStrategy::default(),
        }
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// `Shop` → `Shop.sln`
    pub fn solution_file_name(&self, solution_name: &str) -> String {
        format!("{solution_name}.{}", self.codec.file_extension())
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Validate a layer selection, plus any extra declared edges.
    ///
    /// Mandatory layers are added to `layers`. An extra edge whose source is
    /// not selected is a configuration error.
    #[instrument(skip_all, fields(layers = layers.len(), forced = forced.len()))]
    pub fn check(layers: &BTreeSet<Layer>, forced: &[(Layer, Layer)]) -> StrataResult<CheckReport> {
        let mut selected = layers.clone();
        selected.extend(policy::mandatory_layers());

        let graph = Self::validated_graph(&selected, forced)?;
        debug!(edges = graph.edge_count(), "Layer graph is valid");
        Ok(CheckReport {
            layers: selected,
            edges: graph.edge_pairs().collect(),
        })
    }

    /// Validate `config` and plan the solution. Touches nothing.
    pub fn plan(
        &self,
        config: &SolutionConfiguration,
        extra_edges: &[(Layer, Layer)],
    ) -> StrataResult<SolutionPlan> {
        let graph = Self::validated_graph(config.layers(), extra_edges)?;
        Ok(SolutionPlan::build(config, &graph))
    }

    /// The policy-derived graph for `selected` plus `extra` edges, validated.
    ///
    /// An extra edge whose source is not selected is a configuration error.
    fn validated_graph(
        selected: &BTreeSet<Layer>,
        extra: &[(Layer, Layer)],
    ) -> StrataResult<LayerGraph> {
        let policy = DependencyPolicy::for_selection(selected);
        let mut graph = LayerGraph::from_policy(selected, &policy, true);

        for &(from, to) in extra {
            if !graph.contains(from) {
                return Err(DomainError::InvalidConfiguration(format!(
                    "cannot declare {from} -> {to}: {from} is not a selected layer"
                ))
                .into());
            }
            graph.declare_edge(from, to);
        }

        DependencyRuleValidator::validate(&graph, &policy)
            .map_err(DomainError::DependencyRulesViolated)?;
        Ok(graph)
    }

    // -------------------------------------------------------------------------
    // Use cases
    // -------------------------------------------------------------------------

    /// Generate a solution under `output_dir/<solution name>`.
    #[instrument(
        skip_all,
        fields(
            solution = %config.solution_name(),
            output = %output_dir.display(),
            dry_run = options.dry_run
        )
    )]
    pub fn generate(
        &self,
        config: &SolutionConfiguration,
        output_dir: &Path,
        options: GenerateOptions,
    ) -> StrataResult<GenerationReport> {
        info!("Generating solution {}", config);

        // 1. Validate before anything else happens.
        let graph = Self::validated_graph(config.layers(), &options.extra_edges)?;
        let plan = SolutionPlan::build(config, &graph);
        info!(projects = plan.projects().len(), "Dependency rules validated");

        // 2. Existing output?
        let root = output_dir.join(config.solution_name());
        let root_existed = self.filesystem.exists(&root);
        if root_existed && !options.force {
            return Err(ApplicationError::SolutionExists { path: root }.into());
        }

        let solution_name = self.solution_file_name(config.solution_name());
        let solution_file = root.join(&solution_name);
        let (document, original) = self.load_or_new(&solution_file)?;

        // 3. Manifest.
        let synthesizer = ManifestSynthesizer::new(self.id_strategy.generator(config.solution_name()));
        let (document, synthesis) =
            synthesizer.synthesize_with_summary(document, &plan.descriptors(), plan.groupings())?;

        // 4. Project files.
        let mut report = GenerationReport::new(root.clone(), solution_file.clone(), options.dry_run);
        report.synthesis = synthesis;

        let mut structure = ProjectStructure::new(&root);
        let mut rollback = Rollback::default();
        self.render_missing(&plan, &root, &mut structure, &mut report, &mut rollback)?;
        self.render_shared_missing(&plan, &root, &mut structure, &mut rollback)?;
        self.sort_references(&plan, &graph, &root, &mut report);

        if original.is_none() || !synthesis.is_noop() {
            structure.add_file(&solution_name, self.codec.serialize(&document));
        }

        if structure.entry_count() == 0 {
            info!("Solution is already up to date");
            return Ok(report);
        }
        structure.validate()?;
        report.paths = structure.files().map(|f| f.path.clone()).collect();

        if options.dry_run {
            info!(files = report.files_written(), "Dry run, nothing written");
            return Ok(report);
        }

        // 5. Write.
        if root_existed {
            match original {
                Some(text) => rollback.restore = Some((solution_file, text)),
                None => rollback.remove_files.push(solution_file),
            }
        } else {
            rollback = Rollback {
                remove_dirs: vec![root],
                ..Rollback::default()
            };
        }
        self.write_structure(&structure, &rollback)?;

        info!(files = report.files_written(), "Solution generated");
        Ok(report)
    }

    /// Add test projects to an existing solution.
    ///
    /// Layer projects are recognised by name (`<namespace>.<Layer>`) among the
    /// entries under `src/`. Test projects already in the solution are left
    /// untouched; if every requested kind exists, nothing is written.
    #[instrument(skip_all, fields(solution = %solution_file.display(), kinds = ?kinds))]
    pub fn add_test_projects(
        &self,
        solution_file: &Path,
        kinds: &[TestKind],
        options: AddTestsOptions,
    ) -> StrataResult<GenerationReport> {
        if !self.filesystem.exists(solution_file) {
            return Err(ApplicationError::SolutionNotFound {
                path: solution_file.to_path_buf(),
            }
            .into());
        }

        let original = self.filesystem.read_to_string(solution_file)?;
        let document = self.codec.parse(&original)?;
        let root = solution_file
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let (namespace, layers) = detect_layers(&document).ok_or_else(|| {
            ApplicationError::NoLayerProjects {
                path: solution_file.to_path_buf(),
            }
        })?;
        debug!(%namespace, layers = ?layers, "Detected layer projects");

        let solution_name = solution_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| namespace.clone());

        let framework = match options.target_framework {
            Some(framework) => framework,
            None => self.detect_framework(&root, &document, &namespace),
        };

        let config = SolutionConfiguration::builder()
            .solution_name(&solution_name)
            .base_namespace(&namespace)
            .target_framework(framework)
            .layers(layers.iter().copied())
            .tests(true)
            .build()?;
        let plan = SolutionPlan::tests_only(&config, &layers, kinds);

        let synthesizer = ManifestSynthesizer::new(self.id_strategy.generator(&solution_name));
        let (updated, synthesis) =
            synthesizer.synthesize_with_summary(document, &plan.descriptors(), plan.groupings())?;

        let mut report =
            GenerationReport::new(root.clone(), solution_file.to_path_buf(), options.dry_run);
        report.synthesis = synthesis;

        let mut structure = ProjectStructure::new(&root);
        let mut rollback = Rollback::default();
        self.render_missing(&plan, &root, &mut structure, &mut report, &mut rollback)?;

        let solution_entry = solution_file
            .file_name()
            .map_or_else(|| PathBuf::from(&solution_name), PathBuf::from);
        if !synthesis.is_noop() {
            structure.add_file(&solution_entry, self.codec.serialize(&updated));
        }

        if structure.entry_count() == 0 {
            info!("All requested test projects already exist");
            return Ok(report);
        }
        structure.validate()?;
        report.paths = structure.files().map(|f| f.path.clone()).collect();

        if options.dry_run {
            info!(files = report.files_written(), "Dry run, nothing written");
            return Ok(report);
        }

        rollback.restore = Some((solution_file.to_path_buf(), original));
        self.write_structure(&structure, &rollback)?;

        info!(added = report.projects_added.len(), "Test projects added");
        Ok(report)
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Parse the solution file if present, otherwise start a fresh document.
    fn load_or_new(&self, solution_file: &Path) -> StrataResult<(ManifestDocument, Option<String>)> {
        if !self.filesystem.exists(solution_file) {
            return Ok((ManifestDocument::new(), None));
        }
        let text = self.filesystem.read_to_string(solution_file)?;
        let document = self.codec.parse(&text)?;
        debug!(entries = document.entries().len(), "Loaded existing solution");
        Ok((document, Some(text)))
    }

    /// Render every planned project whose directory does not exist yet.
    fn render_missing(
        &self,
        plan: &SolutionPlan,
        root: &Path,
        structure: &mut ProjectStructure,
        report: &mut GenerationReport,
        rollback: &mut Rollback,
    ) -> StrataResult<()> {
        for project in plan.projects() {
            let dir = root.join(project.directory());
            if self.filesystem.exists(&dir) {
                warn!(project = project.name(), "Project already exists, skipping");
                report.projects_existing.push(project.name().to_string());
                continue;
            }

            let entries = self.renderer.render(plan, project)?;
            debug!(project = project.name(), entries = entries.len(), "Rendered project");
            structure.extend(entries);
            report.projects_added.push(project.name().to_string());
            rollback.remove_dirs.push(dir);
        }
        Ok(())
    }

    /// Solution-wide files that are not on disk yet.
    fn render_shared_missing(
        &self,
        plan: &SolutionPlan,
        root: &Path,
        structure: &mut ProjectStructure,
        rollback: &mut Rollback,
    ) -> StrataResult<()> {
        for entry in self.renderer.render_shared(plan)? {
            let path = root.join(entry.path());
            if self.filesystem.exists(&path) {
                debug!(path = %path.display(), "Shared file exists, keeping it");
                continue;
            }
            if matches!(entry, FsEntry::File(_)) {
                rollback.remove_files.push(path);
            }
            structure.extend([entry]);
        }
        Ok(())
    }

    /// Split the graph's edges into references this run writes and
    /// references that existing project files lack.
    fn sort_references(
        &self,
        plan: &SolutionPlan,
        graph: &LayerGraph,
        root: &Path,
        report: &mut GenerationReport,
    ) {
        for (from, to) in graph.edge_pairs() {
            let Some(project) = plan.project(ProjectRole::Layer(from)) else {
                continue;
            };
            if report.projects_added.iter().any(|name| name == project.name()) {
                report.references.push((from, to));
                continue;
            }

            let expected = normalize_path(&plan.layer_reference(to));
            let present = self
                .filesystem
                .read_to_string(&root.join(project.manifest_path()))
                .map(|text| {
                    self.renderer
                        .inspect(&text)
                        .references
                        .iter()
                        .any(|r| normalize_path(r) == expected)
                })
                .unwrap_or(false);
            if !present {
                report.references_missing.push((from, to));
            }
        }

        if !report.references_missing.is_empty() {
            warn!(
                missing = ?report.references_missing,
                "Existing project files lack required references"
            );
        }
    }

    fn detect_framework(&self, root: &Path, document: &ManifestDocument, namespace: &str) -> String {
        let domain_name = format!("{namespace}.{}", Layer::Domain.project_suffix());
        document
            .projects()
            .find(|e| e.display_name() == domain_name)
            .and_then(|e| {
                self.filesystem
                    .read_to_string(&root.join(normalize_path(e.relative_path())))
                    .ok()
            })
            .and_then(|text| self.renderer.inspect(&text).target_framework)
            .unwrap_or_else(|| DEFAULT_TARGET_FRAMEWORK.to_string())
    }

    /// Write project structure to filesystem with rollback on failure.
    fn write_structure(&self, structure: &ProjectStructure, rollback: &Rollback) -> StrataResult<()> {
        match self.write_all(structure) {
            Ok(()) => {
                info!("Successfully wrote all files");
                Ok(())
            }
            Err(e) => {
                warn!("Write failed, attempting rollback");
                self.rollback(rollback);
                Err(e)
            }
        }
    }

    /// Write all entries in the structure.
    fn write_all(&self, structure: &ProjectStructure) -> StrataResult<()> {
        self.filesystem.create_dir_all(structure.root())?;

        for entry in structure.entries() {
            let path = structure.root().join(entry.path());
            match entry {
                FsEntry::Directory(_) => self.filesystem.create_dir_all(&path)?,
                FsEntry::File(file) => {
                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }
                    self.filesystem.write_file(&path, &file.content)?;
                }
            }
        }

        Ok(())
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, rollback: &Rollback) {
        for dir in &rollback.remove_dirs {
            if self.filesystem.exists(dir) {
                if let Err(e) = self.filesystem.remove_dir_all(dir) {
                    warn!(error = %e, path = %dir.display(), "Rollback failed");
                }
            }
        }
        for file in &rollback.remove_files {
            if self.filesystem.exists(file) {
                if let Err(e) = self.filesystem.remove_file(file) {
                    warn!(error = %e, path = %file.display(), "Rollback failed");
                }
            }
        }
        if let Some((path, text)) = &rollback.restore {
            if let Err(e) = self.filesystem.write_file(path, text) {
                warn!(error = %e, path = %path.display(), "Could not restore solution file");
            }
        }
        info!("Rollback finished");
    }
}

/// Namespace and layers of the layer projects found under `src/`.
///
/// When several namespaces are present the Domain project's wins.
fn detect_layers(document: &ManifestDocument) -> Option<(String, BTreeSet<Layer>)> {
    let mut by_namespace: BTreeMap<String, BTreeSet<Layer>> = BTreeMap::new();
    let src_prefix = format!("{SOURCES_GROUP}/");

    for entry in document.projects() {
        if !normalize_path(entry.relative_path()).starts_with(&src_prefix) {
            continue;
        }
        let Some(layer) = Layer::from_project_name(entry.display_name()) else {
            continue;
        };
        let name = entry.display_name();
        let namespace = &name[..name.len() - layer.project_suffix().len()];
        let Some(namespace) = namespace.strip_suffix('.') else {
            continue;
        };
        if namespace.is_empty() {
            continue;
        }
        by_namespace
            .entry(namespace.to_string())
            .or_default()
            .insert(layer);
    }

    let preferred = by_namespace
        .iter()
        .find(|(_, layers)| layers.contains(&Layer::Domain))
        .map(|(ns, _)| ns.clone())
        .or_else(|| by_namespace.keys().next().cloned())?;
    let layers = by_namespace.remove(&preferred)?;
    Some((preferred, layers))
}
