//! Core domain layer for Strata.
//!
//! Pure rules, no I/O. Which layer may depend on which, how a dependency
//! graph is validated, and how a solution manifest is patched all live here.
//! File access, text formats and rendering are behind the ports defined in
//! the application layer.
//!
//! - **No I/O**: no filesystem, no text codecs
//! - **No logging**: observability belongs to the application and CLI layers
//! - **Deterministic**: ordered collections everywhere output order matters
//!
// Public API - what the world sees
pub mod dependency_validator;
pub mod entities;
pub mod error;
pub mod graph;
pub mod policy;
pub mod synthesizer;
pub mod value_objects;
pub mod violation;

mod validation;

// Re-exports for convenience
pub use dependency_validator::DependencyRuleValidator;
pub use entities::{
    identity::{EntryId, IdGenerator, IdStrategy, NameBasedIds, RandomIds},
    manifest::{
        ConfigLine, EntryKind, GlobalSection, ManifestDocument, ManifestEntry, normalize_path,
    },
    plan::{
        FolderGrouping, ProjectDescriptor, ProjectRole, ProjectSpec, SOURCES_GROUP, SolutionPlan,
        TESTS_GROUP,
    },
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure},
    solution::{DEFAULT_TARGET_FRAMEWORK, SolutionConfiguration, SolutionConfigurationBuilder},
};
pub use error::{DomainError, ErrorCategory};
pub use graph::LayerGraph;
pub use policy::{DependencyPolicy, FOUNDATION, LAYER_REGISTRY, LayerDef};
pub use synthesizer::{ManifestSynthesizer, SynthesisSummary};
pub use validation::DomainValidator;
pub use value_objects::{ApiStyle, BuildAxis, ConfigProperty, Layer, TestKind};
pub use violation::{Violation, ViolationList};
