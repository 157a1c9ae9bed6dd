pub mod identity;
pub mod manifest;
pub mod plan;
pub mod project_structure;
pub mod solution;

pub use crate::domain::DomainError;
pub use identity::{EntryId, IdGenerator, IdStrategy, NameBasedIds, RandomIds};
pub use manifest::{ConfigLine, EntryKind, GlobalSection, ManifestDocument, ManifestEntry};
pub use plan::{FolderGrouping, ProjectDescriptor, ProjectRole, ProjectSpec, SolutionPlan};
pub use project_structure::ProjectStructure;
pub use solution::{SolutionConfiguration, SolutionConfigurationBuilder};
