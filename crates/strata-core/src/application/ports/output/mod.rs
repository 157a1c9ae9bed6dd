//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `strata-adapters` crate provides implementations.

use crate::domain::{FsEntry, ManifestDocument, ProjectSpec, SolutionPlan};
use crate::error::StrataResult;
use std::path::Path;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `strata_adapters::filesystem::LocalFilesystem` (production)
/// - `strata_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StrataResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> StrataResult<()>;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> StrataResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> StrataResult<()>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> StrataResult<()>;
}

/// Port for the solution file text format.
///
/// The single place that knows how a [`ManifestDocument`] looks on disk.
///
/// Implemented by:
/// - `strata_adapters::codec::SlnCodec`
pub trait ManifestCodec: Send + Sync {
    /// Extension of files in this format, without the dot.
    fn file_extension(&self) -> &'static str;

    /// Parse a file's text. Unrecognised content is preserved where the
    /// document model allows it.
    fn parse(&self, text: &str) -> StrataResult<ManifestDocument>;

    /// Render a document back to text.
    fn serialize(&self, document: &ManifestDocument) -> String;
}

/// What an existing project file declares, as far as generation cares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFileInfo {
    pub target_framework: Option<String>,
    /// Referenced project files, as written in the file.
    pub references: Vec<String>,
}

/// Port for project file generation and inspection.
///
/// Implemented by:
/// - `strata_adapters::renderer::MsBuildRenderer`
pub trait ProjectRenderer: Send + Sync {
    /// Everything one project puts on disk: its project file, folder skeleton
    /// and placeholder sources. Paths are relative to the solution root.
    fn render(&self, plan: &SolutionPlan, project: &ProjectSpec) -> StrataResult<Vec<FsEntry>>;

    /// Files shared by every project of the solution, relative to the
    /// solution root. Existing files are never replaced.
    fn render_shared(&self, plan: &SolutionPlan) -> StrataResult<Vec<FsEntry>>;

    /// Read back the parts of an existing project file that generation
    /// depends on.
    fn inspect(&self, project_file: &str) -> ProjectFileInfo;
}
