//! Manifest synthesis: descriptors + groupings → document mutations.
//!
//! The synthesizer never removes or rewrites anything already in the
//! document. It ensures presence: folder groups, entries, nesting, and the
//! configuration lines for the fixed build matrix. Running it twice with the
//! same input leaves the document unchanged after the first run.

use std::collections::HashSet;

use crate::domain::{
    entities::{
        identity::IdGenerator,
        manifest::{EntryKind, ManifestDocument},
        plan::{FolderGrouping, ProjectDescriptor},
    },
    error::DomainError,
    value_objects::{BuildAxis, ConfigProperty},
};

/// Counts of what one synthesis pass added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisSummary {
    /// Solution-level build axes restored or created.
    pub axes_added: usize,
    pub entries_added: usize,
    pub nestings_added: usize,
    pub config_lines_added: usize,
}

impl SynthesisSummary {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

pub struct ManifestSynthesizer {
    ids: Box<dyn IdGenerator>,
    axes: Vec<BuildAxis>,
}

impl ManifestSynthesizer {
    /// A synthesizer registering projects against the standard
    /// `{Debug, Release} × {Any CPU}` matrix.
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            ids,
            axes: BuildAxis::standard_matrix(),
        }
    }

    /// Apply `descriptors` and `groupings` to `document`.
    pub fn synthesize(
        &self,
        document: ManifestDocument,
        descriptors: &[ProjectDescriptor],
        groupings: &[FolderGrouping],
    ) -> Result<ManifestDocument, DomainError> {
        self.synthesize_with_summary(document, descriptors, groupings)
            .map(|(document, _)| document)
    }

    /// Like [`synthesize`](Self::synthesize), also reporting what changed.
    pub fn synthesize_with_summary(
        &self,
        mut document: ManifestDocument,
        descriptors: &[ProjectDescriptor],
        groupings: &[FolderGrouping],
    ) -> Result<(ManifestDocument, SynthesisSummary), DomainError> {
        Self::check_preconditions(&document, descriptors, groupings)?;

        let mut summary = SynthesisSummary::default();
        let before = document.entries().len();

        for axis in &self.axes {
            if document.add_solution_axis(axis.clone()) {
                summary.axes_added += 1;
            }
        }

        for grouping in groupings {
            if document.folder_group(grouping.name()).is_none() {
                document.add_entry(
                    grouping.name(),
                    grouping.name(),
                    EntryKind::FolderGroup,
                    self.ids.as_ref(),
                );
            }
        }

        let mut ordered: Vec<&ProjectDescriptor> = descriptors.iter().collect();
        ordered.sort_by(|a, b| {
            a.rank()
                .cmp(&b.rank())
                .then_with(|| a.display_name().cmp(b.display_name()))
        });

        for descriptor in ordered {
            let id = document.add_entry(
                descriptor.display_name(),
                descriptor.relative_path(),
                EntryKind::Project,
                self.ids.as_ref(),
            );

            let parent = document.folder_group(descriptor.grouping()).ok_or_else(|| {
                DomainError::MalformedDocument {
                    reason: format!("solution folder '{}' is missing", descriptor.grouping()),
                }
            })?;
            if document.nest(id, parent)? {
                summary.nestings_added += 1;
            }

            for axis in &self.axes {
                for property in ConfigProperty::STANDARD {
                    if document.add_config_line(id, axis, property) {
                        summary.config_lines_added += 1;
                    }
                }
            }
        }

        summary.entries_added = document.entries().len() - before;
        Ok((document, summary))
    }

    fn check_preconditions(
        document: &ManifestDocument,
        descriptors: &[ProjectDescriptor],
        groupings: &[FolderGrouping],
    ) -> Result<(), DomainError> {
        if !document.is_terminated() {
            return Err(DomainError::MalformedDocument {
                reason: "missing top-level 'Global' ... 'EndGlobal' block".into(),
            });
        }

        let declared: HashSet<&str> = groupings.iter().map(FolderGrouping::name).collect();
        if let Some(orphan) = descriptors
            .iter()
            .find(|d| !declared.contains(d.grouping()))
        {
            return Err(DomainError::MalformedDocument {
                reason: format!(
                    "project '{}' targets undeclared solution folder '{}'",
                    orphan.display_name(),
                    orphan.grouping()
                ),
            });
        }

        Ok(())
    }
}
