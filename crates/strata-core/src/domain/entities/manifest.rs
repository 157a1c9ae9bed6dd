//! The structured solution manifest.
//!
//! A [`ManifestDocument`] is the in-memory model of a `.sln` file: entries
//! (projects and solution folders), per-entry configuration lines, a nesting
//! relation, and whatever else the file carried that we do not interpret.
//! Only the codec in the adapters crate knows the text format.
//!
//! Every mutator is idempotent: re-adding an existing entry, line, axis or
//! nesting is a no-op that reports `false` (or returns the existing id).

use std::fmt;

use crate::domain::{
    entities::identity::{EntryId, IdGenerator},
    error::DomainError,
    value_objects::{BuildAxis, ConfigProperty},
};

/// Project type GUID of a solution folder.
pub const FOLDER_TYPE_GUID: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

/// Project type GUID of a C# project.
pub const CSHARP_TYPE_GUID: &str = "FAE04EC0-301F-11D3-BF4B-00C04F79EFBC";

/// Header lines written at the top of every new solution file.
pub const STANDARD_HEADER: &[&str] = &[
    "Microsoft Visual Studio Solution File, Format Version 12.00",
    "# Visual Studio Version 17",
    "VisualStudioVersion = 17.0.31903.59",
    "MinimumVisualStudioVersion = 10.0.40219.1",
];

/// Slash-insensitive form of a manifest path.
pub fn normalize_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

// ── Entries ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Project,
    FolderGroup,
}

impl EntryKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::FolderGroup => "folder",
        }
    }

    /// Type GUID written for entries created by this tool.
    pub const fn type_guid(&self) -> &'static str {
        match self {
            Self::Project => CSHARP_TYPE_GUID,
            Self::FolderGroup => FOLDER_TYPE_GUID,
        }
    }

    /// Classify a type GUID read from a file. Anything that is not a solution
    /// folder is treated as a project.
    pub fn from_type_guid(guid: &str) -> Self {
        let bare = guid.trim().trim_start_matches('{').trim_end_matches('}');
        if bare.eq_ignore_ascii_case(FOLDER_TYPE_GUID) {
            Self::FolderGroup
        } else {
            Self::Project
        }
    }
}

/// One addressable unit of the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    id: EntryId,
    display_name: String,
    relative_path: String,
    kind: EntryKind,
    /// Type GUID as read from a file, when it differs from the kind's default.
    type_guid: Option<String>,
    /// Raw lines between the entry's header and `EndProject`.
    body: Vec<String>,
}

impl ManifestEntry {
    pub fn new(
        id: EntryId,
        display_name: impl Into<String>,
        relative_path: impl Into<String>,
        kind: EntryKind,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            relative_path: relative_path.into(),
            kind,
            type_guid: None,
            body: Vec::new(),
        }
    }

    /// Keep a loaded type GUID that is not the kind's default.
    pub fn with_type_guid(mut self, guid: &str) -> Self {
        let bare = guid.trim().trim_start_matches('{').trim_end_matches('}');
        if !bare.eq_ignore_ascii_case(self.kind.type_guid()) {
            self.type_guid = Some(bare.to_string());
        }
        self
    }

    pub fn with_body(mut self, body: Vec<String>) -> Self {
        self.body = body;
        self
    }

    pub const fn id(&self) -> EntryId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub const fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn type_guid(&self) -> &str {
        self.type_guid.as_deref().unwrap_or(self.kind.type_guid())
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::FolderGroup
    }

    fn matches(&self, display_name: &str, relative_path: &str) -> bool {
        self.display_name == display_name
            && normalize_path(&self.relative_path) == normalize_path(relative_path)
    }
}

// ── Configuration lines ───────────────────────────────────────────────────────

/// `{id}.Debug|Any CPU.ActiveCfg = Debug|Any CPU`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    pub entry: EntryId,
    pub axis: BuildAxis,
    pub property: ConfigProperty,
    /// Right-hand side: the project configuration the axis maps to.
    pub value: String,
}

impl ConfigLine {
    /// A line mapping `axis` onto the identically named project configuration.
    pub fn standard(entry: EntryId, axis: BuildAxis, property: ConfigProperty) -> Self {
        let value = axis.to_string();
        Self {
            entry,
            axis,
            property,
            value,
        }
    }

    fn same_key(&self, other: &ConfigLine) -> bool {
        self.entry == other.entry && self.axis == other.axis && self.property == other.property
    }
}

impl fmt::Display for ConfigLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}.{}.{} = {}",
            self.entry, self.axis, self.property, self.value
        )
    }
}

/// A `GlobalSection` the model does not interpret, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSection {
    pub name: String,
    /// `preSolution` or `postSolution`.
    pub timing: String,
    pub lines: Vec<String>,
}

impl GlobalSection {
    pub fn new(name: impl Into<String>, timing: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timing: timing.into(),
            lines: Vec::new(),
        }
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

// ── Document ──────────────────────────────────────────────────────────────────

/// Structured model of one solution file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDocument {
    header: Vec<String>,
    entries: Vec<ManifestEntry>,
    solution_axes: Vec<BuildAxis>,
    config_lines: Vec<ConfigLine>,
    /// `(child, parent)`, in insertion order.
    nesting: Vec<(EntryId, EntryId)>,
    extra_sections: Vec<GlobalSection>,
    terminated: bool,
}

impl ManifestDocument {
    /// A brand-new solution: standard header, standard solution axes, a
    /// `SolutionProperties` section and a closed `Global` block.
    pub fn new() -> Self {
        Self {
            header: STANDARD_HEADER.iter().map(|s| s.to_string()).collect(),
            entries: Vec::new(),
            solution_axes: BuildAxis::standard_matrix(),
            config_lines: Vec::new(),
            nesting: Vec::new(),
            extra_sections: vec![
                GlobalSection::new("SolutionProperties", "preSolution")
                    .with_line("HideSolutionNode = FALSE"),
            ],
            terminated: true,
        }
    }

    /// A document with nothing in it and no `Global` block; the codec fills
    /// it in while parsing.
    pub fn empty() -> Self {
        Self {
            header: Vec::new(),
            entries: Vec::new(),
            solution_axes: Vec::new(),
            config_lines: Vec::new(),
            nesting: Vec::new(),
            extra_sections: Vec::new(),
            terminated: false,
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn projects(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| !e.is_folder())
    }

    pub fn solution_axes(&self) -> &[BuildAxis] {
        &self.solution_axes
    }

    pub fn config_lines(&self) -> &[ConfigLine] {
        &self.config_lines
    }

    pub fn config_lines_for(&self, entry: EntryId) -> impl Iterator<Item = &ConfigLine> {
        self.config_lines.iter().filter(move |l| l.entry == entry)
    }

    pub fn nesting(&self) -> &[(EntryId, EntryId)] {
        &self.nesting
    }

    pub fn extra_sections(&self) -> &[GlobalSection] {
        &self.extra_sections
    }

    /// Whether the top-level `Global` ... `EndGlobal` block is present.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn entry(&self, id: EntryId) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Id of the entry with this display name and path, if any. Paths compare
    /// slash-insensitively.
    pub fn find_entry(&self, display_name: &str, relative_path: &str) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|e| e.matches(display_name, relative_path))
            .map(|e| e.id)
    }

    /// Id of the solution folder named `name`, if any.
    pub fn folder_group(&self, name: &str) -> Option<EntryId> {
        self.entries
            .iter()
            .find(|e| e.is_folder() && e.display_name == name)
            .map(|e| e.id)
    }

    pub fn parent_of(&self, child: EntryId) -> Option<EntryId> {
        self.nesting
            .iter()
            .find(|(c, _)| *c == child)
            .map(|(_, parent)| *parent)
    }

    // ── Mutators ──────────────────────────────────────────────────────────────

    /// Return the id of the matching entry, or create one.
    ///
    /// A new id is requested from `ids` only on a miss; if it collides with an
    /// existing entry the generator is asked again with an incremented salt.
    pub fn add_entry(
        &mut self,
        display_name: &str,
        relative_path: &str,
        kind: EntryKind,
        ids: &dyn IdGenerator,
    ) -> EntryId {
        if let Some(existing) = self.find_entry(display_name, relative_path) {
            return existing;
        }

        let mut salt = 0;
        let id = loop {
            let candidate = ids.generate(kind, display_name, relative_path, salt);
            if self.entry(candidate).is_none() {
                break candidate;
            }
            salt += 1;
        };

        self.entries
            .push(ManifestEntry::new(id, display_name, relative_path, kind));
        id
    }

    /// Append an already-identified entry (used when loading a file).
    pub fn push_entry(&mut self, entry: ManifestEntry) -> Result<(), DomainError> {
        if self.entry(entry.id).is_some() {
            return Err(DomainError::MalformedDocument {
                reason: format!("duplicate entry id {}", entry.id),
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Add `{entry}.{axis}.{property} = {axis}`. Returns `false` if a line with
    /// the same entry, axis and property already exists.
    pub fn add_config_line(
        &mut self,
        entry: EntryId,
        axis: &BuildAxis,
        property: ConfigProperty,
    ) -> bool {
        self.insert_config_line(ConfigLine::standard(entry, axis.clone(), property))
    }

    /// Add a fully specified line, keeping the first one on a key clash.
    pub fn insert_config_line(&mut self, line: ConfigLine) -> bool {
        if self.config_lines.iter().any(|l| l.same_key(&line)) {
            return false;
        }
        self.config_lines.push(line);
        true
    }

    /// Nest `child` under the folder `parent`.
    ///
    /// `Ok(false)` when it is already nested there.
    pub fn nest(&mut self, child: EntryId, parent: EntryId) -> Result<bool, DomainError> {
        let child_entry = self.entry(child).ok_or_else(|| DomainError::UnknownEntry {
            id: child.to_string(),
        })?;
        let parent_entry = self.entry(parent).ok_or_else(|| DomainError::UnknownEntry {
            id: parent.to_string(),
        })?;
        if !parent_entry.is_folder() {
            return Err(DomainError::NotAFolderGroup {
                name: parent_entry.display_name.clone(),
            });
        }

        match self.parent_of(child) {
            Some(current) if current == parent => Ok(false),
            Some(current) => Err(DomainError::AlreadyNestedElsewhere {
                child: child_entry.display_name.clone(),
                current_parent: self
                    .entry(current)
                    .map_or_else(|| current.to_string(), |e| e.display_name.clone()),
                requested_parent: parent_entry.display_name.clone(),
            }),
            None => {
                self.nesting.push((child, parent));
                Ok(true)
            }
        }
    }

    /// Register a solution-level build axis. Returns `false` if present.
    pub fn add_solution_axis(&mut self, axis: BuildAxis) -> bool {
        if self.solution_axes.contains(&axis) {
            return false;
        }
        self.solution_axes.push(axis);
        true
    }

    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = header;
    }

    pub fn push_section(&mut self, section: GlobalSection) {
        self.extra_sections.push(section);
    }

    pub fn set_terminated(&mut self, terminated: bool) {
        self.terminated = terminated;
    }
}

impl Default for ManifestDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::identity::NameBasedIds;

    fn ids() -> NameBasedIds {
        NameBasedIds::new("Shop")
    }

    struct Colliding;

    impl IdGenerator for Colliding {
        fn generate(&self, _: EntryKind, _: &str, _: &str, salt: u32) -> EntryId {
            // Same id for every entry on the first try.
            EntryId::from_uuid(uuid::Uuid::from_u128(u128::from(salt) + 1))
        }
    }

    #[test]
    fn add_entry_is_idempotent() {
        let mut doc = ManifestDocument::new();
        let first = doc.add_entry("src", "src", EntryKind::FolderGroup, &ids());
        let again = doc.add_entry("src", "src", EntryKind::FolderGroup, &ids());
        assert_eq!(first, again);
        assert_eq!(doc.entries().len(), 1);
    }

    #[test]
    fn find_entry_ignores_slash_direction() {
        let mut doc = ManifestDocument::new();
        let id = doc.add_entry(
            "Shop.Domain",
            "src/Shop.Domain/Shop.Domain.csproj",
            EntryKind::Project,
            &ids(),
        );
        assert_eq!(
            doc.find_entry("Shop.Domain", "src\\Shop.Domain\\Shop.Domain.csproj"),
            Some(id)
        );
        assert_eq!(doc.find_entry("Shop.Domain", "elsewhere.csproj"), None);
    }

    #[test]
    fn colliding_ids_are_salted() {
        let mut doc = ManifestDocument::new();
        let a = doc.add_entry("src", "src", EntryKind::FolderGroup, &Colliding);
        let b = doc.add_entry("tests", "tests", EntryKind::FolderGroup, &Colliding);
        assert_ne!(a, b);
    }

    #[test]
    fn config_lines_are_unique_per_key() {
        let mut doc = ManifestDocument::new();
        let id = doc.add_entry("A", "A/A.csproj", EntryKind::Project, &ids());
        let debug = BuildAxis::new("Debug", "Any CPU");

        assert!(doc.add_config_line(id, &debug, ConfigProperty::ActiveCfg));
        assert!(!doc.add_config_line(id, &debug, ConfigProperty::ActiveCfg));
        assert!(doc.add_config_line(id, &debug, ConfigProperty::Build0));
        assert_eq!(doc.config_lines_for(id).count(), 2);
        assert_eq!(
            doc.config_lines()[0].to_string(),
            format!("{{{id}}}.Debug|Any CPU.ActiveCfg = Debug|Any CPU")
        );
    }

    #[test]
    fn nesting_rules() {
        let mut doc = ManifestDocument::new();
        let src = doc.add_entry("src", "src", EntryKind::FolderGroup, &ids());
        let tests = doc.add_entry("tests", "tests", EntryKind::FolderGroup, &ids());
        let project = doc.add_entry("A", "src/A/A.csproj", EntryKind::Project, &ids());

        assert_eq!(doc.nest(project, src), Ok(true));
        assert_eq!(doc.nest(project, src), Ok(false));
        assert!(matches!(
            doc.nest(project, tests),
            Err(DomainError::AlreadyNestedElsewhere { ref current_parent, .. }) if current_parent == "src"
        ));
        assert!(matches!(
            doc.nest(src, project),
            Err(DomainError::NotAFolderGroup { .. })
        ));
        assert_eq!(doc.parent_of(project), Some(src));
    }

    #[test]
    fn nest_unknown_entry_fails() {
        let mut doc = ManifestDocument::new();
        let src = doc.add_entry("src", "src", EntryKind::FolderGroup, &ids());
        let ghost = EntryId::from_uuid(uuid::Uuid::nil());
        assert!(matches!(doc.nest(ghost, src), Err(DomainError::UnknownEntry { .. })));
    }

    #[test]
    fn new_document_has_skeleton() {
        let doc = ManifestDocument::new();
        assert!(doc.is_terminated());
        assert_eq!(doc.solution_axes().len(), 2);
        assert_eq!(doc.extra_sections()[0].name, "SolutionProperties");
        assert!(!ManifestDocument::empty().is_terminated());
    }

    #[test]
    fn solution_axes_are_unique() {
        let mut doc = ManifestDocument::new();
        assert!(!doc.add_solution_axis(BuildAxis::new("Debug", "Any CPU")));
        assert!(doc.add_solution_axis(BuildAxis::new("Debug", "x64")));
    }

    #[test]
    fn loaded_type_guid_is_kept() {
        let id = EntryId::from_uuid(uuid::Uuid::nil());
        let fsharp = ManifestEntry::new(id, "Lib", "Lib/Lib.fsproj", EntryKind::Project)
            .with_type_guid("{F2A71F9B-5D33-465A-A702-920D77279786}");
        assert_eq!(fsharp.type_guid(), "F2A71F9B-5D33-465A-A702-920D77279786");

        let csharp = ManifestEntry::new(id, "Lib", "Lib/Lib.csproj", EntryKind::Project)
            .with_type_guid("{fae04ec0-301f-11d3-bf4b-00c04f79efbc}");
        assert_eq!(csharp.type_guid(), CSHARP_TYPE_GUID);
    }
}
