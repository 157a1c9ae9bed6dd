//! `.sln` text codec.
//!
//! # Layout written
//!
//! ```text
//! <blank line>
//! Microsoft Visual Studio Solution File, Format Version 12.00
//! # Visual Studio Version 17
//! ...
//! Project("{TYPE}") = "Name", "path", "{ID}"
//! EndProject
//! Global
//! 	GlobalSection(SolutionConfigurationPlatforms) = preSolution
//! 	GlobalSection(ProjectConfigurationPlatforms) = postSolution
//! 	<sections kept verbatim, in file order>
//! 	GlobalSection(NestedProjects) = preSolution
//! EndGlobal
//! ```
//!
//! Lines end in CRLF and section content is tab-indented. The parser accepts
//! LF or CRLF and any leading whitespace. A file whose `Global` block is
//! missing or never closed still parses; the document reports
//! `is_terminated() == false` and the synthesizer refuses to patch it.

use thiserror::Error;
use tracing::{debug, instrument};

use strata_core::{
    application::{ApplicationError, ports::ManifestCodec},
    domain::{
        BuildAxis, ConfigLine, ConfigProperty, EntryId, EntryKind, GlobalSection,
        ManifestDocument, ManifestEntry,
    },
    error::{StrataError, StrataResult},
};

const EOL: &str = "\r\n";

const SOLUTION_PLATFORMS: &str = "SolutionConfigurationPlatforms";
const PROJECT_PLATFORMS: &str = "ProjectConfigurationPlatforms";
const NESTED_PROJECTS: &str = "NestedProjects";

/// Why a solution file could not be read.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlnError {
    #[error("line {line}: malformed project entry `{text}`")]
    ProjectLine { line: usize, text: String },

    #[error("line {line}: project entry `{name}` is never closed by EndProject")]
    UnterminatedProject { line: usize, name: String },

    #[error("line {line}: project entry after the Global block")]
    ProjectAfterGlobal { line: usize },

    #[error("line {line}: malformed GlobalSection header `{text}`")]
    SectionHeader { line: usize, text: String },

    #[error("line {line}: section {name} is never closed by EndGlobalSection")]
    UnterminatedSection { line: usize, name: String },

    #[error("line {line}: malformed {section} line `{text}`")]
    SectionLine {
        line: usize,
        section: &'static str,
        text: String,
    },

    #[error("line {line}: {reason}")]
    Rejected { line: usize, reason: String },
}

impl From<SlnError> for StrataError {
    fn from(err: SlnError) -> Self {
        ApplicationError::CodecFailed {
            format: "sln",
            reason: err.to_string(),
        }
        .into()
    }
}

/// Reads and writes Visual Studio solution files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlnCodec;

impl SlnCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestCodec for SlnCodec {
    fn file_extension(&self) -> &'static str {
        "sln"
    }

    #[instrument(skip_all, fields(bytes = text.len()))]
    fn parse(&self, text: &str) -> StrataResult<ManifestDocument> {
        let document = Parser::default().run(text)?;
        debug!(
            entries = document.entries().len(),
            config_lines = document.config_lines().len(),
            terminated = document.is_terminated(),
            "Parsed solution file"
        );
        Ok(document)
    }

    fn serialize(&self, document: &ManifestDocument) -> String {
        let mut out = Writer::default();

        out.line(0, "");
        for line in document.header() {
            out.line(0, line);
        }

        for entry in document.entries() {
            out.line(
                0,
                &format!(
                    "Project(\"{{{}}}\") = \"{}\", \"{}\", \"{{{}}}\"",
                    entry.type_guid(),
                    entry.display_name(),
                    entry.relative_path().replace('/', "\\"),
                    entry.id()
                ),
            );
            for line in entry.body() {
                out.line(0, line);
            }
            out.line(0, "EndProject");
        }

        if !document.is_terminated() {
            return out.finish();
        }

        out.line(0, "Global");

        out.section(SOLUTION_PLATFORMS, "preSolution", |out| {
            for axis in document.solution_axes() {
                out.line(2, &format!("{axis} = {axis}"));
            }
        });

        out.section(PROJECT_PLATFORMS, "postSolution", |out| {
            for line in document.config_lines() {
                out.line(2, &line.to_string());
            }
        });

        for section in document.extra_sections() {
            out.section(&section.name, &section.timing, |out| {
                for line in &section.lines {
                    out.line(2, line);
                }
            });
        }

        if !document.nesting().is_empty() {
            out.section(NESTED_PROJECTS, "preSolution", |out| {
                for (child, parent) in document.nesting() {
                    out.line(2, &format!("{{{child}}} = {{{parent}}}"));
                }
            });
        }

        out.line(0, "EndGlobal");
        out.finish()
    }
}

// ── Writing ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Writer {
    buf: String,
}

impl Writer {
    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.buf.push('\t');
        }
        self.buf.push_str(text);
        self.buf.push_str(EOL);
    }

    fn section(&mut self, name: &str, timing: &str, body: impl FnOnce(&mut Self)) {
        self.line(1, &format!("GlobalSection({name}) = {timing}"));
        body(self);
        self.line(1, "EndGlobalSection");
    }

    fn finish(self) -> String {
        self.buf
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Preamble,
    Project,
    Global,
    Section,
    Done,
}

struct OpenProject {
    line: usize,
    entry: ManifestEntry,
    body: Vec<String>,
}

struct OpenSection {
    line: usize,
    name: String,
    timing: String,
    lines: Vec<(usize, String)>,
}

#[derive(Default)]
struct Parser {
    state: State,
    header: Vec<String>,
    project: Option<OpenProject>,
    section: Option<OpenSection>,
    /// Nesting lines are applied once every entry is known.
    nesting: Vec<(usize, String)>,
}

impl Parser {
    fn run(mut self, text: &str) -> Result<ManifestDocument, SlnError> {
        let mut document = ManifestDocument::empty();
        let text = text.trim_start_matches('\u{feff}');

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let raw = raw.trim_end_matches('\r');
            let line = raw.trim();

            match self.state {
                State::Preamble => {
                    if line.starts_with("Project(") {
                        self.open_project(line_no, line)?;
                    } else if line == "Global" {
                        self.state = State::Global;
                    } else if !line.is_empty() && document.entries().is_empty() {
                        self.header.push(line.to_string());
                    }
                }
                State::Project => {
                    if line == "EndProject" {
                        self.close_project(&mut document)?;
                    } else if let Some(open) = self.project.as_mut() {
                        open.body.push(raw.to_string());
                    }
                }
                State::Global => {
                    if line == "EndGlobal" {
                        document.set_terminated(true);
                        self.state = State::Done;
                    } else if line.starts_with("Project(") {
                        return Err(SlnError::ProjectAfterGlobal { line: line_no });
                    } else if line.starts_with("GlobalSection(") {
                        self.open_section(line_no, line)?;
                    }
                }
                State::Section => {
                    if line == "EndGlobalSection" {
                        self.close_section(&mut document)?;
                    } else if !line.is_empty() {
                        if let Some(open) = self.section.as_mut() {
                            open.lines.push((line_no, line.to_string()));
                        }
                    }
                }
                State::Done => {}
            }
        }

        if let Some(open) = self.project.take() {
            return Err(SlnError::UnterminatedProject {
                line: open.line,
                name: open.entry.display_name().to_string(),
            });
        }
        if let Some(open) = self.section.take() {
            return Err(SlnError::UnterminatedSection {
                line: open.line,
                name: open.name,
            });
        }

        for (line_no, line) in std::mem::take(&mut self.nesting) {
            let (child, parent) = split_assignment(&line).ok_or(SlnError::SectionLine {
                line: line_no,
                section: NESTED_PROJECTS,
                text: line.clone(),
            })?;
            let child = parse_id(child, line_no, &line)?;
            let parent = parse_id(parent, line_no, &line)?;
            document
                .nest(child, parent)
                .map_err(|e| SlnError::Rejected {
                    line: line_no,
                    reason: e.to_string(),
                })?;
        }

        document.set_header(self.header);
        Ok(document)
    }

    fn open_project(&mut self, line_no: usize, line: &str) -> Result<(), SlnError> {
        let entry = parse_project_line(line).ok_or_else(|| SlnError::ProjectLine {
            line: line_no,
            text: line.to_string(),
        })?;
        self.project = Some(OpenProject {
            line: line_no,
            entry,
            body: Vec::new(),
        });
        self.state = State::Project;
        Ok(())
    }

    fn close_project(&mut self, document: &mut ManifestDocument) -> Result<(), SlnError> {
        if let Some(open) = self.project.take() {
            let line = open.line;
            document
                .push_entry(open.entry.with_body(open.body))
                .map_err(|e| SlnError::Rejected {
                    line,
                    reason: e.to_string(),
                })?;
        }
        self.state = State::Preamble;
        Ok(())
    }

    fn open_section(&mut self, line_no: usize, line: &str) -> Result<(), SlnError> {
        let malformed = || SlnError::SectionHeader {
            line: line_no,
            text: line.to_string(),
        };
        let rest = line.strip_prefix("GlobalSection(").ok_or_else(malformed)?;
        let (name, rest) = rest.split_once(')').ok_or_else(malformed)?;
        let timing = rest
            .trim()
            .strip_prefix('=')
            .map(str::trim)
            .ok_or_else(malformed)?;

        self.section = Some(OpenSection {
            line: line_no,
            name: name.trim().to_string(),
            timing: timing.to_string(),
            lines: Vec::new(),
        });
        self.state = State::Section;
        Ok(())
    }

    fn close_section(&mut self, document: &mut ManifestDocument) -> Result<(), SlnError> {
        self.state = State::Global;
        let Some(open) = self.section.take() else {
            return Ok(());
        };

        match open.name.as_str() {
            SOLUTION_PLATFORMS => {
                for (line_no, line) in open.lines {
                    let axis = split_assignment(&line)
                        .and_then(|(lhs, _)| lhs.parse::<BuildAxis>().ok())
                        .ok_or(SlnError::SectionLine {
                            line: line_no,
                            section: SOLUTION_PLATFORMS,
                            text: line.clone(),
                        })?;
                    document.add_solution_axis(axis);
                }
            }
            PROJECT_PLATFORMS => {
                for (line_no, line) in open.lines {
                    let config = parse_config_line(&line).ok_or(SlnError::SectionLine {
                        line: line_no,
                        section: PROJECT_PLATFORMS,
                        text: line.clone(),
                    })?;
                    document.insert_config_line(config);
                }
            }
            NESTED_PROJECTS => self.nesting.extend(open.lines),
            _ => {
                let mut section = GlobalSection::new(open.name, open.timing);
                section.lines = open.lines.into_iter().map(|(_, l)| l).collect();
                document.push_section(section);
            }
        }
        Ok(())
    }
}

/// `Project("{TYPE}") = "Name", "path", "{ID}"`
fn parse_project_line(line: &str) -> Option<ManifestEntry> {
    let rest = line.strip_prefix("Project(")?;
    let (type_guid, rest) = rest.split_once(')')?;
    let type_guid = type_guid.trim().trim_matches('"');
    let (_, values) = rest.split_once('=')?;

    let fields: Vec<&str> = values
        .split(',')
        .map(|f| f.trim().trim_matches('"'))
        .collect();
    let [name, path, id] = fields.as_slice() else {
        return None;
    };

    let id = EntryId::parse(id).ok()?;
    let kind = EntryKind::from_type_guid(type_guid);
    let path = path.replace('\\', "/");

    Some(ManifestEntry::new(id, *name, path, kind).with_type_guid(type_guid))
}

/// `{ID}.Debug|Any CPU.Build.0 = Debug|Any CPU`
fn parse_config_line(line: &str) -> Option<ConfigLine> {
    let (lhs, value) = split_assignment(line)?;
    let lhs = lhs.strip_prefix('{')?;
    let (id, rest) = lhs.split_once("}.")?;
    let entry = EntryId::parse(id).ok()?;

    // The property follows the first dot after the platform separator;
    // `Build.0` itself contains a dot.
    let bar = rest.find('|')?;
    let dot = bar + rest[bar..].find('.')?;
    let axis: BuildAxis = rest[..dot].parse().ok()?;
    let property = ConfigProperty::parse(&rest[dot + 1..]);

    Some(ConfigLine {
        entry,
        axis,
        property,
        value: value.to_string(),
    })
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
    line.split_once('=').map(|(l, r)| (l.trim(), r.trim()))
}

fn parse_id(raw: &str, line: usize, text: &str) -> Result<EntryId, SlnError> {
    EntryId::parse(raw).map_err(|_| SlnError::SectionLine {
        line,
        section: NESTED_PROJECTS,
        text: text.to_string(),
    })
}
