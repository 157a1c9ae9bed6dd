//! Manifest entry identity.
//!
//! Entry ids are opaque tokens. The manifest never derives them from call
//! order: an [`IdGenerator`] is injected, and the synthesizer only asks it for
//! an id when a lookup by name and path misses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{entities::manifest::EntryKind, error::DomainError};

// ── EntryId ───────────────────────────────────────────────────────────────────

/// Opaque, stable identifier of one manifest entry.
///
/// Displays as an upper-case hyphenated GUID without braces, the way solution
/// files spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(Uuid);

impl EntryId {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parse `XXXXXXXX-...` with or without surrounding braces.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim().trim_start_matches('{').trim_end_matches('}');
        Uuid::parse_str(trimmed)
            .map(Self)
            .map_err(|e| DomainError::MalformedDocument {
                reason: format!("invalid entry id '{raw}': {e}"),
            })
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:X}", self.0.hyphenated())
    }
}

impl FromStr for EntryId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ── Generators ────────────────────────────────────────────────────────────────

/// Source of fresh entry ids.
///
/// `salt` is zero on the first request for an entry and is incremented by the
/// caller when the returned id collides with one already in the document.
pub trait IdGenerator: Send + Sync {
    fn generate(&self, kind: EntryKind, display_name: &str, relative_path: &str, salt: u32)
    -> EntryId;
}

/// Deterministic ids: UUIDv5 over a per-solution namespace.
///
/// Two fresh runs for the same solution name produce byte-identical files.
#[derive(Debug, Clone)]
pub struct NameBasedIds {
    namespace: Uuid,
}

impl NameBasedIds {
    /// `seed` scopes the ids; the solution name is the natural choice.
    pub fn new(seed: &str) -> Self {
        let namespace = Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("strata:{seed}").as_bytes());
        Self { namespace }
    }
}

impl IdGenerator for NameBasedIds {
    fn generate(
        &self,
        kind: EntryKind,
        display_name: &str,
        relative_path: &str,
        salt: u32,
    ) -> EntryId {
        let key = format!(
            "{}|{}|{}|{}",
            kind.as_str(),
            display_name,
            relative_path.replace('\\', "/"),
            salt
        );
        EntryId(Uuid::new_v5(&self.namespace, key.as_bytes()))
    }
}

/// Random ids (UUIDv4), matching what IDEs write.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn generate(&self, _: EntryKind, _: &str, _: &str, _: u32) -> EntryId {
        EntryId(Uuid::new_v4())
    }
}

/// User-selectable id strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdStrategy {
    #[default]
    NameBased,
    Random,
}

impl IdStrategy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NameBased => "name-based",
            Self::Random => "random",
        }
    }

    /// Build the generator for a solution named `seed`.
    pub fn generator(self, seed: &str) -> Box<dyn IdGenerator> {
        match self {
            Self::NameBased => Box::new(NameBasedIds::new(seed)),
            Self::Random => Box::new(RandomIds),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name-based" | "namebased" | "deterministic" => Ok(Self::NameBased),
            "random" => Ok(Self::Random),
            other => Err(DomainError::InvalidConfiguration(format!(
                "unknown id strategy: {other}"
            ))),
        }
    }
}
