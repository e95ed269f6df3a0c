//! Identity keys for procurement records.
//!
//! A procurement line is identified by its (project, material/equipment,
//! vendor) triple. Source data comes from AI extraction over free-text
//! emails, so the same line routinely arrives with different casing or
//! stray whitespace ("Penthouse A " vs "penthouse a"). Keys are built from
//! normalised parts so those variants collapse onto one identity.

use std::fmt;

/// Separator used when rendering a key as text.
pub const KEY_SEPARATOR: &str = "||";

/// Normalised identity of a procurement record.
///
/// Equality and hashing are over the three parts, never over the rendered
/// string, so a field value that happens to contain [`KEY_SEPARATOR`] cannot
/// make two different triples collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    project: String,
    material: String,
    vendor: String,
}

impl RecordKey {
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.project,
            self.material,
            self.vendor,
            sep = KEY_SEPARATOR
        )
    }
}

/// Normalise one key part: trim surrounding whitespace, then lowercase.
pub fn normalize_part(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Derive the identity key for a (project, material, vendor) triple.
///
/// Missing parts should be passed as `""`; they normalise to the empty part
/// and still produce a valid key.
pub fn derive_key(project: &str, material: &str, vendor: &str) -> RecordKey {
    RecordKey {
        project: normalize_part(project),
        material: normalize_part(material),
        vendor: normalize_part(vendor),
    }
}
