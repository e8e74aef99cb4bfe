//! Record identifier with separator normalization.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Separator characters stripped during normalization.
///
/// Matches ids that differ only in formatting, e.g. a UUID written with
/// hyphens and the same UUID written without them.
const SEPARATORS: &[char] = &['-'];

/// Canonical identifier for a record.
///
/// Construction strips all separator characters from the raw string so
/// that differently-formatted representations of the same logical id
/// compare equal:
///
/// ```
/// use syncstore_core::RecordId;
///
/// assert_eq!(RecordId::new("abc-123"), RecordId::new("abc123"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

// Deserialization normalizes, so an id read from the wire compares
// equal to its locally-constructed form.
impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

impl RecordId {
    /// Creates a record id, normalizing the raw string.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    /// Creates a new random record id (a hyphen-free UUID v4).
    #[must_use]
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the normalized id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Strips separator characters from a raw identifier.
fn normalize(raw: &str) -> String {
    if raw.contains(SEPARATORS) {
        raw.replace(SEPARATORS, "")
    } else {
        raw.to_owned()
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RecordId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}
