//! Dynamic field-map records.
//!
//! A [`Record`] is a JSON object mapping field names to values. The core
//! interprets exactly three fields:
//!
//! - `id` — unique string identifier (compared after normalization)
//! - `updatedAt` — last-modified timestamp, as epoch milliseconds or an
//!   RFC 3339 string
//! - `deletedAt` — presence marks the record as soft-deleted
//!
//! Every other field passes through opaquely.

use crate::error::{CoreError, CoreResult};
use crate::id::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::UNIX_EPOCH;

/// Field holding the record identifier.
pub const FIELD_ID: &str = "id";
/// Field holding the last-modified timestamp.
pub const FIELD_UPDATED_AT: &str = "updatedAt";
/// Field whose presence marks a soft-deleted record.
pub const FIELD_DELETED_AT: &str = "deletedAt";

/// A timestamp as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Returns the raw millisecond value.
    #[must_use]
    pub fn millis(self) -> i64 {
        self.0
    }
}

/// Result of coercing a timestamp field on a record.
///
/// Distinguishes an absent field from one that is present but cannot be
/// read as a calendar timestamp; the reconciliation engine treats the
/// two differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampField {
    /// The field is not present on the record.
    Missing,
    /// The field coerced to a timestamp.
    At(Timestamp),
    /// The field is present but not coercible.
    Invalid,
}

/// A record: a mapping of field names to JSON values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    /// Creates a record with the given id and no other fields.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(FIELD_ID.to_owned(), Value::String(id.into()));
        Self { fields }
    }

    /// Creates an empty record with no fields at all.
    ///
    /// Useful for building patches for query-based updates, which do not
    /// need an id.
    #[must_use]
    pub fn empty() -> Self {
        Self { fields: Map::new() }
    }

    /// Creates a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> CoreResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CoreError::invalid_record(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Adds a field, consuming and returning the record (builder style).
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns a field value, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns the normalized record id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRecord`] if the `id` field is missing
    /// or is not a string (a caller contract violation).
    pub fn id(&self) -> CoreResult<RecordId> {
        match self.fields.get(FIELD_ID) {
            Some(Value::String(raw)) => Ok(RecordId::new(raw)),
            Some(other) => Err(CoreError::invalid_record(format!(
                "id field is not a string: {other}"
            ))),
            None => Err(CoreError::invalid_record("record has no id field")),
        }
    }

    /// Rewrites the `id` field to its normalized form, if the record has
    /// a string id.
    ///
    /// The reconciliation engine normalizes both sides in place before
    /// diffing, so records added to the local table carry canonical ids.
    pub fn normalize_id(&mut self) {
        let normalized = match self.fields.get(FIELD_ID) {
            Some(Value::String(raw)) => {
                let id = RecordId::new(raw);
                if id.as_str() == raw {
                    return;
                }
                id
            }
            _ => return,
        };
        self.fields.insert(
            FIELD_ID.to_owned(),
            Value::String(normalized.as_str().to_owned()),
        );
    }

    /// Coerces the `updatedAt` field to a calendar timestamp.
    #[must_use]
    pub fn updated_at(&self) -> TimestampField {
        coerce_timestamp(self.fields.get(FIELD_UPDATED_AT))
    }

    /// Returns true if the record carries a `deletedAt` marker.
    ///
    /// Presence of the field is the marker; its value is not interpreted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.fields.contains_key(FIELD_DELETED_AT)
    }

    /// Marks the record as soft-deleted at the given time.
    pub fn mark_deleted(&mut self, at: Timestamp) {
        self.fields
            .insert(FIELD_DELETED_AT.to_owned(), Value::from(at.millis()));
    }

    /// Overlays the fields of `patch` onto this record.
    ///
    /// Fields present in the patch replace the current values; all other
    /// fields are kept.
    pub fn apply_patch(&mut self, patch: &Record) {
        for (name, value) in &patch.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the fields.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Consumes the record, returning it as a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Coerces a JSON value to a calendar timestamp.
///
/// Numbers are taken as epoch milliseconds; strings are parsed as
/// RFC 3339. Anything else is invalid.
fn coerce_timestamp(value: Option<&Value>) -> TimestampField {
    match value {
        None => TimestampField::Missing,
        Some(Value::Number(n)) => {
            if let Some(millis) = n.as_i64() {
                TimestampField::At(Timestamp(millis))
            } else if let Some(f) = n.as_f64() {
                TimestampField::At(Timestamp(f as i64))
            } else {
                TimestampField::Invalid
            }
        }
        Some(Value::String(s)) => match humantime::parse_rfc3339(s) {
            Ok(time) => match time.duration_since(UNIX_EPOCH) {
                Ok(since) => TimestampField::At(Timestamp(since.as_millis() as i64)),
                // Pre-epoch instants are out of range for this system.
                Err(_) => TimestampField::Invalid,
            },
            Err(_) => TimestampField::Invalid,
        },
        Some(_) => TimestampField::Invalid,
    }
}
