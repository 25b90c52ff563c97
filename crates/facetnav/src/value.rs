//! Field values and their parameter encoding.
//!
//! [`FieldValue`] is what a data source hands back from distinct-value
//! enumeration and what filters narrow on. Its derived ordering is the
//! "natural" ordering used to break count ties: lexicographic for text,
//! ascending for numbers and ids, chronological for dates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::ValueType;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Identity of a related record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Runtime representation of a single field value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Reference to a related record (foreign key or one member of a many-relation)
    Ref(RecordId),
}

impl FieldValue {
    /// Parse a raw parameter value as `value_type`.
    ///
    /// Returns `None` for anything that does not parse; callers treat that as
    /// "no selection".
    pub fn parse(raw: &str, value_type: ValueType) -> Option<Self> {
        match value_type {
            ValueType::Text => Some(FieldValue::Text(raw.to_string())),
            ValueType::Integer => raw.trim().parse().ok().map(FieldValue::Integer),
            ValueType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(FieldValue::Boolean(true)),
                "false" | "0" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
            ValueType::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .ok()
                .map(FieldValue::Date),
            ValueType::DateTime => NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT)
                .ok()
                .map(FieldValue::DateTime),
            ValueType::Ref => raw
                .trim()
                .parse()
                .ok()
                .map(|id| FieldValue::Ref(RecordId(id))),
        }
    }

    /// Encode for a parameter store. Inverse of [`FieldValue::parse`].
    pub fn to_param(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Date(d) => d.format(DATE_FORMAT).to_string(),
            FieldValue::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            FieldValue::Ref(id) => id.to_string(),
        }
    }

    pub fn as_ref_id(&self) -> Option<RecordId> {
        match self {
            FieldValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// Calendar date of a temporal value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::DateTime(dt) => Some(dt.date()),
            _ => None,
        }
    }

    /// Point in time of a temporal value; dates start at midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Date(d) => d.and_hms_opt(0, 0, 0),
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Boolean(true) => f.write_str("Yes"),
            FieldValue::Boolean(false) => f.write_str("No"),
            FieldValue::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            FieldValue::Ref(id) => write!(f, "#{id}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<RecordId> for FieldValue {
    fn from(value: RecordId) -> Self {
        FieldValue::Ref(value)
    }
}
