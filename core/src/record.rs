//! Structured event records consumed by analytics sinks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Scalar or list value carried by an [`EventRecord`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// Whole number.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Free-form text.
    Text(String),
    /// Ordered list of values.
    List(Vec<RecordValue>),
}

impl From<i64> for RecordValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for RecordValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for RecordValue {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f32> for RecordValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for RecordValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for RecordValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RecordValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<RecordValue>> From<Vec<T>> for RecordValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Timestamped, named record of something that happened during a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Simulated seconds since the simulation was created; not reset between games.
    pub timestamp: f64,
    /// Record name, e.g. `UnitSpawn` or `GameEnd`.
    pub name: String,
    /// Key-value payload.
    pub data: BTreeMap<String, RecordValue>,
}

impl EventRecord {
    /// Creates a record with an empty payload.
    #[must_use]
    pub fn new(timestamp: f64, name: impl Into<String>) -> Self {
        Self {
            timestamp,
            name: name.into(),
            data: BTreeMap::new(),
        }
    }

    /// Adds a payload entry.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<RecordValue>) -> Self {
        let _ = self.data.insert(key.to_owned(), value.into());
        self
    }

    /// Looks up a payload entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.data.get(key)
    }
}

/// Destination for event records.
pub trait EventSink {
    /// Accepts a single record.
    fn log_event(&mut self, record: EventRecord);
}

impl EventSink for Vec<EventRecord> {
    fn log_event(&mut self, record: EventRecord) {
        self.push(record);
    }
}
