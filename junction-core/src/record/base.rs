//! Records of named values.
use crate::error::JunctionError;
use chrono::prelude::{DateTime, Local};
use std::collections::{
    hash_map::{IntoIter, Iter, Keys},
    HashMap,
};

/// Represents possible types of values that can be stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// A single value, e.g. a reward or a count.
    Scalar(f32),

    /// A timestamp with local timezone.
    DateTime(DateTime<Local>),

    /// A 1-dimensional array, e.g. per-lane counts.
    Array1(Vec<f32>),

    /// A text value, e.g. the applied phase.
    String(String),
}

/// A container of key-value pairs.
///
/// ```rust
/// use junction_core::record::{Record, RecordValue};
///
/// let mut record = Record::from_scalar("reward", -4.0);
/// record.insert("phase", RecordValue::String("MainGreen".to_string()));
/// assert_eq!(record.get_scalar("reward").unwrap(), -4.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Returns an iterator that consumes the record.
    pub fn into_iter_in_record(self) -> IntoIter<String, RecordValue> {
        self.0.into_iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Merges two records, consuming both.
    ///
    /// Values of `record` overwrite values of `self` under the same key.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges another record into this one in place.
    pub fn merge_inplace(&mut self, record: Record) {
        self.0.extend(record.0);
    }

    /// Gets a scalar value from the record.
    pub fn get_scalar(&self, k: &str) -> Result<f32, JunctionError> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Ok(*v),
            Some(_) => Err(JunctionError::RecordValueTypeError("Scalar".to_string())),
            None => Err(JunctionError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a 1-dimensional array from the record.
    pub fn get_array1(&self, k: &str) -> Result<Vec<f32>, JunctionError> {
        match self.0.get(k) {
            Some(RecordValue::Array1(v)) => Ok(v.clone()),
            Some(_) => Err(JunctionError::RecordValueTypeError("Array1".to_string())),
            None => Err(JunctionError::RecordKeyError(k.to_string())),
        }
    }

    /// Gets a string value from the record.
    pub fn get_string(&self, k: &str) -> Result<String, JunctionError> {
        match self.0.get(k) {
            Some(RecordValue::String(s)) => Ok(s.clone()),
            Some(_) => Err(JunctionError::RecordValueTypeError("String".to_string())),
            None => Err(JunctionError::RecordKeyError(k.to_string())),
        }
    }

    /// Checks if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overwrites() {
        let a = Record::from_scalar("reward", -1.0);
        let b = Record::from_slice(&[
            ("reward", RecordValue::Scalar(-2.0)),
            ("phase", RecordValue::String("SideGreen".to_string())),
        ]);
        let merged = a.merge(b);

        assert_eq!(merged.get_scalar("reward").unwrap(), -2.0);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_typed_access_errors() {
        let record = Record::from_scalar("reward", -1.0);
        assert_eq!(
            record.get_string("reward"),
            Err(JunctionError::RecordValueTypeError("String".to_string()))
        );
        assert_eq!(
            record.get_scalar("missing"),
            Err(JunctionError::RecordKeyError("missing".to_string()))
        );
    }
}
