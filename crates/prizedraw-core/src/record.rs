// Schema-free roster records.
//
// A parse produces one `Columns` list shared by every record it creates, so
// all records from one upload have the same keys in header order.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

use crate::value::Value;

/// Ordered, de-duplicated column names from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    names: Vec<String>,
}

impl Columns {
    pub fn new(names: Vec<String>) -> Self {
        Columns { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// One data row: a value per column, in column order.
///
/// The trimmed source text is kept next to each coerced value, since
/// coercion is lossy (`007` and `7` both become `Integer(7)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    columns: Arc<Columns>,
    values: Vec<Value>,
    raw: Vec<String>,
}

impl Record {
    /// `raw` holds the trimmed fields; each is coerced into a value.
    pub(crate) fn new(columns: Arc<Columns>, raw: Vec<String>) -> Self {
        debug_assert_eq!(columns.len(), raw.len());
        let values = raw.iter().map(|field| Value::coerce(field)).collect();
        Record {
            columns,
            values,
            raw,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.position(name).map(|i| &self.values[i])
    }

    /// The field as it appeared in the file, trimmed but not coerced.
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.columns.position(name).map(|i| self.raw[i].as_str())
    }

    /// Display form of a field, e.g. for building a winner's name.
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).map(Value::to_string)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.names().iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.keys().zip(self.values.iter())
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
