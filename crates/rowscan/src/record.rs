use serde_json::{Map, Value as JsonValue};

/// A single row of named columns with JSON values.
///
/// Columns keep the order in which the database returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, JsonValue)>,
}

impl Record {
    /// Creates an empty record.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty record with the capacity for `capacity` columns.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column.
    #[inline]
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<JsonValue>) {
        self.fields.push((column.into(), value.into()));
    }

    /// Returns the value of the first column with the name.
    #[inline]
    pub fn get(&self, column: &str) -> Option<&JsonValue> {
        self.fields
            .iter()
            .find_map(|(name, value)| (name == column).then_some(value))
    }

    /// Returns an iterator over the column names.
    #[inline]
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Returns an iterator over the columns and their values.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of columns.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts `self` into a JSON object. Later duplicate columns win.
    pub fn into_map(self) -> Map<String, JsonValue> {
        self.fields.into_iter().collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<JsonValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

impl From<Map<String, JsonValue>> for Record {
    #[inline]
    fn from(map: Map<String, JsonValue>) -> Self {
        map.into_iter().collect()
    }
}
