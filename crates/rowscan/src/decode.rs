use super::{Record, fields::expected_fields};
use rowscan_core::error::Error;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value as JsonValue};
use std::{any, collections::HashSet};

/// Strategy for mapping row columns onto the fields of a destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DecodeMode {
    /// Fails on unknown columns, duplicate columns and fields without a column.
    #[default]
    Strict,
    /// Skips unknown columns and keeps the default values of fields without a column.
    Lenient,
}

impl DecodeMode {
    /// Returns `true` if the mode is [`DecodeMode::Lenient`].
    #[inline]
    pub fn is_lenient(&self) -> bool {
        matches!(self, Self::Lenient)
    }
}

/// A value that can be decoded from a single row.
///
/// Every `Default + Serialize + DeserializeOwned` type decodes from a [`Record`]:
/// struct fields are matched by the names they deserialize from, maps take every column,
/// and primitives take the single column of the row.
pub trait DecodeRow<Row>: Default + Sized {
    /// Decodes a row and attempts to create an instance of `Self`.
    fn decode_row(row: &Row, mode: DecodeMode) -> Result<Self, Error>;
}

impl<T> DecodeRow<Record> for T
where
    T: Default + Serialize + DeserializeOwned,
{
    fn decode_row(row: &Record, mode: DecodeMode) -> Result<Self, Error> {
        let type_name = any::type_name::<T>();
        let template = serde_json::to_value(T::default()).map_err(|err| {
            Error::decode(format!("fail to inspect the fields of `{type_name}`: {err}"))
        })?;
        let (value, text_fields) = match (expected_fields::<T>(), template) {
            (Some(fields), template) if !fields.is_empty() => {
                let defaults = match template {
                    JsonValue::Object(defaults) => defaults,
                    _ => Map::new(),
                };
                let text_fields = string_fields(&defaults);
                let values = merge_fields(fields, defaults, row, mode)?;
                (JsonValue::Object(values), Some(text_fields))
            }
            (_, JsonValue::Object(defaults)) if !defaults.is_empty() => {
                let text_fields = string_fields(&defaults);
                let fields = defaults.keys().cloned().collect::<Vec<_>>();
                let fields = fields.iter().map(String::as_str).collect::<Vec<_>>();
                let values = merge_fields(&fields, defaults, row, mode)?;
                (JsonValue::Object(values), Some(text_fields))
            }
            (_, JsonValue::Object(_)) => (JsonValue::Object(row.clone().into_map()), None),
            (_, template) => {
                let text_fields = (!template.is_string()).then(HashSet::new);
                (decode_single_column(template, row, mode)?, text_fields)
            }
        };
        deserialize_value(&value, text_fields.as_ref()).map_err(|err| {
            Error::decode(format!("fail to decode the row as `{type_name}`: {err}"))
        })
    }
}

/// Returns the fields whose default value is a string.
fn string_fields(defaults: &Map<String, JsonValue>) -> HashSet<String> {
    defaults
        .iter()
        .filter(|(_, value)| value.is_string())
        .map(|(field, _)| field.clone())
        .collect()
}

/// Builds the object of field values from the matching columns.
///
/// The default values serialized from the destination fill in fields without
/// a column, and strict mode requires a column for each of them.
fn merge_fields(
    fields: &[&str],
    mut defaults: Map<String, JsonValue>,
    row: &Record,
    mode: DecodeMode,
) -> Result<Map<String, JsonValue>, Error> {
    let mut values = Map::new();
    for &field in fields {
        if let Some(value) = defaults.remove(field) {
            values.insert(field.to_owned(), value);
        }
    }
    let required = fields
        .iter()
        .filter(|field| values.contains_key(**field))
        .copied()
        .collect::<Vec<_>>();

    if mode.is_lenient() {
        for (column, value) in row.iter() {
            if fields.contains(&column) {
                let value = coerce_column(values.get(column), value);
                values.insert(column.to_owned(), value);
            }
        }
        return Ok(values);
    }

    let mut visited = HashSet::with_capacity(row.len());
    for (column, value) in row.iter() {
        if !visited.insert(column) {
            return Err(Error::decode(format!("duplicate `{column}` column")));
        }
        if !fields.contains(&column) {
            return Err(Error::decode(format!("no field for the `{column}` column")));
        }
        let value = coerce_column(values.get(column), value);
        values.insert(column.to_owned(), value);
    }
    if let Some(field) = required.iter().find(|field| !visited.contains(**field)) {
        return Err(Error::decode(format!("no column for the `{field}` field")));
    }
    Ok(values)
}

/// Takes the value of a single-column row for a primitive destination.
fn decode_single_column(
    template: JsonValue,
    row: &Record,
    mode: DecodeMode,
) -> Result<JsonValue, Error> {
    let mut values = row.iter().map(|(_, value)| value);
    match (values.next(), row.len()) {
        (Some(value), 1) => Ok(coerce_column(Some(&template), value)),
        (Some(value), _) if mode.is_lenient() => Ok(coerce_column(Some(&template), value)),
        (None, _) if mode.is_lenient() => Ok(template),
        (_, num_columns) => Err(Error::decode(format!(
            "expected 1 column for a primitive value, got {num_columns}"
        ))),
    }
}

/// Parses a text column holding JSON when the field expects an array or an object.
fn coerce_column(template: Option<&JsonValue>, value: &JsonValue) -> JsonValue {
    match (template, value) {
        (Some(JsonValue::Array(_) | JsonValue::Object(_)), JsonValue::String(text)) => {
            parse_json_text(text).unwrap_or_else(|| value.clone())
        }
        _ => value.clone(),
    }
}

/// Deserializes the value. If that fails, text columns holding JSON arrays
/// or objects are parsed, except for the text fields, and the value is
/// deserialized once more.
fn deserialize_value<T: DeserializeOwned>(
    value: &JsonValue,
    text_fields: Option<&HashSet<String>>,
) -> Result<T, serde_json::Error> {
    T::deserialize(value).or_else(|err| {
        let Some(text_fields) = text_fields else {
            return Err(err);
        };
        let parsed = match value {
            JsonValue::Object(fields) => {
                let mut changed = false;
                let fields = fields
                    .iter()
                    .map(|(field, value)| {
                        let parsed = value
                            .as_str()
                            .filter(|_| !text_fields.contains(field))
                            .and_then(parse_json_text);
                        let value = match parsed {
                            Some(parsed) => {
                                changed = true;
                                parsed
                            }
                            None => value.clone(),
                        };
                        (field.clone(), value)
                    })
                    .collect::<Map<_, _>>();
                changed.then_some(JsonValue::Object(fields))
            }
            JsonValue::String(text) => parse_json_text(text),
            _ => None,
        };
        match parsed {
            Some(parsed) => T::deserialize(&parsed).map_err(|_| err),
            None => Err(err),
        }
    })
}

/// Parses text shaped like a JSON array or object.
fn parse_json_text(text: &str) -> Option<JsonValue> {
    let text = text.trim();
    if text.starts_with('[') && text.ends_with(']') || text.starts_with('{') && text.ends_with('}')
    {
        serde_json::from_str(text).ok()
    } else {
        None
    }
}

/// Decodes a row with the mode, logging failures.
pub(crate) fn decode_row<T, R>(row: &R, mode: DecodeMode) -> Result<T, Error>
where
    T: DecodeRow<R>,
{
    T::decode_row(row, mode).map_err(|err| {
        tracing::warn!(?mode, "fail to decode the row: {err}");
        err.wrap("fail to decode the row")
    })
}
