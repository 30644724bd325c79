use super::{fields, DatasetError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;

/// One untyped input row: column name to trimmed text value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Value of the first non-empty column among `names`, or "".
    pub fn first_of<S: AsRef<str>>(&self, names: &[S]) -> &str {
        names
            .iter()
            .filter_map(|name| self.fields.get(name.as_ref()))
            .find(|value| !value.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::default();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// Reads delimited text with a header row, one record per line. Quote
/// characters are ordinary text. Short rows are padded with "".
pub(crate) fn read_delimited<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Vec<RawRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .quoting(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let record: RawRecord = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(index, header)| (header.clone(), row.get(index).unwrap_or("").to_string()))
            .collect();
        records.push(record);
    }

    Ok(records)
}

/// Reads a JSON array of objects. Scalar fields map to columns directly;
/// the nested per-party `positionen`/`erklaerungen` maps are flattened into
/// `partei_<id>`/`erklaerung_<id>` columns. Flat columns win over nested
/// entries for the same party.
pub(crate) fn read_document<R: Read>(reader: R) -> Result<Vec<RawRecord>, DatasetError> {
    let document: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = document else {
        return Err(DatasetError::MalformedDocument {
            reason: "expected a top-level array".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| record_from_value(index + 1, item))
        .collect()
}

fn record_from_value(row: usize, item: Value) -> Result<RawRecord, DatasetError> {
    let Value::Object(object) = item else {
        return Err(DatasetError::MalformedDocument {
            reason: format!("record {row} is not an object"),
        });
    };

    let mut record = RawRecord::default();
    let mut nested = Vec::new();

    for (key, value) in object {
        let key = normalize_header(&key);
        match value {
            Value::Object(map) => nested.push((key, map)),
            other => {
                if let Some(text) = scalar_text(row, &key, other)? {
                    record.insert(key, text);
                }
            }
        }
    }

    for (key, map) in nested {
        flatten_party_map(row, &key, map, &mut record)?;
    }

    Ok(record)
}

fn flatten_party_map(
    row: usize,
    key: &str,
    map: Map<String, Value>,
    record: &mut RawRecord,
) -> Result<(), DatasetError> {
    for (party_id, value) in map {
        let party_id = normalize_header(&party_id);
        let Some(column) = fields::flattened_column(key, &party_id) else {
            return Err(DatasetError::MalformedDocument {
                reason: format!("record {row} field '{key}' is not a scalar"),
            });
        };
        let field = format!("{key}.{party_id}");
        if let Some(text) = scalar_text(row, &field, value)? {
            record.fields.entry(column).or_insert(text);
        }
    }
    Ok(())
}

fn scalar_text(row: usize, field: &str, value: Value) -> Result<Option<String>, DatasetError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text.trim().to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Array(_) | Value::Object(_) => Err(DatasetError::MalformedDocument {
            reason: format!("record {row} field '{field}' is not a scalar"),
        }),
    }
}

fn normalize_header(value: &str) -> String {
    value.replace(['\u{feff}', '\u{200b}'], "").trim().to_string()
}
