//! Open-schema test rows and their tabular projection
//!
//! Rows carry whatever columns the backend returns. The header of a rendered
//! batch comes from the first row; later rows with missing columns render
//! blank cells and extra columns are not shown.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};

/// Cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    /// Interpret form input: booleans, `null` and numerals keep their kind
    pub fn parse(input: &str) -> Self {
        match input {
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            "null" => Scalar::Null,
            _ => match serde_json::from_str::<Number>(input) {
                Ok(number) if input.trim() == input => Scalar::Number(number),
                _ => Scalar::Text(input.to_string()),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Scalar::Null,
            Value::Bool(b) => Scalar::Bool(b),
            Value::Number(n) => Scalar::Number(n),
            Value::String(s) => Scalar::Text(s),
            // nested values are shown as their JSON text
            other => Scalar::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One row of a test table, columns in backend order
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct TestRow {
    columns: Vec<(String, Scalar)>,
}

impl From<Map<String, Value>> for TestRow {
    fn from(map: Map<String, Value>) -> Self {
        Self {
            columns: map.into_iter().map(|(k, v)| (k, Scalar::from(v))).collect(),
        }
    }
}

impl Serialize for TestRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (key, value) in &self.columns {
            map.serialize_entry(key, &value.to_json())?;
        }
        map.end()
    }
}

impl TestRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing an earlier value under the same name
    pub fn set(&mut self, column: &str, value: Scalar) {
        match self.columns.iter_mut().find(|(k, _)| k == column) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.columns.iter().find(|(k, _)| k == column).map(|(_, v)| v)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Build a row from `column=value` form entries
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut row = TestRow::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (column, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::validation(format!("expected column=value, got '{}'", pair)))?;
            let column = column.trim();
            if column.is_empty() {
                return Err(Error::validation(format!("empty column name in '{}'", pair)));
            }
            row.set(column, Scalar::parse(value));
        }
        Ok(row)
    }
}

/// Rows projected onto the header of the first row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_rows(rows: &[TestRow]) -> Self {
        let Some(first) = rows.first() else {
            return Self::default();
        };
        let headers: Vec<String> = first.column_names().map(str::to_string).collect();
        let rows = rows
            .iter()
            .map(|row| {
                headers
                    .iter()
                    .map(|h| row.get(h).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
