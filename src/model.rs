use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ExtractError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page_number: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    #[must_use]
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    pub fn from_text_rows<R, C, S>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column)?.as_deref()
    }

    #[must_use]
    pub fn to_text_rows(&self) -> Vec<Vec<String>> {
        let width = self.width();
        self.rows
            .iter()
            .map(|row| {
                let mut out = row
                    .iter()
                    .map(|cell| cell.clone().unwrap_or_default())
                    .collect::<Vec<_>>();
                out.resize(width, String::new());
                out
            })
            .collect()
    }
}

pub trait EmbeddedGrid: Debug {
    fn grid(&self) -> &RawTable;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedTable {
    pub page: u32,
    pub table: RawTable,
}

impl EmbeddedGrid for DetectedTable {
    fn grid(&self) -> &RawTable {
        &self.table
    }
}

#[derive(Debug)]
pub enum TableSource {
    Grid(RawTable),
    Embedded(Box<dyn EmbeddedGrid>),
    Rows(Vec<Vec<String>>),
    Json(JsonValue),
}

impl TableSource {
    pub fn into_raw_table(self) -> Result<RawTable, ExtractError> {
        match self {
            Self::Grid(table) => Ok(table),
            Self::Embedded(object) => Ok(object.grid().clone()),
            Self::Rows(rows) => Ok(RawTable::from_text_rows(rows)),
            Self::Json(value) => json_to_raw_table(&value),
        }
    }
}

impl From<RawTable> for TableSource {
    fn from(table: RawTable) -> Self {
        Self::Grid(table)
    }
}

impl From<Vec<Vec<String>>> for TableSource {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::Rows(rows)
    }
}

impl From<DetectedTable> for TableSource {
    fn from(table: DetectedTable) -> Self {
        Self::Embedded(Box::new(table))
    }
}

impl From<JsonValue> for TableSource {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}

const EMBEDDED_GRID_KEYS: [&str; 3] = ["grid", "rows", "df"];

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn unsupported(kind: impl Into<String>) -> ExtractError {
    ExtractError::UnsupportedTableFormat { kind: kind.into() }
}

fn json_cell(value: &JsonValue) -> Result<Option<String>, ExtractError> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(text) => Ok(Some(text.clone())),
        JsonValue::Number(number) => Ok(Some(number.to_string())),
        JsonValue::Bool(flag) => Ok(Some(flag.to_string())),
        other => Err(unsupported(format!(
            "cell of type {}",
            json_type_name(other)
        ))),
    }
}

fn json_to_raw_table(value: &JsonValue) -> Result<RawTable, ExtractError> {
    match value {
        JsonValue::Array(rows) => {
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let JsonValue::Array(cells) = row else {
                    return Err(unsupported(format!(
                        "array with {} row",
                        json_type_name(row)
                    )));
                };
                out.push(cells.iter().map(json_cell).collect::<Result<Vec<_>, _>>()?);
            }
            Ok(RawTable::new(out))
        }
        JsonValue::Object(fields) => EMBEDDED_GRID_KEYS
            .iter()
            .find_map(|key| fields.get(*key))
            .map_or_else(
                || Err(unsupported("object without an embedded grid")),
                json_to_raw_table,
            ),
        other => Err(unsupported(json_type_name(other))),
    }
}
