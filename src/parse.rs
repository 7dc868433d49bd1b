// src/parse.rs

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::schema::{DataRow, TableData};

/// Rows shown by default on the index page and the preview endpoint.
pub const DEFAULT_ROW_LIMIT: usize = 10;

/// Column label → value, in column order.
pub type DisplayRow = IndexMap<String, String>;

/// Flatten table data into display rows, keeping at most `limit` rows
/// (`None` keeps them all).
///
/// Each key is placed under the label of the column at the same position.
/// The last column is the measurement, so its slot always ends up holding
/// the row's first value, whether or not a key was present for it.
pub fn flatten(data: &TableData, limit: Option<usize>) -> Vec<DisplayRow> {
    data.data
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|row| flatten_row(data, row))
        .collect()
}

fn flatten_row(data: &TableData, row: &DataRow) -> DisplayRow {
    let mut out = DisplayRow::with_capacity(data.columns.len());
    for (column, key) in data.columns.iter().zip(&row.key) {
        out.insert(column.text.clone(), key.clone());
    }
    if let (Some(last), Some(value)) = (data.columns.last(), row.values.first()) {
        out.insert(last.text.clone(), value.clone());
    }
    out
}

/// [`flatten`] with the default limit; absent data gives no rows.
pub fn display_rows(data: Option<&TableData>) -> Vec<DisplayRow> {
    data.map(|d| flatten(d, Some(DEFAULT_ROW_LIMIT)))
        .unwrap_or_default()
}

/// Flatten an undecoded response. Anything that is not table data
/// (missing `columns`, `data` not a list, ...) yields no rows.
pub fn flatten_value(raw: &Value, limit: Option<usize>) -> Vec<DisplayRow> {
    match TableData::deserialize(raw) {
        Ok(data) => flatten(&data, limit),
        Err(e) => {
            warn!(error = %e, "Error parsing data");
            Vec::new()
        }
    }
}
