//! Report data model
//!
//! A source adapter returns [`ReportData`]: either a [`Table`] of JSON cells
//! with named columns, or an opaque byte buffer for reports declared raw.
//! Sinks receive their own copy of it.

use crate::domain::errors::HarborError;
use crate::domain::result::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Data produced by a report and consumed by its results
#[derive(Debug, Clone, PartialEq)]
pub enum ReportData {
    /// Rows with named columns
    Table(Table),
    /// Unparsed bytes
    Raw(Vec<u8>),
}

impl ReportData {
    /// Returns the table, if this is tabular data
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            ReportData::Table(table) => Some(table),
            ReportData::Raw(_) => None,
        }
    }

    /// Consumes the data, failing for raw buffers
    ///
    /// `consumer` names the adapter that needs a table and ends up in the
    /// error message.
    pub fn into_table(self, consumer: &str) -> Result<Table> {
        match self {
            ReportData::Table(table) => Ok(table),
            ReportData::Raw(_) => Err(HarborError::Adapter(format!(
                "{consumer} requires tabular data, but the report produced raw bytes"
            ))),
        }
    }

    /// True for raw byte buffers
    pub fn is_raw(&self) -> bool {
        matches!(self, ReportData::Raw(_))
    }

    /// `(rows, columns)` for tables
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.as_table().map(|t| (t.num_rows(), t.num_columns()))
    }
}

impl From<Table> for ReportData {
    fn from(table: Table) -> Self {
        ReportData::Table(table)
    }
}

impl From<Vec<u8>> for ReportData {
    fn from(bytes: Vec<u8>) -> Self {
        ReportData::Raw(bytes)
    }
}

/// A table of JSON values with named columns
///
/// Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Creates a table from rows, checking every row's width
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Creates a table from JSON objects
    ///
    /// Columns appear in order of first occurrence; keys missing from a
    /// record become `null`.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Appends a row
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(HarborError::Adapter(format!(
                "Row has {} cells but the table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Rows as JSON objects keyed by column name
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect::<Map<String, Value>>()
            })
            .collect()
    }

    /// Projects the table onto exactly `columns`, in that order
    ///
    /// Columns absent from the table are filled with `default`; columns not
    /// listed are dropped.
    pub fn project(&self, columns: &[String], default: &Value) -> Table {
        let sources: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                sources
                    .iter()
                    .map(|src| match src {
                        Some(idx) => row[*idx].clone(),
                        None => default.clone(),
                    })
                    .collect()
            })
            .collect();

        Table {
            columns: columns.to_vec(),
            rows,
        }
    }

    /// Splits rows into groups keyed by `key_of(cell)` for the given column
    ///
    /// Groups are returned in ascending order of their key cells: numeric
    /// cells by value (so `9` comes before `10`) ahead of everything else,
    /// which is ordered by group text. Rows keep their relative order within
    /// a group. Rows for which `key_of` returns `None` belong to no group.
    pub fn partition<F>(&self, column: &str, mut key_of: F) -> Result<Vec<(String, Table)>>
    where
        F: FnMut(&Value) -> Result<Option<String>>,
    {
        let idx = self.column_index(column).ok_or_else(|| {
            HarborError::Adapter(format!("Partition column '{column}' not found in data"))
        })?;

        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(Option<f64>, String, Table)> = Vec::new();
        for row in &self.rows {
            let cell = &row[idx];
            let Some(key) = key_of(cell)? else {
                continue;
            };
            let position = match positions.get(&key) {
                Some(position) => *position,
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((cell.as_f64(), key, Table::new(self.columns.clone())));
                    groups.len() - 1
                }
            };
            groups[position].2.rows.push(row.clone());
        }

        groups.sort_by(|(a_num, a_key, _), (b_num, b_key, _)| match (a_num, b_num) {
            (Some(a), Some(b)) => a.total_cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a_key.cmp(b_key),
        });
        Ok(groups.into_iter().map(|(_, key, table)| (key, table)).collect())
    }
}

/// Renders a cell the way it appears in text outputs and template variables
///
/// Strings are used verbatim, `null` becomes the empty string and every
/// other value uses its JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
