//! Tabular file formats
//!
//! The extension of a file name selects how a [`Table`] is read or written.
//! CSV and TSV cells are typed on read: empty cells become `null`, integers,
//! floats and booleans become JSON numbers and booleans, anything else is a
//! string. JSON files hold an array of records.

use crate::domain::{display_value, HarborError, Result, Table};
use serde_json::{Map, Number, Value};
use std::path::Path;

/// A supported tabular format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Tsv,
    Json,
}

impl TabularFormat {
    /// Format selected by a file extension, case-insensitive
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(TabularFormat::Csv),
            "tsv" => Some(TabularFormat::Tsv),
            "json" => Some(TabularFormat::Json),
            _ => None,
        }
    }

    /// Format selected by the extension of `path`
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    fn delimiter(self) -> u8 {
        match self {
            TabularFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Parses bytes into a table
pub fn decode(bytes: &[u8], format: TabularFormat) -> Result<Table> {
    match format {
        TabularFormat::Csv | TabularFormat::Tsv => decode_delimited(bytes, format.delimiter()),
        TabularFormat::Json => decode_json(bytes),
    }
}

/// Serializes a table
///
/// `header` controls the header row of delimited formats.
pub fn encode(table: &Table, format: TabularFormat, header: bool) -> Result<Vec<u8>> {
    match format {
        TabularFormat::Csv | TabularFormat::Tsv => {
            encode_delimited(table, format.delimiter(), header)
        }
        TabularFormat::Json => Ok(serde_json::to_vec(&table.to_records())?),
    }
}

fn decode_delimited(bytes: &[u8], delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = Table::new(columns);

    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(infer_cell).collect())?;
    }

    Ok(table)
}

fn encode_delimited(table: &Table, delimiter: u8, header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    if header {
        writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        writer.write_record(row.iter().map(display_value))?;
    }

    writer
        .into_inner()
        .map_err(|e| HarborError::Io(format!("Failed to flush CSV output: {}", e.error())))
}

fn decode_json(bytes: &[u8]) -> Result<Table> {
    let value: Value = serde_json::from_slice(bytes)?;
    table_from_json(value)
}

/// Builds a table from a JSON array of objects
///
/// A single object is treated as a one-row table.
pub fn table_from_json(value: Value) -> Result<Table> {
    let records = match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(HarborError::Serialization(format!(
                    "Expected an array of JSON objects, found element {other}"
                ))),
            })
            .collect::<Result<Vec<Map<String, Value>>>>()?,
        Value::Object(record) => vec![record],
        other => {
            return Err(HarborError::Serialization(format!(
                "Expected an array of JSON objects, found {}",
                json_kind(&other)
            )))
        }
    };

    Ok(Table::from_records(records))
}

fn infer_cell(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Some(float) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(float);
    }
    match raw {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("sales.csv", Some(TabularFormat::Csv) ; "csv")]
    #[test_case("SALES.TSV", Some(TabularFormat::Tsv) ; "upper case tsv")]
    #[test_case("dir/data.json", Some(TabularFormat::Json) ; "json")]
    #[test_case("report.xlsx", None ; "spreadsheet")]
    #[test_case("noextension", None ; "no extension")]
    fn test_format_from_path(path: &str, expected: Option<TabularFormat>) {
        assert_eq!(TabularFormat::from_path(Path::new(path)), expected);
    }

    #[test]
    fn test_decode_csv_infers_types() {
        let table = decode(
            b"region,sales,ratio,active,note\nA,10,0.5,true,\nB,-3,1e3,false,hi\n",
            TabularFormat::Csv,
        )
        .unwrap();

        assert_eq!(table.columns(), &["region", "sales", "ratio", "active", "note"]);
        assert_eq!(
            table.rows()[0],
            vec![json!("A"), json!(10), json!(0.5), json!(true), Value::Null]
        );
        assert_eq!(table.rows()[1][1], json!(-3));
        assert_eq!(table.rows()[1][2], json!(1000.0));
        assert_eq!(table.rows()[1][4], json!("hi"));
    }

    #[test]
    fn test_decode_tsv() {
        let table = decode(b"a\tb\n1\tx y\n", TabularFormat::Tsv).unwrap();
        assert_eq!(table.rows()[0], vec![json!(1), json!("x y")]);
    }

    #[test]
    fn test_decode_csv_ragged_rows_fail() {
        assert!(decode(b"a,b\n1,2,3\n", TabularFormat::Csv).is_err());
    }

    #[test]
    fn test_decode_json_records() {
        let table = decode(br#"[{"a": 1}, {"a": 2, "b": "x"}]"#, TabularFormat::Json).unwrap();
        assert_eq!(table.columns(), &["a", "b"]);
        assert_eq!(table.num_rows(), 2);
        assert_eq!(table.rows()[0][1], Value::Null);
    }

    #[test]
    fn test_decode_json_rejects_scalars() {
        let err = decode(b"42", TabularFormat::Json).unwrap_err();
        assert!(err.to_string().contains("a number"));
        assert!(decode(b"[1, 2]", TabularFormat::Json).is_err());
    }

    #[test]
    fn test_encode_csv() {
        let table = Table::from_rows(
            vec!["name".to_string(), "value".to_string()],
            vec![
                vec![json!("a,b"), json!(1.5)],
                vec![json!("c"), Value::Null],
            ],
        )
        .unwrap();

        let out = String::from_utf8(encode(&table, TabularFormat::Csv, true).unwrap()).unwrap();
        assert_eq!(out, "name,value\n\"a,b\",1.5\nc,\n");

        let out = String::from_utf8(encode(&table, TabularFormat::Tsv, false).unwrap()).unwrap();
        assert_eq!(out, "a,b\t1.5\nc\t\n");
    }

    #[test]
    fn test_encode_json() {
        let table = Table::from_rows(vec!["a".to_string()], vec![vec![json!(1)]]).unwrap();
        let out = encode(&table, TabularFormat::Json, true).unwrap();
        assert_eq!(out, br#"[{"a":1}]"#);
    }
}
