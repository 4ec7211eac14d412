use std::path::Path;

use anyhow::{bail, Context};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{ExploreError, Result};
use super::model::{Column, Table, Value};

/// Cell texts read as missing, as common dataframe readers do.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Tsv,
    Json,
    Parquet,
}

impl FileFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(FileFormat::Csv),
            "tsv" | "tab" => Ok(FileFormat::Tsv),
            "json" => Ok(FileFormat::Json),
            "parquet" | "pq" => Ok(FileFormat::Parquet),
            other => Err(ExploreError::Parse(format!(
                "unsupported file extension: .{other}"
            ))),
        }
    }
}

/// Read and parse a file. Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Table> {
    let format = FileFormat::from_path(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))
        .map_err(into_parse_error)?;
    load_bytes(&bytes, format)
}

/// Parse an uploaded byte stream. One attempt; on failure nothing is kept.
pub fn load_bytes(bytes: &[u8], format: FileFormat) -> Result<Table> {
    let columns = match format {
        FileFormat::Csv => parse_delimited(bytes, b','),
        FileFormat::Tsv => parse_delimited(bytes, b'\t'),
        FileFormat::Json => parse_json(bytes),
        FileFormat::Parquet => parse_parquet(bytes),
    }
    .map_err(into_parse_error)?;

    if columns.is_empty() {
        return Err(ExploreError::Parse("the file has no columns".into()));
    }
    Table::new(columns)
}

fn into_parse_error(err: anyhow::Error) -> ExploreError {
    ExploreError::Parse(format!("{err:#}"))
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// Header row with column names, then one record per row. Every record must
/// have exactly as many fields as the header.
fn parse_delimited(bytes: &[u8], delimiter: u8) -> anyhow::Result<Vec<Column>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        bail!("file has no header row");
    }

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("data row {}", row_no + 1))?;
        for (col_idx, field) in record.iter().enumerate() {
            values[col_idx].push(guess_value(field));
        }
    }

    Ok(headers
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name, vals))
        .collect())
}

fn guess_value(raw: &str) -> Value {
    let s = raw.trim();
    if MISSING_TOKENS.contains(&s) {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::from_f64(f);
    }
    match s {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        _ => Value::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON (`df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 63, "sex": 1, "target": 1 },
///   { "age": 37, "sex": 1, "target": 0 }
/// ]
/// ```
///
/// Columns appear in first-seen key order; keys missing from a record are null.
fn parse_json(bytes: &[u8]) -> anyhow::Result<Vec<Column>> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root.as_array().context("expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("record {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|rec| rec.get(&name).map_or(Value::Null, json_to_value))
                .collect();
            Column::new(name, values)
        })
        .collect();

    Ok(columns)
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::from_f64(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Flat Parquet table: every column a scalar (string, integer, float, bool).
/// Works with files written by both **Pandas** and **Polars**.
fn parse_parquet(bytes: &[u8]) -> anyhow::Result<Vec<Column>> {
    let data = bytes::Bytes::copy_from_slice(bytes);
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(data).context("reading parquet metadata")?;

    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, array) in batch.columns().iter().enumerate() {
            for row in 0..batch.num_rows() {
                let value = extract_value(array, row)
                    .with_context(|| format!("column '{}', row {row}", names[col_idx]))?;
                values[col_idx].push(value);
            }
        }
    }

    Ok(names
        .into_iter()
        .zip(values)
        .map(|(name, vals)| Column::new(name, vals))
        .collect())
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &ArrayRef, row: usize) -> anyhow::Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => Value::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Boolean => Value::Bool(col.as_boolean().value(row)),
        DataType::Int8 => Value::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => Value::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => Value::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => Value::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Value::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => Value::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => Value::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer)
        }
        DataType::Float32 => Value::from_f64(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => Value::from_f64(col.as_primitive::<Float64Type>().value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn csv_header_order_matches_schema() {
        let table = load_bytes(b"age,sex,target\n63,1,1\n37,1,0\n41,0,1\n", FileFormat::Csv)
            .expect("load");

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.schema().columns(), ["age", "sex", "target"]);
        assert_eq!(table.schema().numeric_columns(), vec!["age", "sex", "target"]);
    }

    #[test]
    fn csv_cells_are_typed() {
        let table = load_bytes(
            b"name, score ,flag,note\n  ann , 1.5,True,NA\nbob,2,false,\n",
            FileFormat::Csv,
        )
        .expect("load");

        assert_eq!(table.schema().columns(), ["name", "score", "flag", "note"]);
        let name = table.column("name").expect("name");
        assert_eq!(name.values[0], Value::Text("ann".into()));
        let score = table.column("score").expect("score");
        assert_eq!(score.values, vec![Value::Float(1.5), Value::Integer(2)]);
        let flag = table.column("flag").expect("flag");
        assert_eq!(flag.values, vec![Value::Bool(true), Value::Bool(false)]);
        let note = table.column("note").expect("note");
        assert!(note.values.iter().all(Value::is_null));
    }

    #[test]
    fn ragged_rows_are_a_parse_error() {
        let err = load_bytes(b"a,b\n1,2\n3\n", FileFormat::Csv).expect_err("ragged");
        assert!(matches!(err, ExploreError::Parse(_)));
    }

    #[test]
    fn empty_upload_is_a_parse_error() {
        let err = load_bytes(b"", FileFormat::Csv).expect_err("empty");
        assert!(matches!(err, ExploreError::Parse(_)));
    }

    #[test]
    fn duplicate_headers_are_a_parse_error() {
        let err = load_bytes(b"a,a\n1,2\n", FileFormat::Csv).expect_err("duplicate");
        assert!(matches!(err, ExploreError::Parse(_)));
    }

    #[test]
    fn header_only_gives_empty_table() {
        let table = load_bytes(b"a,b\n", FileFormat::Csv).expect("load");
        assert!(table.is_empty());
        assert_eq!(table.schema().columns(), ["a", "b"]);
    }

    #[test]
    fn tsv_uses_tabs() {
        let table = load_bytes(b"x\ty\n1\t2\n", FileFormat::Tsv).expect("load");
        assert_eq!(table.schema().columns(), ["x", "y"]);
    }

    #[test]
    fn json_records_keep_key_order_and_fill_gaps() {
        let json = br#"[{"zeta": 1, "alpha": "a"}, {"alpha": "b", "extra": 2.5}]"#;
        let table = load_bytes(json, FileFormat::Json).expect("load");

        assert_eq!(table.schema().columns(), ["zeta", "alpha", "extra"]);
        let zeta = table.column("zeta").expect("zeta");
        assert_eq!(zeta.values, vec![Value::Integer(1), Value::Null]);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(load_bytes(br#"{"a": 1}"#, FileFormat::Json).is_err());
        assert!(load_bytes(br#"[1, 2]"#, FileFormat::Json).is_err());
    }

    #[test]
    fn parquet_flat_columns() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("age", arrow::datatypes::DataType::Int64, false),
            Field::new("chol", arrow::datatypes::DataType::Float64, true),
            Field::new("sex", arrow::datatypes::DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![63, 37])),
                Arc::new(Float64Array::from(vec![Some(233.0), None])),
                Arc::new(StringArray::from(vec!["M", "F"])),
            ],
        )
        .expect("batch");

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");

        let table = load_bytes(&buf, FileFormat::Parquet).expect("load");
        assert_eq!(table.schema().columns(), ["age", "chol", "sex"]);
        assert_eq!(table.schema().numeric_columns(), vec!["age", "chol"]);
        let chol = table.column("chol").expect("chol");
        assert_eq!(chol.values, vec![Value::Float(233.0), Value::Null]);
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("heart.csv");
        let mut file = std::fs::File::create(&path).expect("create");
        file.write_all(b"age,target\n50,1\n").expect("write");

        let table = load_file(&path).expect("load");
        assert_eq!(table.row_count(), 1);

        let bad = dir.path().join("heart.xlsx");
        assert!(matches!(
            FileFormat::from_path(&bad),
            Err(ExploreError::Parse(_))
        ));
    }
}
