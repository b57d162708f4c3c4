use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, DataTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by records (the usual export format)
/// * `.json`    – `[{ "NPI": 1, "State": "NY", ... }, ...]`
/// * `.parquet` – flat Parquet file, one column per field
pub fn load_file(path: &Path) -> Result<DataTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading dataset {}", path.display()))?;

    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.columns,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Cell types are guessed per value (integer, float, bool, text; empty is null).
fn load_csv(path: &Path) -> Result<DataTable> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

/// Parse CSV from any reader.  Shared by the file loader and export tests.
///
/// Types are guessed from the text, so a cell that started as `Text("0012")`
/// or `Text("")` comes back as `Integer(12)` or `Null`; the rendered strings
/// are unchanged.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<DataTable> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        bail!("CSV has no header row");
    }

    let mut table = DataTable::new(headers);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = record.iter().map(guess_cell_type).collect();
        table.push_row(row);
    }

    Ok(table)
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_nan() {
            return CellValue::Null;
        }
        return CellValue::Float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "NPI": 1000000001, "State": "NY", "Login Time": "2024-01-01 08:15:00" },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance; keys missing from a record are null.
fn load_json(path: &Path) -> Result<DataTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = DataTable::new(columns.clone());
    for rec in records {
        // Checked above.
        let Some(obj) = rec.as_object() else { continue };
        let row = columns
            .iter()
            .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file.
///
/// Strings, integers, floats and bools map directly; temporal columns
/// (`df.to_parquet()` writes datetimes as `Timestamp(ns)`) are rendered to
/// their ISO text so the timestamp parser sees the same thing a CSV holds.
/// Zoned timestamps render in their own zone with an offset, keeping the
/// local hour.
fn load_parquet(path: &Path) -> Result<DataTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = DataTable::new(columns);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect();
            table.push_row(cells);
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let typed = match col.data_type() {
        DataType::Utf8 => col
            .as_string_opt::<i32>()
            .map(|s| CellValue::Text(s.value(row).to_string())),
        DataType::LargeUtf8 => col
            .as_string_opt::<i64>()
            .map(|s| CellValue::Text(s.value(row).to_string())),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };

    typed.unwrap_or_else(|| match array_value_to_string(col.as_ref(), row) {
        Ok(text) => CellValue::Text(text),
        Err(e) => {
            log::warn!("Unreadable {:?} cell at row {row}: {e}", col.data_type());
            CellValue::Null
        }
    })
}
