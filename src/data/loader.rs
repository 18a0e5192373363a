use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::{DataError, DataResult};
use super::model::{CellValue, Dataset, Field, Record};

/// Sheet read from spreadsheet files unless configured otherwise.
pub const DEFAULT_SHEET: &str = "Sheet1";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the purchases dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – the named `sheet`, header in the first row
/// * `.csv`     – header row with column names
/// * `.json`    – `[{ "Parent Category": "...", "FICE": 1234, ... }, ...]`
/// * `.parquet` – one column per field
pub fn load_file(path: &Path, sheet: &str) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_spreadsheet(path, sheet)
            .with_context(|| format!("reading sheet '{sheet}' of {}", path.display()))?,
        "csv" => load_csv(path).with_context(|| format!("reading CSV {}", path.display()))?,
        "json" => load_json(path).with_context(|| format!("reading JSON {}", path.display()))?,
        "parquet" | "pq" => {
            load_parquet(path).with_context(|| format!("reading Parquet {}", path.display()))?
        }
        other => return Err(DataError::UnsupportedExtension(other.to_string()).into()),
    };

    let dataset = table
        .into_dataset()
        .with_context(|| format!("mapping columns of {}", path.display()))?;
    log::info!("Loaded {} purchase records from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// RawTable – untyped header + rows, shared by every format
// ---------------------------------------------------------------------------

/// Cells as read from the source, before they are mapped onto [`Field`]s.
#[derive(Debug, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Map header names onto the schema and build the dataset.
    ///
    /// Required columns must be present; unknown columns are ignored.
    pub fn into_dataset(self) -> DataResult<Dataset> {
        let mut columns: Vec<(Field, usize)> = Vec::with_capacity(Field::COUNT);
        for field in Field::ALL {
            match self.headers.iter().position(|h| h.trim() == field.column_name()) {
                Some(idx) => columns.push((field, idx)),
                None if field.is_required() => {
                    return Err(DataError::MissingColumn(field.column_name()))
                }
                None => log::debug!("optional column '{field}' not present"),
            }
        }

        let mut coerced = 0usize;
        let records: Vec<Record> = self
            .rows
            .into_iter()
            .map(|mut row| {
                let mut record = Record::default();
                for &(field, idx) in &columns {
                    let raw = row.get_mut(idx).map(std::mem::take).unwrap_or_default();
                    let was_null = raw.is_null();
                    record.set(field, raw);
                    if field == Field::Fice && !was_null && record.get(field).is_null() {
                        coerced += 1;
                    }
                }
                record
            })
            .collect();

        if coerced > 0 {
            log::warn!("{coerced} non-numeric FICE values were treated as blank");
        }
        Ok(Dataset::from_records(records))
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_spreadsheet(path: &Path, sheet: &str) -> DataResult<RawTable> {
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(DataError::SheetNotFound(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(DataError::InvalidFormat(format!("sheet '{sheet}' is empty")));
    };
    let headers = header_row.iter().map(|c| spreadsheet_cell(c).to_string()).collect();
    let rows = rows
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| row.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Float(*f),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> DataResult<RawTable> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(csv_cell).collect());
    }

    Ok(RawTable { headers, rows })
}

/// CSV cells stay literal text; typed columns are parsed when mapped onto
/// their [`Field`].
fn csv_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path) -> DataResult<RawTable> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let objects = root
        .as_array()
        .ok_or_else(|| DataError::InvalidFormat("expected top-level JSON array".to_string()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in objects.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::InvalidFormat(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = objects
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
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

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> DataResult<RawTable> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let headers = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| arrow_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::Text(format!("{other:?}")),
    }
}
