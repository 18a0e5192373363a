use std::io::Write;
use std::path::Path;

use super::error::DataResult;
use super::model::{Dataset, Field};

/// File name offered when the user downloads the filtered rows.
pub const EXPORT_FILE_NAME: &str = "filtered_data.csv";

/// Write the `columns` projection of `dataset` as CSV with a header row.
///
/// An empty dataset produces just the header.
pub fn write_csv<W: Write>(writer: W, dataset: &Dataset, columns: &[Field]) -> DataResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(columns.iter().map(|f| f.column_name()))?;
    for record in dataset.records() {
        csv.write_record(columns.iter().map(|f| record.get(*f).to_string()))?;
    }
    csv.flush()?;
    Ok(())
}

/// CSV payload as a string, for callers that hand it on instead of writing a file.
pub fn to_csv_string(dataset: &Dataset, columns: &[Field]) -> DataResult<String> {
    let mut buf = Vec::new();
    write_csv(&mut buf, dataset, columns)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn save_csv(path: &Path, dataset: &Dataset, columns: &[Field]) -> DataResult<()> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), dataset, columns)?;
    log::info!("Exported {} rows to {}", dataset.len(), path.display());
    Ok(())
}
