use super::model::DataTable;
use crate::error::Result;

/// Suggested name for the downloaded file.
pub const EXPORT_FILE_NAME: &str = "selected_doctors.csv";

/// MIME type of the export.
pub const EXPORT_MIME: &str = "text/csv";

/// Serialize a table to UTF-8 CSV with a header row.
pub fn to_csv_bytes(table: &DataTable) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(bytes)
}
