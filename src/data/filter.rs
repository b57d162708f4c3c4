use super::model::DataTable;
use crate::error::{Result, TargetingError};
use crate::model::Label;

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

/// Return indices of rows whose login hour equals `hour` and whose prediction
/// is positive.
///
/// `login_hour` and `predictions` are parallel to the table rows.  A row
/// passes only when:
/// * its login hour is present and equal to `hour`
/// * it was scored and the label is [`Label::Positive`]
pub fn matching_rows(
    login_hour: &[Option<u32>],
    predictions: &[Option<Label>],
    hour: u32,
) -> Vec<usize> {
    login_hour
        .iter()
        .zip(predictions)
        .enumerate()
        .filter(|(_, (h, label))| {
            *h == &Some(hour) && label.is_some_and(Label::is_positive)
        })
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Copy `rows` of `table`, keeping only `columns` in the given order.
pub fn project(table: &DataTable, rows: &[usize], columns: &[String]) -> Result<DataTable> {
    let indices = columns
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| TargetingError::MissingColumn(name.clone()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut out = DataTable::new(columns.to_vec());
    for &row in rows {
        out.push_row(indices.iter().map(|&c| table.cell(row, c).clone()).collect());
    }
    Ok(out)
}
