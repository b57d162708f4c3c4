use chrono::NaiveDateTime;

use super::timestamp::{hour_of, parse_cell};
use crate::config::{ColumnConfig, UnknownCategoryPolicy};
use crate::data::model::DataTable;
use crate::error::{Result, TargetingError};
use crate::model::EncoderSet;

/// Name of the derived hour feature.
pub const LOGIN_HOUR: &str = "Login Hour";

// ---------------------------------------------------------------------------
// FeatureMatrix
// ---------------------------------------------------------------------------

/// Dense row-major numeric matrix handed to the classifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        FeatureMatrix { rows }
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column count of the first row (0 when empty).
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Ordered feature names: hour, encoded categories, usage.
pub fn feature_names(columns: &ColumnConfig) -> Vec<String> {
    let mut names = vec![LOGIN_HOUR.to_string()];
    names.extend(columns.categorical.iter().cloned());
    names.push(columns.usage.clone());
    names
}

// ---------------------------------------------------------------------------
// PreparedTable – derived columns for one request
// ---------------------------------------------------------------------------

/// Derived columns for every table row plus the matrix of scorable rows.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub logout: Vec<Option<NaiveDateTime>>,
    pub login_hour: Vec<Option<u32>>,
    pub matrix: FeatureMatrix,
    /// Table row index of each matrix row.
    pub matrix_rows: Vec<usize>,
    /// Rows dropped under [`UnknownCategoryPolicy::SkipRow`].
    pub skipped_rows: Vec<usize>,
}

fn require_column(table: &DataTable, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| TargetingError::MissingColumn(name.to_string()))
}

/// Parse timestamps, derive the login hour and encode categories.
///
/// Rows without a login hour can never match an hour filter, so they are left
/// out of the matrix; their categories are still checked.
pub fn prepare(
    table: &DataTable,
    encoders: &EncoderSet,
    columns: &ColumnConfig,
    policy: UnknownCategoryPolicy,
) -> Result<PreparedTable> {
    let login_idx = require_column(table, &columns.login_time)?;
    let logout_idx = require_column(table, &columns.logout_time)?;
    let usage_idx = require_column(table, &columns.usage)?;
    let categorical = columns
        .categorical
        .iter()
        .map(|name| {
            let idx = require_column(table, name)?;
            let encoder = encoders
                .get(name)
                .ok_or_else(|| TargetingError::MissingEncoder(name.clone()))?;
            Ok((name, idx, encoder))
        })
        .collect::<Result<Vec<_>>>()?;

    let n = table.len();
    let mut prepared = PreparedTable {
        logout: Vec::with_capacity(n),
        login_hour: Vec::with_capacity(n),
        matrix: FeatureMatrix::default(),
        matrix_rows: Vec::new(),
        skipped_rows: Vec::new(),
    };
    let mut features = Vec::new();

    'rows: for (row_no, row) in table.rows.iter().enumerate() {
        let hour = parse_cell(&row[login_idx]).as_ref().map(hour_of);
        prepared.logout.push(parse_cell(&row[logout_idx]));
        prepared.login_hour.push(hour);

        let mut codes = Vec::with_capacity(categorical.len());
        for (name, idx, encoder) in &categorical {
            let key = row[*idx].category_key();
            match encoder.encode(&key) {
                Some(code) => codes.push(code as f64),
                None => match policy {
                    UnknownCategoryPolicy::FailRequest => {
                        return Err(TargetingError::UnknownCategory {
                            column: name.to_string(),
                            value: key,
                        });
                    }
                    UnknownCategoryPolicy::SkipRow => {
                        log::warn!("Skipping row {row_no}: unknown {name} '{key}'");
                        prepared.skipped_rows.push(row_no);
                        continue 'rows;
                    }
                },
            }
        }

        let Some(hour) = hour else { continue };

        let usage_cell = &row[usage_idx];
        let usage = usage_cell
            .as_f64()
            .ok_or_else(|| TargetingError::NonNumericFeature {
                row: row_no,
                column: columns.usage.clone(),
                value: usage_cell.to_string(),
            })?;

        let mut vector = Vec::with_capacity(codes.len() + 2);
        vector.push(hour as f64);
        vector.extend(codes);
        vector.push(usage);
        features.push(vector);
        prepared.matrix_rows.push(row_no);
    }

    let unparsed = prepared.login_hour.iter().filter(|h| h.is_none()).count();
    if unparsed > 0 {
        log::warn!(
            "{unparsed} of {n} rows have no parseable '{}'",
            columns.login_time
        );
    }

    prepared.matrix = FeatureMatrix::from_rows(features);
    Ok(prepared)
}
