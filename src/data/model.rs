use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the dataset
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Debug keeps the trailing `.0` (`30.0`, not `30`).
            CellValue::Float(v) => write!(f, "{v:?}"),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` feature.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Null => None,
        }
    }

    /// The string key used when looking the value up in a label encoder.
    ///
    /// Nulls become `nan`, which is what the encoders were fitted on when the
    /// training frame had missing categories.
    pub fn category_key(&self) -> String {
        match self {
            CellValue::Null => "nan".to_string(),
            other => other.to_string(),
        }
    }

    /// Borrow the text of a `Text` cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// DataTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// An in-memory table: ordered column names and row-major cells.
///
/// Every row has exactly `columns.len()` cells; loaders pad missing values
/// with [`CellValue::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        DataTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `(row, column index)`.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        &self.rows[row][col]
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
