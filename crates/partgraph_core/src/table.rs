//! Columnar property tables.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// The values of one property column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    /// Boolean values.
    Bool(Vec<bool>),
    /// Signed 64-bit integers.
    Int64(Vec<i64>),
    /// Unsigned 32-bit integers.
    #[serde(rename = "uint32")]
    UInt32(Vec<u32>),
    /// Unsigned 64-bit integers.
    #[serde(rename = "uint64")]
    UInt64(Vec<u64>),
    /// 64-bit floats.
    Float64(Vec<f64>),
    /// UTF-8 strings.
    Utf8(Vec<String>),
}

impl ColumnData {
    /// Returns the number of values.
    pub fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::UInt32(v) => v.len(),
            Self::UInt64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Utf8(v) => v.len(),
        }
    }

    /// Returns true if the column has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the name of the value type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int64(_) => "int64",
            Self::UInt32(_) => "uint32",
            Self::UInt64(_) => "uint64",
            Self::Float64(_) => "float64",
            Self::Utf8(_) => "utf8",
        }
    }
}

/// A named property column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Property name.
    pub name: String,
    /// Property values, one per row.
    pub data: ColumnData,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A table of per-node or per-edge properties.
///
/// Every column holds exactly `num_rows` values. Columns may be appended
/// and removed freely. The row count is fixed once the table has received
/// columns or was created for a known entity count (zero included); until
/// then the first appended table decides it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyTable {
    #[serde(default)]
    num_rows: Option<u64>,
    columns: Vec<Column>,
}

impl PropertyTable {
    /// Creates a table with no columns and exactly `num_rows` rows.
    #[must_use]
    pub fn empty(num_rows: u64) -> Self {
        Self {
            num_rows: Some(num_rows),
            columns: Vec::new(),
        }
    }

    /// Creates a table from columns that must all have the same length.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowCountMismatch`] if column lengths differ.
    pub fn from_columns(columns: Vec<Column>) -> CoreResult<Self> {
        let Some(first) = columns.first() else {
            return Ok(Self::default());
        };
        let num_rows = first.data.len() as u64;
        if let Some(bad) = columns.iter().find(|c| c.data.len() as u64 != num_rows) {
            return Err(CoreError::RowCountMismatch {
                table: "property",
                expected: num_rows,
                actual: bad.data.len() as u64,
            });
        }
        Ok(Self {
            num_rows: Some(num_rows),
            columns,
        })
    }

    /// Returns the number of rows; zero while the count is still open.
    pub fn num_rows(&self) -> u64 {
        self.num_rows.unwrap_or(0)
    }

    /// Returns the row count if it is fixed.
    pub fn fixed_rows(&self) -> Option<u64> {
        self.num_rows
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Returns the columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns column `index`, if present.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns the first column named `name`, if present.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Appends copies of `other`'s columns.
    ///
    /// A table whose row count is still open adopts `other`'s row count.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::RowCountMismatch`] if the row counts differ.
    pub fn append_columns(&mut self, other: &PropertyTable) -> CoreResult<()> {
        self.append_columns_as("property", other)
    }

    /// Removes and returns column `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ColumnOutOfRange`] if there is no such column.
    pub fn remove_column(&mut self, index: usize) -> CoreResult<Column> {
        self.remove_column_as("property", index)
    }

    pub(crate) fn append_columns_as(
        &mut self,
        table: &'static str,
        other: &PropertyTable,
    ) -> CoreResult<()> {
        let incoming = other.num_rows();
        if let Some(expected) = self.num_rows {
            if incoming != expected {
                return Err(CoreError::RowCountMismatch {
                    table,
                    expected,
                    actual: incoming,
                });
            }
        }
        self.num_rows = Some(incoming);
        self.columns.extend(other.columns.iter().cloned());
        Ok(())
    }

    pub(crate) fn remove_column_as(
        &mut self,
        table: &'static str,
        index: usize,
    ) -> CoreResult<Column> {
        if index >= self.columns.len() {
            return Err(CoreError::ColumnOutOfRange {
                table,
                index,
                columns: self.columns.len(),
            });
        }
        Ok(self.columns.remove(index))
    }
}
