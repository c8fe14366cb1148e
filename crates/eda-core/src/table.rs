//! In-memory columnar table consumed by the profiling engine.
//!
//! Every column carries a [`ColumnKind`] tag decided once, when the table is
//! built, so the profilers never inspect cell types at runtime. Missing cells
//! are `None`; a float `NaN` coming from the loader is normalised to `None`.
//! Integer cells keep their exact value; they are widened to `f64` only for
//! moments and correlation.
//!
//! Tables come from two places: [`Table::from_dataframe`] (the CSV loader
//! goes through polars) and [`Table::builder`] for programmatic construction.

use crate::error::{EdaError, Result};
use crate::utils::{is_categorical_dtype, is_integer_dtype, is_numeric_dtype};
use polars::prelude::{DataFrame, DataType, Series};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;

/// Logical type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Integers, floats and booleans.
    Numeric,
    /// Strings, categories and anything else that is displayed as text.
    Text,
    /// Every cell is missing and the loader could not assign a type.
    Empty,
}

/// How non-integer numeric cells were represented by the loader.
///
/// Only affects how values are printed (example values, category labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericRepr {
    Float,
    Boolean,
}

impl NumericRepr {
    /// Render a cell value the way the loader would print it.
    pub fn format(self, value: f64) -> String {
        match self {
            Self::Float => format!("{:?}", value),
            Self::Boolean => (value != 0.0).to_string(),
        }
    }
}

/// Cell storage of a column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Signed and unsigned integers of any width, stored exactly.
    Integer(Vec<Option<i128>>),
    Numeric {
        values: Vec<Option<f64>>,
        repr: NumericRepr,
    },
    Text(Vec<Option<String>>),
    /// A column of the given length with no values at all.
    Empty(usize),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(values) => values.len(),
            Self::Numeric { values, .. } => values.len(),
            Self::Text(values) => values.len(),
            Self::Empty(len) => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Integer(_) | Self::Numeric { .. } => ColumnKind::Numeric,
            Self::Text(_) => ColumnKind::Text,
            Self::Empty(_) => ColumnKind::Empty,
        }
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        match self {
            Self::Integer(values) => values.iter().filter(|v| v.is_none()).count(),
            Self::Numeric { values, .. } => values.iter().filter(|v| v.is_none()).count(),
            Self::Text(values) => values.iter().filter(|v| v.is_none()).count(),
            Self::Empty(len) => *len,
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    declared_type: String,
    categorical: bool,
    data: ColumnData,
}

impl Column {
    /// Create a column from parts.
    ///
    /// `declared_type` is the loader's name for the type (e.g. `i64`, `str`)
    /// and is reported as-is. `categorical` marks text columns eligible for
    /// category frequency tables; it is ignored for non-text data.
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        categorical: bool,
        data: ColumnData,
    ) -> Self {
        let categorical = categorical && matches!(data, ColumnData::Text(_));
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            categorical,
            data,
        }
    }

    /// Convert a polars Series, classifying its dtype once.
    pub fn from_series(series: &Series) -> Result<Self> {
        let dtype = series.dtype();
        let data = if matches!(dtype, DataType::UInt64) {
            let values = series.u64()?.into_iter().map(|v| v.map(i128::from)).collect();
            ColumnData::Integer(values)
        } else if is_integer_dtype(dtype) {
            let ints = series.cast(&DataType::Int64)?;
            let values = ints.i64()?.into_iter().map(|v| v.map(i128::from)).collect();
            ColumnData::Integer(values)
        } else if is_numeric_dtype(dtype) {
            let repr = if matches!(dtype, DataType::Boolean) {
                NumericRepr::Boolean
            } else {
                NumericRepr::Float
            };
            let floats = series.cast(&DataType::Float64)?;
            let values = floats
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            ColumnData::Numeric { values, repr }
        } else if matches!(dtype, DataType::Null) {
            ColumnData::Empty(series.len())
        } else {
            let strings = series.cast(&DataType::String)?;
            let values = strings
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_owned))
                .collect();
            ColumnData::Text(values)
        };

        Ok(Self::new(
            series.name().as_str(),
            dtype.to_string(),
            is_categorical_dtype(dtype),
            data,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    /// Whether the column is text or categorical typed.
    pub fn is_categorical(&self) -> bool {
        self.categorical
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.data.missing_count()
    }

    /// Cells of a numeric column as floats, `None` for any other kind.
    ///
    /// Integer cells are widened, which is lossy beyond 2^53.
    pub fn numeric_values(&self) -> Option<Cow<'_, [Option<f64>]>> {
        match &self.data {
            ColumnData::Integer(values) => Some(Cow::Owned(
                values.iter().map(|v| v.map(|x| x as f64)).collect(),
            )),
            ColumnData::Numeric { values, .. } => Some(Cow::Borrowed(values)),
            _ => None,
        }
    }

    /// Cells of a text column, `None` for any other kind.
    pub fn text_values(&self) -> Option<&[Option<String>]> {
        match &self.data {
            ColumnData::Text(values) => Some(values),
            _ => None,
        }
    }
}

/// An immutable, columnar dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

// Profiling calls may run concurrently on a shared table (HTTP workers).
static_assertions::assert_impl_all!(Table: Send, Sync);

impl Table {
    /// Create a new table builder.
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Assemble a table from columns that must share one length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);

        let mut seen = HashSet::new();
        for column in &columns {
            if column.len() != row_count {
                return Err(EdaError::InvalidTable(format!(
                    "column '{}' has {} rows, expected {}",
                    column.name(),
                    column.len(),
                    row_count
                )));
            }
            if !seen.insert(column.name()) {
                return Err(EdaError::InvalidTable(format!(
                    "duplicate column name '{}'",
                    column.name()
                )));
            }
        }

        Ok(Self { columns, row_count })
    }

    /// Convert a polars DataFrame into a table.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| Column::from_series(col.as_materialized_series()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.columns.len())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// True when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Builder for [`Table`] with fluent API.
///
/// # Example
///
/// ```rust
/// use eda_core::Table;
///
/// let table = Table::builder()
///     .integer("age", [Some(10), Some(20), Some(30), None])
///     .text("city", [Some("A"), Some("B"), Some("A"), None])
///     .build()
///     .unwrap();
///
/// assert_eq!(table.shape(), (4, 2));
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
}

impl TableBuilder {
    /// Add a float column (`f64`).
    pub fn numeric<I>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect();
        self.column(Column::new(
            name,
            "f64",
            false,
            ColumnData::Numeric {
                values,
                repr: NumericRepr::Float,
            },
        ))
    }

    /// Add an integer column (`i64`).
    pub fn integer<I>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        let values = values.into_iter().map(|v| v.map(i128::from)).collect();
        self.column(Column::new(name, "i64", false, ColumnData::Integer(values)))
    }

    /// Add a boolean column (`bool`), profiled as numeric 0/1.
    pub fn boolean<I>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<bool>>,
    {
        let values = values
            .into_iter()
            .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
            .collect();
        self.column(Column::new(
            name,
            "bool",
            false,
            ColumnData::Numeric {
                values,
                repr: NumericRepr::Boolean,
            },
        ))
    }

    /// Add a text column (`str`).
    pub fn text<I, S>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let values = values.into_iter().map(|v| v.map(Into::into)).collect();
        self.column(Column::new(name, "str", true, ColumnData::Text(values)))
    }

    /// Add a column with no values at all (`null`).
    pub fn empty(self, name: impl Into<String>, len: usize) -> Self {
        self.column(Column::new(name, "null", false, ColumnData::Empty(len)))
    }

    /// Add a prepared column.
    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Build the table, validating column lengths and names.
    pub fn build(self) -> Result<Table> {
        Table::new(self.columns)
    }
}
