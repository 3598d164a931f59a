//! In-memory tabular data
//!
//! A [`Table`] is an ordered set of named, equal-length columns. Rows are
//! aligned by position. Tables are built once and then only read; every
//! summary and layout in filigree borrows one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, StatsResult};

/// A single column of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the column kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Column::Float(_) => "float",
            Column::Int(_) => "int",
            Column::Text(_) => "text",
        }
    }

    /// Whether values can be read as `f64`
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Float(_) | Column::Int(_))
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Text(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Text(v.into_iter().map(str::to_string).collect())
    }
}

/// Identity of a group: a value drawn from an int or text column
///
/// Integer keys order numerically, text keys lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    Int(i64),
    Text(String),
}

impl GroupKey {
    /// Integer value of the key, if it is an integer key
    pub fn as_int(&self) -> Option<i64> {
        match self {
            GroupKey::Int(i) => Some(*i),
            GroupKey::Text(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Int(i) => write!(f, "{}", i),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for GroupKey {
    fn from(i: i64) -> Self {
        GroupKey::Int(i)
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Text(s.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(s: String) -> Self {
        GroupKey::Text(s)
    }
}

/// Ordered collection of named, equal-length columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, column)` pairs
    pub fn from_columns<I, S>(columns: I) -> StatsResult<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            table.push_column(name, column)?;
        }
        Ok(table)
    }

    /// Builder-style variant of [`Table::push_column`]
    pub fn with_column(mut self, name: impl Into<String>, column: impl Into<Column>) -> StatsResult<Self> {
        self.push_column(name, column.into())?;
        Ok(self)
    }

    /// Append a column; the first column fixes the row count
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> StatsResult<()> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(StatsError::DuplicateColumn { column: name });
        }
        if self.columns.is_empty() {
            self.rows = column.len();
        } else if column.len() != self.rows {
            return Err(StatsError::LengthMismatch {
                column: name,
                expected: self.rows,
                actual: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> StatsResult<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| StatsError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    /// Names of all float and int columns, in table order
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.columns)
            .filter(|(_, c)| c.is_numeric())
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Values of a numeric column as `f64`
    pub fn numeric(&self, name: &str) -> StatsResult<Vec<f64>> {
        match self.column(name)? {
            Column::Float(v) => Ok(v.clone()),
            Column::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            other => Err(StatsError::TypeMismatch {
                column: name.to_string(),
                expected: "float or int",
                actual: other.kind_name(),
            }),
        }
    }

    /// Values of a categorical column as group keys
    pub fn keys(&self, name: &str) -> StatsResult<Vec<GroupKey>> {
        match self.column(name)? {
            Column::Int(v) => Ok(v.iter().map(|&x| GroupKey::Int(x)).collect()),
            Column::Text(v) => Ok(v.iter().cloned().map(GroupKey::Text).collect()),
            other => Err(StatsError::TypeMismatch {
                column: name.to_string(),
                expected: "int or text",
                actual: other.kind_name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new()
            .with_column("g", vec!["a", "b", "a"])
            .unwrap()
            .with_column("x", vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_column("n", vec![4_i64, 5, 6])
            .unwrap()
    }

    #[test]
    fn test_table_shape() {
        let t = sample();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.num_columns(), 3);
        assert_eq!(t.column_names(), &["g", "x", "n"]);
        assert_eq!(t.numeric_columns(), vec!["x", "n"]);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = sample().with_column("y", vec![1.0]).unwrap_err();
        assert!(matches!(err, StatsError::LengthMismatch { expected: 3, actual: 1, .. }));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = sample().with_column("x", vec![0.0, 0.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            StatsError::DuplicateColumn {
                column: "x".to_string()
            }
        );
    }

    #[test]
    fn test_numeric_and_keys() {
        let t = sample();
        assert_eq!(t.numeric("n").unwrap(), vec![4.0, 5.0, 6.0]);
        assert_eq!(t.keys("g").unwrap()[1], GroupKey::from("b"));
        assert!(t.keys("x").is_err());
        assert!(t.numeric("g").is_err());
        assert!(matches!(
            t.column("missing"),
            Err(StatsError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn test_group_key_ordering() {
        let mut keys = vec![GroupKey::from("b"), GroupKey::from("a"), GroupKey::from("c")];
        keys.sort();
        assert_eq!(keys[0].to_string(), "a");
        assert!(GroupKey::Int(2) < GroupKey::Int(10));
    }
}
