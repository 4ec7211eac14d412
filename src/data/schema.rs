use super::model::{Column, Value};

/// How a column is classified for the numeric-only views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Read-only view of a table's column names and their classification.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
}

impl Schema {
    /// Classify each column.
    ///
    /// A column is numeric iff every non-null value is an integer or a float.
    /// With zero rows there is nothing to go on, so every column is
    /// categorical.
    pub fn infer(columns: &[Column], row_count: usize) -> Self {
        let kinds = columns
            .iter()
            .map(|col| {
                let numeric = row_count > 0 && col.values.iter().all(fits_numeric);
                if numeric {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Categorical
                }
            })
            .collect();

        Schema {
            columns: columns.iter().map(|c| c.name.clone()).collect(),
            kinds,
        }
    }

    /// All column names, in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Numeric column names, in table order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .zip(&self.kinds)
            .filter(|(_, k)| **k == ColumnKind::Numeric)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.kinds[i])
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        self.kind(column) == Some(ColumnKind::Numeric)
    }
}

/// Whether a value may appear in a numeric column.
pub fn fits_numeric(value: &Value) -> bool {
    value.is_null() || value.is_numeric()
}
