use super::error::{ExploreError, Result};
use super::model::{Table, Value};

/// Return indices of rows whose `column` value equals `value`.
///
/// Equality is type-aware: numeric cells compare numerically
/// (`1 == 1.0`), everything else compares as its parsed type, and a null
/// filter value selects the missing cells.
pub fn matching_rows(table: &Table, column: &str, value: &Value) -> Result<Vec<usize>> {
    let col = table.column(column).ok_or_else(|| {
        ExploreError::StaleSelection(format!("column '{column}' is not in the table"))
    })?;

    Ok(col
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| *v == value)
        .map(|(i, _)| i)
        .collect())
}

/// Fresh table holding only the rows where `column == value`, in source order.
pub fn filter_equals(table: &Table, column: &str, value: &Value) -> Result<Table> {
    let rows = matching_rows(table, column, value)?;
    Ok(table.take_rows(&rows))
}
