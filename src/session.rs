use std::path::Path;
use std::sync::Arc;

use crate::cache::Memo;
use crate::data::derive::{
    self, CorrelationMatrix, JointDistribution, SummaryRow, ValueCounts,
};
use crate::data::error::{ExploreError, Result, SelectionField};
use crate::data::filter::filter_equals;
use crate::data::loader::{self, FileFormat};
use crate::data::model::{Table, Value};
use crate::data::schema::Schema;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The user's current choices, valid only for the table generation that
/// produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    generation: u64,
    pub outcome_column: String,
    pub x_feature: Option<String>,
    pub y_feature: Option<String>,
    pub filter_column: String,
    pub filter_value: Option<Value>,
}

impl Selection {
    /// Defaults for a freshly loaded table: first column for outcome and
    /// filter, first and second numeric columns for the axes, and the
    /// filter column's first value in row order.
    fn defaults(table: &Table, generation: u64) -> Self {
        let schema = table.schema();
        let first = schema.columns().first().cloned().unwrap_or_default();
        let numeric = schema.numeric_columns();
        let filter_value = first_value(table, &first);

        Selection {
            generation,
            outcome_column: first.clone(),
            x_feature: numeric.first().map(|s| s.to_string()),
            y_feature: numeric.get(1).map(|s| s.to_string()),
            filter_column: first,
            filter_value,
        }
    }
}

fn first_value(table: &Table, column: &str) -> Option<Value> {
    table.column(column).and_then(|c| c.values.first().cloned())
}

/// One user action on a selection widget.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionChange {
    Outcome(String),
    XFeature(String),
    YFeature(String),
    FilterColumn(String),
    FilterValue(Value),
}

impl SelectionChange {
    fn field(&self) -> SelectionField {
        match self {
            SelectionChange::Outcome(_) => SelectionField::Outcome,
            SelectionChange::XFeature(_) => SelectionField::XFeature,
            SelectionChange::YFeature(_) => SelectionField::YFeature,
            SelectionChange::FilterColumn(_) => SelectionField::FilterColumn,
            SelectionChange::FilterValue(_) => SelectionField::FilterValue,
        }
    }

    fn invalid(&self) -> ExploreError {
        let value = match self {
            SelectionChange::Outcome(s)
            | SelectionChange::XFeature(s)
            | SelectionChange::YFeature(s)
            | SelectionChange::FilterColumn(s) => s.clone(),
            SelectionChange::FilterValue(v) => v.to_string(),
        };
        ExploreError::InvalidSelection {
            field: self.field(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Views {
    counts: Memo<(u64, String), ValueCounts>,
    joint: Memo<(u64, String, String, String), JointDistribution>,
    summary: Memo<u64, Vec<SummaryRow>>,
    correlation: Memo<u64, CorrelationMatrix>,
    filtered: Memo<(u64, String, Option<Value>), Table>,
}

impl Views {
    fn clear(&mut self) {
        self.counts.clear();
        self.joint.clear();
        self.summary.clear();
        self.correlation.clear();
        self.filtered.clear();
    }
}

/// One user's exploration state: the loaded table, its selection and the
/// derived views memoised per (table generation, selection fields).
#[derive(Default)]
pub struct Session {
    table: Option<Arc<Table>>,
    source_name: Option<String>,
    /// Bumped on every upload attempt; identifies the current table.
    generation: u64,
    selection: Option<Selection>,
    views: Views,
}

fn no_table() -> ExploreError {
    ExploreError::StaleSelection("no table is loaded".into())
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Ingestion ----

    /// Parse an uploaded byte stream and make it the current table.
    pub fn upload(&mut self, name: impl Into<String>, bytes: &[u8], format: FileFormat) -> Result<()> {
        let loaded = loader::load_bytes(bytes, format);
        self.install(name.into(), loaded)
    }

    /// Read a file from disk and make it the current table.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let loaded = loader::load_file(path);
        self.install(name, loaded)
    }

    /// Replace the table and reset every selection. A failed load leaves
    /// the session empty.
    fn install(&mut self, name: String, loaded: Result<Table>) -> Result<()> {
        self.generation += 1;
        self.views.clear();

        match loaded {
            Ok(table) => {
                let schema = table.schema();
                log::info!(
                    "Loaded {name}: {} rows, columns {:?}, numeric {:?}",
                    table.row_count(),
                    schema.columns(),
                    schema.numeric_columns()
                );
                if schema.numeric_columns().len() < 2 {
                    log::warn!("{name} has fewer than two numeric columns; feature comparison is unavailable");
                }
                self.selection = Some(Selection::defaults(&table, self.generation));
                self.table = Some(Arc::new(table));
                self.source_name = Some(name);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.table = None;
                self.selection = None;
                self.source_name = None;
                Err(e)
            }
        }
    }

    // ---- Accessors ----

    pub fn table(&self) -> Option<&Table> {
        self.table.as_deref()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.table().map(Table::schema)
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    // ---- Selection state ----

    /// Apply one change, refusing values outside the field's legal options.
    pub fn set(&mut self, change: SelectionChange) -> Result<()> {
        let table = self.table.clone().ok_or_else(no_table)?;
        let schema = table.schema();
        let selection = self.selection.as_mut().ok_or_else(no_table)?;

        match &change {
            SelectionChange::Outcome(col) if schema.contains(col) => {
                selection.outcome_column = col.clone();
            }
            SelectionChange::XFeature(col) if schema.is_numeric(col) => {
                selection.x_feature = Some(col.clone());
            }
            SelectionChange::YFeature(col) if schema.is_numeric(col) => {
                selection.y_feature = Some(col.clone());
            }
            SelectionChange::FilterColumn(col) if schema.contains(col) => {
                selection.filter_column = col.clone();
                selection.filter_value = first_value(&table, col);
            }
            SelectionChange::FilterValue(value) => {
                let legal = table
                    .column(&selection.filter_column)
                    .is_some_and(|c| c.values.contains(value));
                if !legal {
                    return Err(change.invalid());
                }
                selection.filter_value = Some(value.clone());
            }
            _ => return Err(change.invalid()),
        }
        Ok(())
    }

    /// Re-apply a selection snapshot held by the caller.
    ///
    /// A snapshot taken against another table, or naming a column the
    /// table lacks, is stale: the selection is reset to the current table's
    /// defaults and `StaleSelection` returned. Present but illegal choices
    /// give `InvalidSelection` and leave the selection unchanged.
    pub fn restore(&mut self, snapshot: Selection) -> Result<()> {
        let table = self.table.clone().ok_or_else(no_table)?;
        if snapshot.generation != self.generation {
            self.reset_selection();
            return Err(ExploreError::StaleSelection(format!(
                "selection was made for table generation {}, current is {}",
                snapshot.generation, self.generation
            )));
        }

        let schema = table.schema();
        let missing = [
            Some(&snapshot.outcome_column),
            Some(&snapshot.filter_column),
            snapshot.x_feature.as_ref(),
            snapshot.y_feature.as_ref(),
        ]
        .into_iter()
        .flatten()
        .find(|col| !schema.contains(col.as_str()));
        if let Some(col) = missing {
            let reason = format!("selection names missing column {col}");
            self.reset_selection();
            return Err(ExploreError::StaleSelection(reason));
        }

        let previous = self.selection.clone();
        self.selection = Some(Selection::defaults(&table, self.generation));

        let mut changes = vec![
            SelectionChange::Outcome(snapshot.outcome_column),
            SelectionChange::FilterColumn(snapshot.filter_column),
        ];
        changes.extend(snapshot.x_feature.map(SelectionChange::XFeature));
        changes.extend(snapshot.y_feature.map(SelectionChange::YFeature));
        changes.extend(snapshot.filter_value.map(SelectionChange::FilterValue));

        for change in changes {
            if let Err(e) = self.set(change) {
                self.selection = previous;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Reset every choice to the defaults of the current table.
    pub fn reset_selection(&mut self) {
        self.selection = self
            .table
            .as_deref()
            .map(|t| Selection::defaults(t, self.generation));
    }

    /// The X and Y features, or `InsufficientColumns` when the table cannot
    /// supply two numeric columns.
    pub fn feature_pair(&self) -> Result<(String, String)> {
        let schema = self.schema().ok_or_else(no_table)?;
        let found = schema.numeric_columns().len();
        let selection = self.selection.as_ref().ok_or_else(no_table)?;

        match (&selection.x_feature, &selection.y_feature) {
            (Some(x), Some(y)) if found >= 2 => Ok((x.clone(), y.clone())),
            _ => Err(ExploreError::InsufficientColumns { found }),
        }
    }

    /// Distinct values of the current filter column, in row order.
    pub fn filter_options(&self) -> Vec<Value> {
        self.selection
            .as_ref()
            .and_then(|s| self.table()?.column(&s.filter_column))
            .map(|c| c.distinct())
            .unwrap_or_default()
    }

    // ---- Derived views ----

    fn current(&self) -> Result<(Arc<Table>, Selection)> {
        let table = self.table.clone().ok_or_else(no_table)?;
        let selection = self.selection.clone().ok_or_else(no_table)?;
        Ok((table, selection))
    }

    /// Run a derivation; on a stale selection against a non-empty table,
    /// reset to defaults and try once more. `set` and `restore` keep the
    /// selection valid, so this only fires if a selection outlives its
    /// table's columns.
    fn recover<T>(&mut self, attempt: impl Fn(&mut Self) -> Result<T>) -> Result<T> {
        match attempt(self) {
            Err(ExploreError::StaleSelection(reason))
                if self.table.as_ref().is_some_and(|t| !t.is_empty()) =>
            {
                log::warn!("Recovering from stale selection: {reason}");
                self.reset_selection();
                attempt(self)
            }
            other => other,
        }
    }

    /// First `n` rows of the table.
    pub fn preview(&self, n: usize) -> Result<Table> {
        Ok(self.table().ok_or_else(no_table)?.head(n))
    }

    pub fn value_counts(&mut self) -> Result<Arc<ValueCounts>> {
        self.recover(|s| {
            let (table, sel) = s.current()?;
            let key = (s.generation, sel.outcome_column.clone());
            s.views
                .counts
                .get_or_try_insert_with(key, || derive::value_counts(&table, &sel.outcome_column))
        })
    }

    pub fn joint_distribution(&mut self) -> Result<Arc<JointDistribution>> {
        self.recover(|s| {
            let (table, sel) = s.current()?;
            let (x, y) = s.feature_pair()?;
            let key = (s.generation, x.clone(), y.clone(), sel.outcome_column.clone());
            s.views.joint.get_or_try_insert_with(key, || {
                derive::joint_distribution(&table, &x, &y, &sel.outcome_column)
            })
        })
    }

    pub fn summary(&mut self) -> Result<Arc<Vec<SummaryRow>>> {
        self.recover(|s| {
            let (table, _) = s.current()?;
            let key = s.generation;
            s.views
                .summary
                .get_or_try_insert_with(key, || derive::describe(&table))
        })
    }

    pub fn correlation(&mut self) -> Result<Arc<CorrelationMatrix>> {
        self.recover(|s| {
            let (table, _) = s.current()?;
            let key = s.generation;
            s.views
                .correlation
                .get_or_try_insert_with(key, || derive::correlation_matrix(&table))
        })
    }

    /// Rows where the filter column equals the filter value.
    pub fn filtered(&mut self) -> Result<Arc<Table>> {
        self.recover(|s| {
            let (table, sel) = s.current()?;
            if table.is_empty() {
                return Err(ExploreError::StaleSelection("the table has no rows".into()));
            }
            let value = sel
                .filter_value
                .clone()
                .ok_or_else(|| ExploreError::StaleSelection("no filter value chosen".into()))?;
            let key = (s.generation, sel.filter_column.clone(), Some(value.clone()));
            s.views
                .filtered
                .get_or_try_insert_with(key, || filter_equals(&table, &sel.filter_column, &value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEART: &[u8] = b"age,sex,target\n63,1,1\n37,1,0\n41,0,1\n";

    fn session_with(csv: &[u8]) -> Session {
        let mut session = Session::new();
        session
            .upload("data.csv", csv, FileFormat::Csv)
            .expect("upload");
        session
    }

    #[test]
    fn upload_sets_defaults() {
        let session = session_with(HEART);
        let sel = session.selection().expect("selection");

        assert_eq!(sel.outcome_column, "age");
        assert_eq!(sel.x_feature.as_deref(), Some("age"));
        assert_eq!(sel.y_feature.as_deref(), Some("sex"));
        assert_eq!(sel.filter_column, "age");
        assert_eq!(sel.filter_value, Some(Value::Integer(63)));
        assert_eq!(session.source_name(), Some("data.csv"));
    }

    #[test]
    fn heart_scenario() {
        let mut session = session_with(HEART);
        let schema = session.schema().expect("schema");
        assert_eq!(schema.columns(), ["age", "sex", "target"]);
        assert_eq!(schema.numeric_columns(), vec!["age", "sex", "target"]);

        session
            .set(SelectionChange::Outcome("target".into()))
            .expect("outcome");
        let counts = session.value_counts().expect("counts");
        assert_eq!(counts.get(&Value::Integer(1)), Some(2));
        assert_eq!(counts.get(&Value::Integer(0)), Some(1));

        session
            .set(SelectionChange::FilterColumn("sex".into()))
            .expect("filter column");
        session
            .set(SelectionChange::FilterValue(Value::Integer(1)))
            .expect("filter value");
        let filtered = session.filtered().expect("filtered");
        assert_eq!(
            filtered.column("age").expect("age").values,
            vec![Value::Integer(63), Value::Integer(37)]
        );
    }

    #[test]
    fn single_numeric_column_blocks_only_the_comparison() {
        let mut session = session_with(b"name,score\nann,1\nbob,2\n");

        assert_eq!(
            session.joint_distribution().expect_err("blocked"),
            ExploreError::InsufficientColumns { found: 1 }
        );
        assert!(session.preview(5).is_ok());
        assert!(session.value_counts().is_ok());
        assert_eq!(session.summary().expect("summary").len(), 1);
    }

    #[test]
    fn reupload_resets_to_new_defaults() {
        let mut session = session_with(HEART);
        session
            .set(SelectionChange::Outcome("target".into()))
            .expect("outcome");
        let old = session.selection().cloned().expect("selection");

        session
            .upload("other.csv", b"city,temp,rain\nparis,20,1.5\nrome,25,0\n", FileFormat::Csv)
            .expect("upload");
        let sel = session.selection().expect("selection");
        assert_eq!(sel.outcome_column, "city");
        assert_eq!(sel.x_feature.as_deref(), Some("temp"));
        assert_eq!(sel.y_feature.as_deref(), Some("rain"));
        assert_eq!(sel.filter_value, Some(Value::Text("paris".into())));

        assert!(session.value_counts().is_ok());
        assert!(session.joint_distribution().is_ok());
        assert!(session.filtered().is_ok());

        let err = session.restore(old).expect_err("stale");
        assert!(matches!(err, ExploreError::StaleSelection(_)));
        assert_eq!(session.selection().expect("selection").outcome_column, "city");
    }

    #[test]
    fn illegal_choices_are_rejected() {
        let mut session = session_with(b"name,score,age\nann,1,30\nbob,2,40\n");

        let err = session
            .set(SelectionChange::XFeature("name".into()))
            .expect_err("non-numeric");
        assert_eq!(
            err,
            ExploreError::InvalidSelection {
                field: SelectionField::XFeature,
                value: "name".into()
            }
        );
        assert!(session.set(SelectionChange::Outcome("nope".into())).is_err());
        assert!(session
            .set(SelectionChange::FilterValue(Value::Text("carl".into())))
            .is_err());

        // Nothing changed.
        assert_eq!(
            session.selection().expect("selection").x_feature.as_deref(),
            Some("score")
        );
    }

    #[test]
    fn changing_filter_column_picks_its_first_value() {
        let mut session = session_with(b"name,score\nann,1\nbob,2\n");
        session
            .set(SelectionChange::FilterColumn("score".into()))
            .expect("filter column");
        assert_eq!(
            session.selection().expect("selection").filter_value,
            Some(Value::Integer(1))
        );
        assert_eq!(
            session.filter_options(),
            vec![Value::Integer(1), Value::Integer(2)]
        );
    }

    #[test]
    fn restore_applies_a_current_snapshot() {
        let mut session = session_with(HEART);
        let mut snapshot = session.selection().cloned().expect("selection");
        snapshot.outcome_column = "target".into();
        snapshot.y_feature = Some("target".into());
        snapshot.filter_column = "sex".into();
        snapshot.filter_value = Some(Value::Integer(0));

        session.restore(snapshot.clone()).expect("restore");
        assert_eq!(session.selection(), Some(&snapshot));
    }

    #[test]
    fn restore_rejects_illegal_snapshot_without_changes() {
        let mut session = session_with(HEART);
        let before = session.selection().cloned().expect("selection");
        let mut snapshot = before.clone();
        snapshot.filter_value = Some(Value::Integer(99));

        assert!(matches!(
            session.restore(snapshot),
            Err(ExploreError::InvalidSelection { .. })
        ));
        assert_eq!(session.selection(), Some(&before));
    }

    #[test]
    fn restore_with_missing_column_resets_to_defaults() {
        let mut session = session_with(HEART);
        let defaults = session.selection().cloned().expect("selection");
        session
            .set(SelectionChange::Outcome("target".into()))
            .expect("set");

        let mut snapshot = defaults.clone();
        snapshot.outcome_column = "gone".into();

        assert!(matches!(
            session.restore(snapshot),
            Err(ExploreError::StaleSelection(_))
        ));
        assert_eq!(session.selection(), Some(&defaults));
    }

    #[test]
    fn stale_selection_recovers_with_defaults() {
        let mut session = session_with(HEART);
        let defaults = session.selection().cloned().expect("selection");
        if let Some(selection) = session.selection.as_mut() {
            selection.outcome_column = "gone".into();
            selection.filter_column = "gone".into();
        }

        let counts = session.value_counts().expect("counts");
        assert_eq!(counts.column, "age");
        assert_eq!(session.selection(), Some(&defaults));
        assert_eq!(session.filtered().expect("filtered").row_count(), 1);
    }

    #[test]
    fn failed_upload_clears_the_session() {
        let mut session = session_with(HEART);
        let err = session
            .upload("bad.csv", b"a,b\n1,2,3\n", FileFormat::Csv)
            .expect_err("ragged");
        assert!(matches!(err, ExploreError::Parse(_)));
        assert!(session.table().is_none());
        assert!(session.selection().is_none());
        assert!(session.value_counts().is_err());
    }

    #[test]
    fn empty_table_reports_stale_views() {
        let mut session = session_with(b"a,b\n");
        assert_eq!(session.selection().expect("selection").filter_value, None);
        assert!(matches!(
            session.value_counts(),
            Err(ExploreError::StaleSelection(_))
        ));
        assert!(matches!(
            session.filtered(),
            Err(ExploreError::StaleSelection(_))
        ));
        assert!(matches!(
            session.joint_distribution(),
            Err(ExploreError::InsufficientColumns { found: 0 })
        ));
    }

    #[test]
    fn repeated_requests_reuse_the_memoised_view() {
        let mut session = session_with(HEART);
        let a = session.correlation().expect("corr");
        let b = session.correlation().expect("corr");
        assert!(Arc::ptr_eq(&a, &b));

        session
            .upload("data.csv", HEART, FileFormat::Csv)
            .expect("upload");
        let c = session.correlation().expect("corr");
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(*a, *c);
    }
}
