//! Derived views: pure projections of a [`Table`] used for rendering.
//!
//! Every function here fails with [`ExploreError::StaleSelection`] when the
//! table is empty or a named column is missing, so callers can fall back to
//! fresh default selections.

use std::collections::BTreeMap;

use super::error::{ExploreError, Result};
use super::model::{Column, Table, Value};

// ---------------------------------------------------------------------------
// View types
// ---------------------------------------------------------------------------

/// Row count per distinct outcome value, ordered by value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCounts {
    pub column: String,
    pub counts: Vec<(Value, usize)>,
}

impl ValueCounts {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    #[cfg(test)]
    pub fn get(&self, value: &Value) -> Option<usize> {
        self.counts
            .iter()
            .find(|(v, _)| v == value)
            .map(|(_, n)| *n)
    }
}

/// One scatter point per row. Missing coordinates stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub outcome: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JointDistribution {
    pub x_column: String,
    pub y_column: String,
    pub outcome_column: String,
    pub points: Vec<JointPoint>,
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl SummaryRow {
    /// Statistic labels in display order.
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Statistic values in the order of [`Self::LABELS`].
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

/// Symmetric Pearson correlation matrix over the numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` squared entries. NaN where undefined.
    pub values: Vec<f64>,
}

impl CorrelationMatrix {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.columns.len() + col]
    }
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

fn non_empty(table: &Table) -> Result<()> {
    if table.is_empty() {
        Err(ExploreError::StaleSelection("the table has no rows".into()))
    } else {
        Ok(())
    }
}

fn lookup<'t>(table: &'t Table, column: &str) -> Result<&'t Column> {
    table.column(column).ok_or_else(|| {
        ExploreError::StaleSelection(format!("column '{column}' is not in the table"))
    })
}

/// Count rows per distinct value of `column`. Missing cells form their own
/// bucket so the counts always add up to the row count.
pub fn value_counts(table: &Table, column: &str) -> Result<ValueCounts> {
    non_empty(table)?;
    let col = lookup(table, column)?;

    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for v in &col.values {
        *counts.entry(v).or_default() += 1;
    }

    Ok(ValueCounts {
        column: column.to_string(),
        counts: counts.into_iter().map(|(v, n)| (v.clone(), n)).collect(),
    })
}

/// Project `(x, y, outcome)` for every row, preserving row order.
pub fn joint_distribution(table: &Table, x: &str, y: &str, outcome: &str) -> Result<JointDistribution> {
    non_empty(table)?;
    let (xc, yc, oc) = (lookup(table, x)?, lookup(table, y)?, lookup(table, outcome)?);

    let points = xc
        .values
        .iter()
        .zip(&yc.values)
        .zip(&oc.values)
        .map(|((xv, yv), ov)| JointPoint {
            x: xv.as_f64(),
            y: yv.as_f64(),
            outcome: ov.clone(),
        })
        .collect();

    Ok(JointDistribution {
        x_column: x.to_string(),
        y_column: y.to_string(),
        outcome_column: outcome.to_string(),
        points,
    })
}

/// count / mean / std / min / quartiles / max for every numeric column.
/// Columns without a single numeric entry produce no row.
pub fn describe(table: &Table) -> Result<Vec<SummaryRow>> {
    non_empty(table)?;

    let mut rows = Vec::new();
    for name in table.schema().numeric_columns() {
        let mut data = lookup(table, name)?.numbers();
        if data.is_empty() {
            continue;
        }
        data.sort_by(f64::total_cmp);

        let n = data.len();
        let mean = data.iter().sum::<f64>() / n as f64;
        let std = if n < 2 {
            f64::NAN
        } else {
            let ss: f64 = data.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };

        rows.push(SummaryRow {
            column: name.to_string(),
            count: n,
            mean,
            std,
            min: data[0],
            q25: quantile_sorted(&data, 0.25),
            median: quantile_sorted(&data, 0.5),
            q75: quantile_sorted(&data, 0.75),
            max: data[n - 1],
        });
    }
    Ok(rows)
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Pairwise Pearson correlation between all numeric columns.
pub fn correlation_matrix(table: &Table) -> Result<CorrelationMatrix> {
    non_empty(table)?;

    let names: Vec<String> = table
        .schema()
        .numeric_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    let series: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| {
            lookup(table, name).map(|c| c.values.iter().map(Value::as_f64).collect())
        })
        .collect::<Result<_>>()?;

    let n = names.len();
    let mut values = vec![f64::NAN; n * n];
    for i in 0..n {
        for j in i..n {
            let mut r = pearson(&series[i], &series[j]);
            if i == j && !r.is_nan() {
                r = 1.0;
            }
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: names,
        values,
    })
}

/// Pearson's r over rows where both sides are present. NaN when fewer than
/// two such rows or either side is constant.
pub fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{load_bytes, FileFormat};

    fn load(csv: &str) -> Table {
        load_bytes(csv.as_bytes(), FileFormat::Csv).expect("load")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn outcome_counts() {
        let table = load("age,sex,target\n63,1,1\n37,1,0\n41,0,1\n");
        let counts = value_counts(&table, "target").expect("counts");

        assert_eq!(counts.get(&Value::Integer(1)), Some(2));
        assert_eq!(counts.get(&Value::Integer(0)), Some(1));
        assert_eq!(counts.counts.len(), 2);
        assert_eq!(counts.total(), table.row_count());
    }

    #[test]
    fn counts_include_missing_bucket() {
        let table = load("label,n\na,1\n,2\nb,3\na,4\n");
        let counts = value_counts(&table, "label").expect("counts");
        assert_eq!(counts.get(&Value::Null), Some(1));
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn counts_agree_with_distinct_for_large_ids() {
        let table = load("id,n\n9007199254740993,1\n9007199254740992.0,2\n");
        let counts = value_counts(&table, "id").expect("counts");
        let distinct = table.column("id").expect("column").distinct();

        assert_eq!(counts.counts.len(), distinct.len());
        assert_eq!(counts.counts.len(), 2);
    }

    #[test]
    fn joint_distribution_is_one_point_per_row() {
        let table = load("x,y,o\n1,10,a\n2,,b\n3,30,a\n");
        let joint = joint_distribution(&table, "x", "y", "o").expect("joint");

        assert_eq!(joint.points.len(), 3);
        assert_eq!(joint.points[1].y, None);
        assert_eq!(joint.points[2].x, Some(3.0));
        assert_eq!(joint.points[2].outcome, Value::Text("a".into()));
    }

    #[test]
    fn describe_matches_dataframe_conventions() {
        let table = load("v,w,label\n1,5,a\n2,,b\n3,,c\n4,,d\n");
        let rows = describe(&table).expect("describe");

        assert_eq!(rows.len(), 2);
        let v = &rows[0];
        assert_eq!(v.column, "v");
        assert_eq!(v.count, 4);
        assert!(close(v.mean, 2.5));
        assert!(close(v.std, (5.0f64 / 3.0).sqrt()));
        assert!(close(v.min, 1.0));
        assert!(close(v.q25, 1.75));
        assert!(close(v.median, 2.5));
        assert!(close(v.q75, 3.25));
        assert!(close(v.max, 4.0));

        let w = &rows[1];
        assert_eq!(w.count, 1);
        assert!(w.std.is_nan());
    }

    #[test]
    fn describe_skips_all_missing_columns() {
        let table = load("a,b\n1,\n2,\n");
        let rows = describe(&table).expect("describe");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].column, "a");
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let table = load("a,b,c,d\n1,2,9,x\n2,4,3,y\n3,7,5,z\n4,8,1,w\n");
        let corr = correlation_matrix(&table).expect("corr");

        assert_eq!(corr.columns, vec!["a", "b", "c"]);
        for i in 0..corr.len() {
            assert_eq!(corr.get(i, i), 1.0);
            for j in 0..corr.len() {
                assert_eq!(corr.get(i, j), corr.get(j, i));
                assert!(corr.get(i, j).abs() <= 1.0);
            }
        }
        assert!(corr.get(0, 1) > 0.9);
    }

    #[test]
    fn constant_columns_have_undefined_correlation() {
        let table = load("a,b\n1,5\n2,5\n3,5\n");
        let corr = correlation_matrix(&table).expect("corr");
        assert!(corr.get(1, 1).is_nan());
        assert!(corr.get(0, 1).is_nan());
        assert_eq!(corr.get(0, 0), 1.0);
    }

    #[test]
    fn correlation_without_numeric_columns_is_empty() {
        let table = load("a,b\nx,y\n");
        let corr = correlation_matrix(&table).expect("corr");
        assert!(corr.is_empty());
    }

    #[test]
    fn empty_table_and_missing_columns_are_stale() {
        let empty = load("a,b\n");
        assert!(matches!(value_counts(&empty, "a"), Err(ExploreError::StaleSelection(_))));
        assert!(matches!(describe(&empty), Err(ExploreError::StaleSelection(_))));
        assert!(matches!(correlation_matrix(&empty), Err(ExploreError::StaleSelection(_))));

        let table = load("a,b\n1,2\n");
        assert!(matches!(
            joint_distribution(&table, "a", "gone", "b"),
            Err(ExploreError::StaleSelection(_))
        ));
    }
}
