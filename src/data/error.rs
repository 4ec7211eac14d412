use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Selection fields
// ---------------------------------------------------------------------------

/// The user-facing choices held by a [`Selection`](crate::session::Selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionField {
    Outcome,
    XFeature,
    YFeature,
    FilterColumn,
    FilterValue,
}

impl fmt::Display for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionField::Outcome => "outcome column",
            SelectionField::XFeature => "X-axis feature",
            SelectionField::YFeature => "Y-axis feature",
            SelectionField::FilterColumn => "filter column",
            SelectionField::FilterValue => "filter value",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExploreError {
    /// Malformed upload. Nothing from the upload is kept.
    #[error("Could not read the uploaded file: {0}")]
    Parse(String),

    /// The feature comparison needs two numeric columns.
    #[error("Feature comparison needs at least two numeric columns, this table has {found}")]
    InsufficientColumns { found: usize },

    /// A choice outside the legal options of its field.
    #[error("'{value}' is not a valid {field}")]
    InvalidSelection { field: SelectionField, value: String },

    /// The selection no longer matches the loaded table.
    #[error("Selection is out of date: {0}")]
    StaleSelection(String),
}

pub type Result<T> = std::result::Result<T, ExploreError>;
