//! Required columns of the two trend inputs and the dtype checks run before
//! any query is built.

use polars::prelude::*;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Plain string column.
    Text,
    /// Anything whose text rendering starts with `YYYY-MM`.
    DateLike,
    /// Integer or float column.
    Numeric,
}

impl ColumnKind {
    pub fn accepts(&self, dtype: &DataType) -> bool {
        match self {
            ColumnKind::Text => matches!(dtype, DataType::String | DataType::Null),
            ColumnKind::DateLike => matches!(
                dtype,
                DataType::String | DataType::Date | DataType::Datetime(_, _) | DataType::Null
            ),
            ColumnKind::Numeric => matches!(
                dtype,
                DataType::Int8
                    | DataType::Int16
                    | DataType::Int32
                    | DataType::Int64
                    | DataType::UInt8
                    | DataType::UInt16
                    | DataType::UInt32
                    | DataType::UInt64
                    | DataType::Float32
                    | DataType::Float64
                    | DataType::Null
            ),
        }
    }

    pub fn expected(&self) -> &'static str {
        match self {
            ColumnKind::Text => "a string",
            ColumnKind::DateLike => "a date, datetime or string",
            ColumnKind::Numeric => "a numeric type",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

pub const COUNTRY_NAME: &str = "country_name";
pub const WEEK: &str = "week";
pub const TERM: &str = "term";
pub const SCORE: &str = "score";
pub const PERCENT_GAIN: &str = "percent_gain";

pub const TRENDS_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::new(COUNTRY_NAME, ColumnKind::Text),
    ColumnSpec::new(WEEK, ColumnKind::DateLike),
    ColumnSpec::new(TERM, ColumnKind::Text),
    ColumnSpec::new(SCORE, ColumnKind::Numeric),
];

pub const RISING_TRENDS_SCHEMA: &[ColumnSpec] = &[
    ColumnSpec::new(COUNTRY_NAME, ColumnKind::Text),
    ColumnSpec::new(WEEK, ColumnKind::DateLike),
    ColumnSpec::new(TERM, ColumnKind::Text),
    ColumnSpec::new(PERCENT_GAIN, ColumnKind::Numeric),
];

/// Checks that `lf` carries every column in `specs` with an accepted dtype.
/// Columns are checked in order, so the first offending one is reported.
pub fn validate(dataset: &str, specs: &[ColumnSpec], lf: &mut LazyFrame) -> Result<()> {
    let schema = lf.collect_schema()?;
    for spec in specs {
        let dtype = schema.get(spec.name).ok_or_else(|| PipelineError::Schema {
            dataset: dataset.to_string(),
            column: spec.name.to_string(),
        })?;
        if !spec.kind.accepts(dtype) {
            return Err(PipelineError::Type {
                dataset: dataset.to_string(),
                column: spec.name.to_string(),
                dtype: dtype.to_string(),
                expected: spec.kind.expected(),
            });
        }
    }
    Ok(())
}
