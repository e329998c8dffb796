use polars::prelude::*;
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::nodes::{AVG_PERCENT_GAIN, AVG_SCORE, GOOGLE_TREND, MONTH, PREPROCESSED_OUTPUT};
use crate::schema::COUNTRY_NAME;

/// One row of the `preprocessed_data` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub country_name: Option<String>,
    pub month: Option<String>,
    pub google_trend: Option<String>,
    pub avg_score: Option<f64>,
    pub avg_percent_gain: Option<f64>,
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(|c| c.as_materialized_series())
        .map_err(|_| PipelineError::Schema {
            dataset: PREPROCESSED_OUTPUT.to_string(),
            column: name.to_string(),
        })
}

pub fn summaries(df: &DataFrame) -> Result<Vec<TrendSummary>> {
    let countries = column(df, COUNTRY_NAME)?.str()?;
    let months = column(df, MONTH)?.str()?;
    let terms = column(df, GOOGLE_TREND)?.str()?;
    let scores = column(df, AVG_SCORE)?.f64()?;
    let gains = column(df, AVG_PERCENT_GAIN)?.f64()?;

    let rows = (0..df.height())
        .map(|i| TrendSummary {
            country_name: countries.get(i).map(str::to_string),
            month: months.get(i).map(str::to_string),
            google_trend: terms.get(i).map(str::to_string),
            avg_score: scores.get(i),
            avg_percent_gain: gains.get(i),
        })
        .collect();
    Ok(rows)
}

/// Summaries ordered by (country_name, month, google_trend), nulls first.
pub fn sorted_summaries(df: &DataFrame) -> Result<Vec<TrendSummary>> {
    let mut rows = summaries(df)?;
    rows.sort_by(|a, b| {
        (&a.country_name, &a.month, &a.google_trend).cmp(&(
            &b.country_name,
            &b.month,
            &b.google_trend,
        ))
    });
    Ok(rows)
}
