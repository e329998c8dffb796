use polars::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::schema::{
    self, COUNTRY_NAME, PERCENT_GAIN, RISING_TRENDS_SCHEMA, SCORE, TERM, TRENDS_SCHEMA, WEEK,
};

pub const TRENDS_INPUT: &str = "international_top_terms";
pub const RISING_TRENDS_INPUT: &str = "international_top_rising_terms";
pub const PREPROCESSED_OUTPUT: &str = "preprocessed_data";

pub const MONTH: &str = "month";
pub const GOOGLE_TREND: &str = "google_trend";
pub const AVG_SCORE: &str = "avg_score";
pub const AVG_PERCENT_GAIN: &str = "avg_percent_gain";

fn group_keys() -> [Expr; 3] {
    [col(COUNTRY_NAME), col(MONTH), col(TERM)]
}

/// `YYYY-MM` key: the first seven characters of `week` rendered as text.
pub fn month_expr() -> Expr {
    col(WEEK)
        .cast(DataType::String)
        .str()
        .slice(lit(0), lit(7))
        .alias(MONTH)
}

/// Group keys as text, so an all-null key column still joins against strings.
fn key_columns() -> [Expr; 3] {
    [
        col(COUNTRY_NAME).cast(DataType::String),
        month_expr(),
        col(TERM).cast(DataType::String),
    ]
}

/// Mean score per (country_name, month, term), null scores dropped first.
pub fn aggregate_trends(trends: LazyFrame) -> LazyFrame {
    trends
        .filter(col(SCORE).is_not_null())
        .with_columns(key_columns())
        .group_by(group_keys())
        .agg([col(SCORE).cast(DataType::Float64).mean().alias(AVG_SCORE)])
}

/// Mean percent gain per (country_name, month, term).
pub fn aggregate_rising_trends(rising: LazyFrame) -> LazyFrame {
    rising
        .with_columns(key_columns())
        .group_by(group_keys())
        .agg([col(PERCENT_GAIN)
            .cast(DataType::Float64)
            .mean()
            .alias(AVG_PERCENT_GAIN)])
}

/// Joins monthly term scores with monthly rising-term gains.
///
/// Every (country_name, month, term) group of `trends` yields exactly one
/// output row; `avg_percent_gain` is null where `rising` has no such group.
/// Null keys never match. Row order of the result is unspecified.
pub fn data_processing(mut trends: LazyFrame, mut rising: LazyFrame) -> Result<DataFrame> {
    schema::validate(TRENDS_INPUT, TRENDS_SCHEMA, &mut trends)?;
    schema::validate(RISING_TRENDS_INPUT, RISING_TRENDS_SCHEMA, &mut rising)?;

    let scores = aggregate_trends(trends);
    let gains = aggregate_rising_trends(rising);

    let df = scores
        .join(
            gains,
            group_keys(),
            group_keys(),
            JoinArgs::new(JoinType::Left),
        )
        .select([
            col(COUNTRY_NAME),
            col(MONTH),
            col(TERM).alias(GOOGLE_TREND),
            col(AVG_SCORE),
            col(AVG_PERCENT_GAIN),
        ])
        .collect()?;
    debug!(rows = df.height(), "joined trend aggregates");
    Ok(df)
}
