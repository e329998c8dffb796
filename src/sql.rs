use polars::prelude::*;
use polars_sql::SQLContext;
use tracing::debug;

use crate::error::Result;
use crate::nodes::{RISING_TRENDS_INPUT, TRENDS_INPUT};
use crate::schema::{self, RISING_TRENDS_SCHEMA, TRENDS_SCHEMA};

// Table names must match TRENDS_INPUT and RISING_TRENDS_INPUT.
const TREND_JOIN_SQL: &str = r#"
WITH trends AS (
    SELECT CAST(country_name AS VARCHAR) AS country_name,
           SUBSTR(CAST(week AS VARCHAR), 1, 7) AS "month",
           CAST(term AS VARCHAR) AS term,
           CAST(score AS DOUBLE) AS score
    FROM international_top_terms
    WHERE score IS NOT NULL
),
rising_trends AS (
    SELECT CAST(country_name AS VARCHAR) AS country_name,
           SUBSTR(CAST(week AS VARCHAR), 1, 7) AS "month",
           CAST(term AS VARCHAR) AS term,
           CAST(percent_gain AS DOUBLE) AS percent_gain
    FROM international_top_rising_terms
),
trend_scores AS (
    SELECT country_name, "month", term, AVG(score) AS avg_score
    FROM trends
    GROUP BY country_name, "month", term
),
rising_gains AS (
    SELECT country_name, "month", term, AVG(percent_gain) AS avg_percent_gain
    FROM rising_trends
    GROUP BY country_name, "month", term
)
SELECT s.country_name, s."month", s.term AS google_trend, s.avg_score, g.avg_percent_gain
FROM trend_scores s
LEFT JOIN rising_gains g
    ON s.country_name = g.country_name AND s."month" = g."month" AND s.term = g.term
"#;

/// Same contract as [`crate::nodes::data_processing`], executed through a
/// SQL context with both inputs registered under their dataset names.
pub fn data_processing_sql(mut trends: LazyFrame, mut rising: LazyFrame) -> Result<DataFrame> {
    schema::validate(TRENDS_INPUT, TRENDS_SCHEMA, &mut trends)?;
    schema::validate(RISING_TRENDS_INPUT, RISING_TRENDS_SCHEMA, &mut rising)?;

    let mut ctx = SQLContext::new();
    ctx.register(TRENDS_INPUT, trends);
    ctx.register(RISING_TRENDS_INPUT, rising);
    let df = ctx.execute(TREND_JOIN_SQL)?.collect()?;
    debug!(rows = df.height(), "executed trend join sql");
    Ok(df)
}
