//! Monthly join of search-term popularity and rising-term gains by country.
//!
//! The `preprocess_data` node reads `international_top_terms` and
//! `international_top_rising_terms` from a [`DataCatalog`] and writes
//! `preprocessed_data`, one row per (country_name, month, term).

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod nodes;
pub mod pipeline;
pub mod schema;
pub mod sql;
pub mod storage;
pub mod summary;

pub use catalog::{DataCatalog, DatasetEntry};
pub use config::{Engine, Settings};
pub use error::{PipelineError, Result};
pub use nodes::data_processing;
pub use pipeline::{create_pipeline, Node, Pipeline};
pub use sql::data_processing_sql;
pub use summary::{summaries, TrendSummary};
