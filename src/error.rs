use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("dataset `{dataset}` is missing required column `{column}`")]
    Schema { dataset: String, column: String },

    #[error("column `{column}` of dataset `{dataset}` has type {dtype}, expected {expected}")]
    Type {
        dataset: String,
        column: String,
        dtype: String,
        expected: &'static str,
    },

    #[error("dataset `{0}` is not registered in the catalog")]
    DatasetNotFound(String),

    #[error("memory dataset `{0}` has not been written yet")]
    DatasetNotLoaded(String),

    #[error("node `{node}` expects {expected} inputs, got {got}")]
    NodeInputs {
        node: String,
        expected: usize,
        got: usize,
    },

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
