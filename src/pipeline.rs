use std::collections::HashSet;
use std::fmt;
use std::time::Instant;

use polars::prelude::*;
use tracing::{info, info_span};

use crate::catalog::DataCatalog;
use crate::config::Engine;
use crate::error::{PipelineError, Result};
use crate::nodes::{data_processing, PREPROCESSED_OUTPUT, RISING_TRENDS_INPUT, TRENDS_INPUT};
use crate::sql::data_processing_sql;

pub type NodeFn = Box<dyn Fn(Vec<LazyFrame>) -> Result<DataFrame> + Send + Sync>;

/// A named transformation bound to catalog datasets by name.
pub struct Node {
    pub name: String,
    pub inputs: Vec<String>,
    pub output: String,
    func: NodeFn,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("output", &self.output)
            .finish()
    }
}

impl Node {
    pub fn new(
        func: NodeFn,
        inputs: &[&str],
        output: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let inputs = inputs.iter().map(|i| i.to_string()).collect();
        Self { name: name.into(), inputs, output: output.into(), func }
    }

    pub fn run(&self, catalog: &DataCatalog) -> Result<()> {
        let _span = info_span!("node", name = %self.name).entered();
        let start = Instant::now();

        let frames = catalog.load_many(&self.inputs)?;
        let df = (self.func)(frames)?;
        let rows = df.height();
        catalog.save(&self.output, df)?;

        info!(
            output = %self.output,
            rows,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "node finished"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Pipeline {
    pub nodes: Vec<Node>,
}

impl Pipeline {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Every input must be in the catalog or come out of an earlier node.
    fn check_inputs(&self, catalog: &DataCatalog) -> Result<()> {
        let mut produced = HashSet::new();
        for node in self.nodes.iter() {
            for input in node.inputs.iter() {
                if !produced.contains(input.as_str()) && !catalog.contains(input)? {
                    return Err(PipelineError::DatasetNotFound(input.clone()));
                }
            }
            produced.insert(node.output.as_str());
        }
        Ok(())
    }

    pub fn run(&self, catalog: &DataCatalog) -> Result<()> {
        self.check_inputs(catalog)?;
        let start = Instant::now();
        for node in self.nodes.iter() {
            node.run(catalog)?;
        }
        info!(
            nodes = self.nodes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "pipeline finished"
        );
        Ok(())
    }
}

fn two_inputs(node: &str, inputs: Vec<LazyFrame>) -> Result<(LazyFrame, LazyFrame)> {
    let got = inputs.len();
    let mut inputs = inputs.into_iter();
    match (inputs.next(), inputs.next(), inputs.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(PipelineError::NodeInputs {
            node: node.to_string(),
            expected: 2,
            got,
        }),
    }
}

pub const PREPROCESS_NODE: &str = "preprocess_data";

pub fn create_pipeline(engine: Engine) -> Pipeline {
    let func: NodeFn = match engine {
        Engine::Lazy => Box::new(|inputs| {
            let (trends, rising) = two_inputs(PREPROCESS_NODE, inputs)?;
            data_processing(trends, rising)
        }),
        Engine::Sql => Box::new(|inputs| {
            let (trends, rising) = two_inputs(PREPROCESS_NODE, inputs)?;
            data_processing_sql(trends, rising)
        }),
    };
    Pipeline::new(vec![Node::new(
        func,
        &[TRENDS_INPUT, RISING_TRENDS_INPUT],
        PREPROCESSED_OUTPUT,
        PREPROCESS_NODE,
    )])
}
