use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use trend_pipeline::config::DEFAULT_CONFIG_PATH;
use trend_pipeline::logging::init_logging;
use trend_pipeline::nodes::PREPROCESSED_OUTPUT;
use trend_pipeline::{create_pipeline, summaries, DataCatalog, Engine, Settings};

#[derive(Parser)]
#[command(name = "trend-pipeline")]
#[command(about = "Joins monthly search-term scores with rising-term gains", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline against the configured catalog
    Run {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Override the configured engine
        #[arg(long, value_enum)]
        engine: Option<Engine>,
        /// Print the output table
        #[arg(long)]
        show: bool,
        /// Print the output rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// List pipeline nodes and catalog datasets
    List {
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

fn load_settings(path: &PathBuf) -> Result<Settings> {
    Settings::from_file(path).with_context(|| format!("Failed to read config {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, engine, show, json } => {
            let mut settings = load_settings(&config)?;
            if let Some(engine) = engine {
                settings.engine = engine;
            }
            init_logging(&settings.logging);
            run(&settings, show, json)?;
        }
        Commands::List { config } => {
            let settings = load_settings(&config)?;
            list(&settings)?;
        }
    }

    Ok(())
}

fn run(settings: &Settings, show: bool, json: bool) -> Result<()> {
    let start = Instant::now();
    let catalog = DataCatalog::from_settings(settings);
    let pipeline = create_pipeline(settings.engine);
    info!(engine = ?settings.engine, nodes = pipeline.nodes.len(), "starting pipeline");
    pipeline.run(&catalog).context("Pipeline run failed")?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "run complete");

    if show || json {
        let df = catalog.load(PREPROCESSED_OUTPUT)?.collect()?;
        if show {
            println!("{df}");
        }
        if json {
            println!("{}", serde_json::to_string_pretty(&summaries(&df)?)?);
        }
    }
    Ok(())
}

fn list(settings: &Settings) -> Result<()> {
    let catalog = DataCatalog::from_settings(settings);
    for node in create_pipeline(settings.engine).nodes.iter() {
        println!("{}: [{}] -> {}", node.name, node.inputs.join(", "), node.output);
    }
    for name in catalog.names()? {
        println!("  {name}: {}", catalog.describe(&name)?);
    }
    Ok(())
}
