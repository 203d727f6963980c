//! Dimension layout inspector.
//!
//! Shows how state quantities resolve against the configured axis aliases
//! and what raw arrays a component would receive or hand back, without
//! touching any array data.

mod report;
mod state_file;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dim_engine::{
    combine_dimensions, load_input_properties, load_output_properties, EngineConfig,
    OutputPropertyMap,
};
use ndarray::{ArrayD, IxDyn};
use state_common::LabeledArray;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use report::PlanReport;
use state_file::{build_state, load_state_description};

#[derive(Parser, Debug)]
#[command(name = "dim-inspect")]
#[command(about = "Inspect axis resolution and raw array layouts for model state")]
struct Cli {
    /// Engine configuration file (axis aliases and extra units)
    #[arg(short, long, env = "DIM_ENGINE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve direction tokens against a set of arrays
    Resolve {
        /// Requested directions, e.g. "x,y,z"
        #[arg(short, long, value_delimiter = ',')]
        dims: Vec<String>,

        /// Axis names of one array, e.g. "lon,lat,lev" (repeatable)
        #[arg(short, long = "array", required = true)]
        arrays: Vec<String>,
    },

    /// Show the raw layouts produced for a property file
    Plan {
        /// Input property file
        #[arg(short, long)]
        properties: PathBuf,

        /// State description file
        #[arg(short, long)]
        state: PathBuf,

        /// Output property file
        #[arg(long)]
        outputs: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display()))?
            .with_env_overrides(),
        None => EngineConfig::from_env(),
    };
    let registry = config.build_registry();
    let units = config.build_unit_table();
    info!(units = units.len(), "Loaded engine configuration");
    debug!(?registry, "Dimension registry");

    match cli.command {
        Commands::Resolve { dims, arrays } => {
            let arrays = arrays
                .iter()
                .map(|names| placeholder_array(names))
                .collect::<Result<Vec<_>>>()?;
            let refs: Vec<&LabeledArray<'_>> = arrays.iter().collect();
            let resolved = combine_dimensions(&registry, &refs, &dims)?;
            for (direction, name) in dims.iter().zip(&resolved) {
                println!("{direction} -> {name}");
            }
        }
        Commands::Plan {
            properties,
            state,
            outputs,
            output,
        } => {
            let properties = load_input_properties(&properties)?;
            let outputs = match outputs {
                Some(path) => load_output_properties(&path)?,
                None => OutputPropertyMap::new(),
            };
            let description = load_state_description(&state)?;
            let state = build_state(&description)?;
            info!(
                quantities = state.len(),
                inputs = properties.len(),
                outputs = outputs.len(),
                "Planning layouts"
            );

            let report = PlanReport::build(&registry, &units, &state, &properties, &outputs)?;
            match output.as_str() {
                "json" => println!("{}", report.format_json()?),
                _ => println!("{}", report.format_table()),
            }
        }
    }

    Ok(())
}

/// A unit-length array carrying the given comma-separated axis names.
fn placeholder_array(names: &str) -> Result<LabeledArray<'static>> {
    let dims: Vec<String> = names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect();
    let shape = vec![1; dims.len()];
    LabeledArray::new(ArrayD::<f64>::zeros(IxDyn(&shape)), dims)
        .with_context(|| format!("Invalid axis list: {names}"))
}
