//! Rawmap CLI - map delimited text onto tree, series, points or graph JSON
//!
//! # Commands
//!
//! ```bash
//! rawmap parse input.csv                          # Rows as JSON objects
//! rawmap metadata input.csv                       # Sniffed column types
//! rawmap models                                   # Registered models and dimensions
//! rawmap map input.csv -m tree \
//!     --bind hierarchy=Category,Sub --bind size=Amount
//! rawmap map input.csv --request mapping.json     # Mapping kept in a file
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`, which may also
//! be set in a `.env` file.

use clap::{Parser, Subcommand};
use rawmap::{
    format_delimiter, ingest_file, map_dataset, IngestOptions, Ingested, MappingRequest,
    ModelRegistry,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rawmap")]
#[command(about = "Map delimited text onto tree, time series, points or graph structures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input options shared by every command that reads a file.
#[derive(clap::Args)]
struct InputArgs {
    /// Input file
    input: PathBuf,

    /// Field delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Input encoding, e.g. utf-8 or iso-8859-1 (auto-detect if not specified)
    #[arg(short, long)]
    encoding: Option<String>,
}

impl InputArgs {
    fn options(&self) -> IngestOptions {
        IngestOptions {
            delimiter: self.delimiter,
            encoding: self.encoding.clone(),
        }
    }
}

/// Output options shared by every command that writes JSON.
#[derive(clap::Args)]
struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and output its rows as JSON
    Parse {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Output the sniffed type of every column
    Metadata {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List registered models and their dimensions
    Models,

    /// Bind columns to a model's dimensions and output the mapped structure
    Map {
        #[command(flatten)]
        input: InputArgs,

        /// Model name (see `rawmap models`)
        #[arg(short, long, required_unless_present = "request")]
        model: Option<String>,

        /// Binding as dimension=column[,column...]; repeatable
        #[arg(short, long, value_parser = parse_binding)]
        bind: Vec<(String, Vec<String>)>,

        /// JSON mapping request file ({"model": ..., "bindings": [...]})
        #[arg(short, long, conflicts_with = "model")]
        request: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, &output),
        Commands::Metadata { input, output } => cmd_metadata(&input, &output),
        Commands::Models => cmd_models(),
        Commands::Map {
            input,
            model,
            bind,
            request,
            output,
        } => cmd_map(&input, model, bind, request.as_deref(), &output),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn ingest(input: &InputArgs) -> Result<Ingested, Box<dyn std::error::Error>> {
    eprintln!("📄 Reading: {}", input.input.display());
    let ingested = ingest_file(&input.input, &input.options())?;

    eprintln!("   Encoding: {}", ingested.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(ingested.delimiter),
        if input.delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", ingested.dataset.header().join(", "));
    eprintln!("✅ Parsed {} rows", ingested.dataset.len());
    Ok(ingested)
}

fn cmd_parse(input: &InputArgs, output: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ingested = ingest(input)?;
    write_json(&ingested.dataset, output)
}

fn cmd_metadata(input: &InputArgs, output: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let ingested = ingest(input)?;
    write_json(&ingested.metadata, output)
}

fn cmd_models() -> Result<(), Box<dyn std::error::Error>> {
    let registry = ModelRegistry::with_builtins();

    for (name, model) in registry.iter() {
        println!("{} - {}", name, model.title());
        if let Some(description) = model.description() {
            println!("  {}", description);
        }
        for (id, dimension) in model.dimensions() {
            let types: Vec<&str> = dimension.types().iter().map(|t| t.as_str()).collect();
            println!(
                "  {:<10} {:<10} required: {}  multiple: {}  types: {}",
                id,
                dimension.title(),
                dimension.required(),
                dimension.multiple(),
                types.join("/")
            );
        }
        println!();
    }
    Ok(())
}

fn cmd_map(
    input: &InputArgs,
    model: Option<String>,
    bindings: Vec<(String, Vec<String>)>,
    request_path: Option<&Path>,
    output: &OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = match request_path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str::<MappingRequest>(&content)?
        }
        None => MappingRequest::new(model.unwrap_or_default()),
    };
    for (dimension, columns) in bindings {
        request = request.bind(dimension, columns);
    }

    let ingested = ingest(input)?;
    let registry = ModelRegistry::with_builtins();

    eprintln!("⚙️  Mapping with '{}'", request.model);
    let outcome = map_dataset(&registry, &ingested, &request)?;
    if outcome.valid {
        eprintln!("✅ {} items", outcome.output.len());
    } else {
        eprintln!("⚠️  {}", outcome.instruction);
    }

    write_json(&outcome.output, output)
}

/// Parse `dimension=col1,col2`.
fn parse_binding(s: &str) -> Result<(String, Vec<String>), String> {
    let (dimension, columns) = s
        .split_once('=')
        .ok_or_else(|| format!("expected dimension=column[,column...], got '{}'", s))?;
    let columns: Vec<String> = columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();
    if dimension.trim().is_empty() || columns.is_empty() {
        return Err(format!("expected dimension=column[,column...], got '{}'", s));
    }
    Ok((dimension.trim().to_string(), columns))
}

fn write_json<T: Serialize>(value: &T, output: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let json = if output.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    write_output(&json, output.output.as_deref())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
