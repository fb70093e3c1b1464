//! Command-line interface for weave.
//!
//! # Usage
//!
//! ```bash
//! # Assemble schema manifests and report diagnostics
//! weave check schema.json
//!
//! # Print the assembled schema as SDL
//! weave sdl schema.json -o schema.graphql
//!
//! # Apply a filter expression to a JSON array
//! weave filter people.filter.json people.json --where '{"age": {"gte": 18}}'
//!
//! # Execute an operation against a manifest's constant resolvers
//! weave execute schema.json operation.json
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use weave_core::{CancellationSource, DiagnosticSeverity, ShapeDescriptor};
use weave_execution::{Executor, ExecutorConfig, Operation};
use weave_filter::{FilterInputBuilder, FilterInputDefinition};
use weave_schema::{
    BindingInfo, SchemaBuilder, SchemaDefinition, SchemaDocument, SchemaError, SchemaGraph,
    SchemaOptions,
};

#[derive(Parser, Debug)]
#[command(name = "weave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble schema manifests and report diagnostics
    Check {
        /// Manifest files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print an assembled schema as SDL
    Sdl {
        /// Schema manifest
        manifest: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a filter definition and apply it to a JSON array
    Filter {
        /// Filter manifest (shape and filter definition)
        definition: PathBuf,

        /// JSON array of elements to filter
        data: Option<PathBuf>,

        /// Filter expression as JSON
        #[arg(short = 'w', long = "where", default_value = "null")]
        expression: String,

        /// Print the number of matches instead of the matches
        #[arg(long)]
        count: bool,

        /// Print the generated input types instead of filtering
        #[arg(long)]
        types: bool,
    },

    /// Execute an operation against a schema manifest
    Execute {
        /// Schema manifest
        manifest: PathBuf,

        /// Operation document as JSON
        operation: PathBuf,

        /// Maximum selection depth
        #[arg(long, default_value_t = 16)]
        max_depth: usize,
    },

    /// Show version information
    Version,
}

/// A schema described as JSON: definitions, bindings, context data and
/// constant field values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaManifest {
    pub options: Option<SchemaOptions>,
    pub schema: Option<SchemaDefinition>,
    #[serde(flatten)]
    pub document: SchemaDocument,
    pub bindings: Vec<BindingInfo>,
    pub context_data: IndexMap<String, Value>,
    /// Constant results keyed by `Type.field`.
    pub resolvers: IndexMap<String, Value>,
}

impl SchemaManifest {
    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        read_json(path)
    }

    /// Registers everything in the manifest on a fresh builder.
    pub fn into_builder(self) -> Result<SchemaBuilder, Box<dyn std::error::Error>> {
        let mut builder = SchemaBuilder::new();
        if let Some(options) = self.options {
            builder.set_options(options)?;
        }
        if let Some(schema) = self.schema {
            builder.set_schema(schema)?;
        }

        let document = self.document;
        builder.add_document(move |_| Ok(document.clone()));

        for binding in self.bindings {
            builder.add_binding(binding)?;
        }
        for (key, value) in self.context_data {
            builder.set_context_data(&key, value)?;
        }
        for (coordinate, value) in self.resolvers {
            let Some((type_name, field_name)) = coordinate.split_once('.') else {
                return Err(format!("resolver key `{coordinate}` is not `Type.field`").into());
            };
            builder.add_resolver_fn(type_name, field_name, move |_, _, _, _| Ok(value.clone()))?;
        }
        Ok(builder)
    }

    pub fn build(self) -> Result<SchemaGraph, Box<dyn std::error::Error>> {
        Ok(self.into_builder()?.create()?)
    }
}

/// A filter over JSON elements of one shape.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterManifest {
    pub shape: ShapeDescriptor,
    #[serde(default)]
    pub filter: FilterInputDefinition,
}

impl FilterManifest {
    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        read_json(path)
    }

    pub fn into_builder(self) -> FilterInputBuilder<Value> {
        FilterInputBuilder::from_definition(self.shape, self.filter)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&source)
        .map_err(|e| format!("invalid JSON in {}: {e}", path.display()))?;
    Ok(value)
}

/// Run the CLI with the given arguments. Returns the process exit code.
pub async fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check { files } => check_manifests(&files, cli.verbose, cli.quiet),
        Commands::Sdl { manifest, output } => print_sdl(&manifest, output.as_deref()),
        Commands::Filter {
            definition,
            data,
            expression,
            count,
            types,
        } => run_filter(&definition, data.as_deref(), &expression, count, types),
        Commands::Execute {
            manifest,
            operation,
            max_depth,
        } => execute_operation(&manifest, &operation, max_depth).await,
        Commands::Version => {
            println!("weave {}", env!("CARGO_PKG_VERSION"));
            Ok(0)
        }
    }
}

fn check_manifests(
    files: &[PathBuf],
    verbose: bool,
    quiet: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut has_errors = false;

    for file in files {
        if verbose {
            println!("{} {}", "Checking".blue(), file.display());
        }

        let manifest = SchemaManifest::from_path(file)?;
        match manifest.into_builder()?.create() {
            Ok(schema) => {
                if verbose {
                    println!(
                        "{} {} ({} types)",
                        "OK".green(),
                        file.display(),
                        schema.type_count()
                    );
                }
            }
            Err(SchemaError::Build(bag)) => {
                has_errors = true;
                eprintln!("{} {}", "Error".red().bold(), file.display());
                for diagnostic in bag.iter() {
                    let label = match diagnostic.severity {
                        DiagnosticSeverity::Error => diagnostic.code.red(),
                        DiagnosticSeverity::Warning => diagnostic.code.yellow(),
                    };
                    eprintln!("  {} [{label}] {}", "-->".blue(), diagnostic.title);
                    if let Some(message) = &diagnostic.message {
                        eprintln!("      {message}");
                    }
                    if let Some(coordinate) = &diagnostic.coordinate {
                        eprintln!("      at {coordinate}");
                    }
                }
            }
            Err(error) => {
                has_errors = true;
                eprintln!("{} {}", "Error".red().bold(), file.display());
                eprintln!("  {} {error}", "-->".blue());
            }
        }
    }

    if has_errors {
        Ok(1)
    } else {
        if !quiet {
            println!(
                "{} {} manifest(s) checked",
                "Success:".green().bold(),
                files.len()
            );
        }
        Ok(0)
    }
}

fn print_sdl(manifest: &Path, output: Option<&Path>) -> Result<i32, Box<dyn std::error::Error>> {
    let schema = SchemaManifest::from_path(manifest)?.build()?;
    let sdl = schema.to_sdl();

    match output {
        Some(path) => {
            std::fs::write(path, &sdl)?;
            println!("{} {}", "Generated".green(), path.display());
        }
        None => print!("{sdl}"),
    }
    Ok(0)
}

fn run_filter(
    definition: &Path,
    data: Option<&Path>,
    expression: &str,
    count: bool,
    types: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let filter = FilterManifest::from_path(definition)?
        .into_builder()
        .compile()?;

    if types {
        let definitions = filter.to_type_definitions()?;
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(0);
    }

    let Some(data) = data else {
        eprintln!("{} a data file is required unless --types is given", "Error:".red().bold());
        return Ok(1);
    };
    let elements: Vec<Value> = read_json(data)?;
    let expression: Value = serde_json::from_str(expression)
        .map_err(|e| format!("invalid filter expression: {e}"))?;

    let source = CancellationSource::new();
    let signal = source.signal();
    if count {
        let matched = filter.count(&elements, &expression, &signal)?;
        println!("{matched}");
    } else {
        let matched = filter.apply(elements, &expression, &signal)?;
        println!("{}", serde_json::to_string_pretty(&matched)?);
    }
    Ok(0)
}

async fn execute_operation(
    manifest: &Path,
    operation: &Path,
    max_depth: usize,
) -> Result<i32, Box<dyn std::error::Error>> {
    let schema = SchemaManifest::from_path(manifest)?.build()?;
    let operation: Operation = read_json(operation)?;

    let config = ExecutorConfig::default().with_max_depth(max_depth);
    let executor = Executor::with_config(Arc::new(schema), config)?;

    let source = Arc::new(CancellationSource::new());
    let signal = source.signal();
    let interrupt = tokio::spawn({
        let source = Arc::clone(&source);
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, cancelling operation");
                source.cancel();
            }
        }
    });

    let outcome = executor.execute(&operation, &signal).await;
    interrupt.abort();

    let result = outcome?;
    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(i32::from(result.has_errors()))
}
