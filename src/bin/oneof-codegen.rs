//! oneOf codegen CLI
//!
//! Command-line interface for generating and exercising oneOf union types.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use oneof_codegen::{
    is_url, load_schema, load_schema_auto, render_union, DecodeError, DefaultNamingPolicy,
    Dispatch, FileSchemaStore, GenerateOptions, GenerationRun, Location, ObjectTypeCompiler,
    SchemaDocument, UnionGenerator, UnionType,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oneof-codegen")]
#[command(about = "Compile JSON Schema oneOf combinators into union types")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SchemaArgs {
    /// Schema source: file path or URL (http:// or https://)
    schema: String,

    /// JSON pointer to the node holding the oneOf
    #[arg(long, default_value = "#")]
    pointer: String,

    /// Field name the union is named after (default: schema file stem)
    #[arg(long)]
    name: Option<String>,

    /// Prefix for generated type names
    #[arg(long)]
    prefix: Option<String>,

    /// Suffix for generated type names
    #[arg(long)]
    suffix: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Emit Rust source for the union
    Generate {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Do not derive equality and hashing on the wrapper
        #[arg(long)]
        no_equals: bool,

        /// Derive Eq and Hash even when an option has floating point fields
        #[arg(long)]
        float_eq: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the union's tags and field fingerprints as JSON
    Describe {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Pick the matching option for a JSON payload
    Decode {
        #[command(flatten)]
        schema: SchemaArgs,

        /// Payload file holding a JSON object
        payload: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            schema,
            no_equals,
            float_eq,
            output,
        } => run_generate(&schema, no_equals, float_eq, output),
        Commands::Describe { schema, pretty } => run_describe(&schema, pretty),
        Commands::Decode {
            schema,
            payload,
            json,
        } => run_decode(&schema, &payload, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("oneof_codegen=debug"),
        _ => EnvFilter::new("oneof_codegen=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

impl SchemaArgs {
    fn options(&self) -> GenerateOptions {
        let mut options = GenerateOptions::new();
        if let Some(prefix) = &self.prefix {
            options = options.prefix(prefix.as_str());
        }
        if let Some(suffix) = &self.suffix {
            options = options.suffix(suffix.as_str());
        }
        options
    }

    fn field_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            Path::new(&self.schema)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "union".to_string())
        })
    }
}

/// Load the schema and run one generation pass over the node at `--pointer`.
fn build_union(args: &SchemaArgs, options: &GenerateOptions) -> Result<UnionType, u8> {
    let root = load_schema_auto(&args.schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let location = if is_url(&args.schema) {
        Location::Url(args.schema.clone())
    } else {
        Location::File(PathBuf::from(&args.schema))
    };
    let document = SchemaDocument::new(location, root);
    let node = document.node(&args.pointer).ok_or_else(|| {
        eprintln!("Error: no value at {} in {}", args.pointer, args.schema);
        2u8
    })?;

    let store = FileSchemaStore::new();
    let compiler = ObjectTypeCompiler::new();
    let naming = DefaultNamingPolicy::new(options);
    UnionGenerator::new(&store, &compiler, &naming)
        .generate(&args.field_name(), &node, &mut GenerationRun::new())
        .map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })
}

fn run_generate(
    args: &SchemaArgs,
    no_equals: bool,
    float_eq: bool,
    output: Option<PathBuf>,
) -> Result<(), u8> {
    let options = args
        .options()
        .hash_and_equals(!no_equals)
        .float_safe(!float_eq);
    let union = build_union(args, &options)?;

    let source = render_union(&union, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &source).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => print!("{}", source),
    }

    Ok(())
}

fn run_describe(args: &SchemaArgs, pretty: bool) -> Result<(), u8> {
    let union = build_union(args, &args.options())?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&union)
    } else {
        serde_json::to_string(&union)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    println!("{}", json_output);
    Ok(())
}

fn run_decode(args: &SchemaArgs, payload_path: &Path, json_output: bool) -> Result<(), u8> {
    let union = build_union(args, &args.options())?;

    let payload = load_schema(payload_path).map_err(|e| {
        report_error(json_output, &format!("loading payload: {}", e));
        e.exit_code() as u8
    })?;

    match union.from_json(&payload) {
        Ok(Dispatch::Matched(value)) => {
            let type_name = union
                .variant(value.tag())
                .map(|v| v.type_name().to_string())
                .unwrap_or_default();
            if json_output {
                let output = serde_json::json!({
                    "matched": true,
                    "tag": value.tag().name(),
                    "type": type_name,
                    "value": value,
                });
                println!("{}", output);
            } else {
                println!("{} ({})", value.tag(), type_name);
            }
            Ok(())
        }
        Ok(Dispatch::NoMatch(no_match)) => {
            if json_output {
                let output = serde_json::json!({
                    "matched": false,
                    "keys": no_match.keys,
                    "rejections": no_match.rejections,
                });
                println!("{}", output);
            } else {
                eprintln!("No match: {}", no_match);
            }
            Err(1)
        }
        Err(e) => {
            report_error(json_output, &e.to_string());
            if let (false, DecodeError::Invalid { errors, .. }) = (json_output, &e) {
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(e.exit_code() as u8)
        }
    }
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "matched": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}
