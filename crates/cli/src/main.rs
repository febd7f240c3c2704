mod table;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmdbind::metadata::CommandDecl;
use cmdbind::{EnvContext, Environment, Handler, Layered, Main, Value, handler};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use crate::table::{LoadedTable, load_env_file, load_table, write_example_table};

#[derive(Parser)]
#[command(name = "cmdbind")]
#[command(version, about = "Bind command lines against declarative command tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every command in a table and report configuration errors
    Check(CheckArgs),

    /// Bind a command line against a table and print the bound values
    Bind(BindArgs),

    /// Print (or write) an example command table
    Schema(SchemaArgs),
}

#[derive(Parser)]
struct CheckArgs {
    /// Command table (default: ./cmdbind.json)
    #[arg(value_name = "TABLE")]
    table: Option<PathBuf>,
}

#[derive(Parser)]
struct BindArgs {
    /// Command table
    #[arg(value_name = "TABLE")]
    table: PathBuf,

    /// Dotenv file consulted before the process environment for `${key}` defaults
    #[arg(long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// The command line to bind, starting with the command name
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct SchemaArgs {
    /// Write the table to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Replace FILE if it already exists
    #[arg(long, requires = "output")]
    force: bool,
}

#[derive(Serialize)]
struct Bound {
    command: String,
    values: Vec<Value>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => check(args),
        Commands::Bind(args) => bind(args),
        Commands::Schema(args) => schema(args),
    }
}

/// Every command hands its bound values back, tagged with its name.
fn echo(decl: &CommandDecl) -> Handler {
    let name = decl.name.clone();
    handler(move |args| {
        Ok(Value::Group {
            ty: name.clone(),
            args,
        })
    })
}

fn build(loaded: &LoadedTable) -> Result<Main> {
    Main::from_table("cmdbind", &loaded.table, echo)
        .with_context(|| format!("invalid command table: {}", loaded.path.display()))
}

fn check(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let loaded = load_table(args.table.as_deref())?;
    build(&loaded)?;

    println!("ok: {} commands", loaded.signature_count());
    Ok(())
}

fn bind(args: BindArgs) -> Result<()> {
    tracing::debug!("executing bind command");

    let loaded = load_table(Some(&args.table))?;

    let mut defaults = Layered::new();
    if let Some(path) = &args.env_file {
        defaults = defaults.layer(load_env_file(path)?);
    }
    let defaults = defaults.layer(EnvContext);

    let main = build(&loaded)?.with_environment(Environment::new().with_defaults(defaults));
    let out = main
        .exec(&args.args)
        .with_context(|| format!("failed to bind `{}`", args.args.join(" ")))?;

    let bound = match out {
        Value::Group { ty, args: values } => Bound {
            command: ty,
            values,
        },
        other => Bound {
            command: String::new(),
            values: vec![other],
        },
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&bound)?
    } else {
        serde_json::to_string(&bound)?
    };
    println!("{json}");
    Ok(())
}

fn schema(args: SchemaArgs) -> Result<()> {
    match args.output {
        Some(path) => {
            if write_example_table(&path, args.force)? {
                eprintln!("Created: {}", path.display());
            } else {
                eprintln!("Exists: {} (use --force to replace)", path.display());
            }
        }
        None => {
            let bytes = table::example_table().to_json_bytes();
            let json = String::from_utf8(bytes).context("table JSON is not valid UTF-8")?;
            println!("{json}");
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
