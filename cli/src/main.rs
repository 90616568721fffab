use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use managed_json_core::{KeyValue, detach, detach_all, find_by_primary_key};
use managed_json_sqlite::{DEFAULT_PREFIX, Session, SessionConfig};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "MANAGED_JSON_LOG";

/// How the `--key` argument of `find` is interpreted.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliKeyKind {
    /// Integer if the key parses as one, text otherwise.
    Auto,
    Text,
    Integer,
    /// The null integer key; `--key` is ignored.
    Null,
}

#[derive(Debug, Parser)]
#[command(name = "managed-json")]
#[command(about = "Store JSON objects in SQLite and export detached copies")]
struct Cli {
    #[command(flatten)]
    session: SessionArgs,
    /// Log session activity to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct SessionArgs {
    /// Database file path.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Table prefix.
    #[arg(long, global = true, default_value = DEFAULT_PREFIX)]
    prefix: String,
    /// YAML session config; replaces --db and --prefix.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a record type and its primary key field.
    Register(RegisterArgs),
    /// List registered record types.
    Types,
    /// Import objects from a JSON file (an object or an array of objects).
    Import(ImportArgs),
    /// Find one object by primary key and print a detached copy.
    Find(FindArgs),
    /// Print detached copies of every object of a type.
    Export(ExportArgs),
}

#[derive(Debug, Args)]
struct RegisterArgs {
    /// Record type name.
    #[arg(long = "type")]
    type_name: String,
    /// Primary key field.
    #[arg(long)]
    primary_key: String,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Record type name.
    #[arg(long = "type")]
    type_name: String,
    /// JSON file to import; `-` reads stdin.
    #[arg(long)]
    input: PathBuf,
}

#[derive(Debug, Args)]
struct FindArgs {
    /// Record type name.
    #[arg(long = "type")]
    type_name: String,
    /// Primary key value.
    #[arg(long)]
    key: Option<String>,
    /// How to interpret the key.
    #[arg(long, default_value = "auto")]
    kind: CliKeyKind,
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Record type name.
    #[arg(long = "type")]
    type_name: String,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = open_session(&cli.session).and_then(|session| match cli.command {
        Command::Register(args) => run_register(&session, args),
        Command::Types => run_types(&session),
        Command::Import(args) => run_import(&session, args),
        Command::Find(args) => run_find(&session, args),
        Command::Export(args) => run_export(&session, args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_session(args: &SessionArgs) -> Result<Session, String> {
    let config = match (&args.config, &args.db) {
        (Some(path), _) => SessionConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        (None, Some(db)) => SessionConfig {
            path: Some(db.clone()),
            prefix: args.prefix.clone(),
        },
        (None, None) => return Err("Specify a database with --db or --config".to_string()),
    };
    Session::from_config(&config).map_err(|err| err.to_string())
}

fn run_register(session: &Session, args: RegisterArgs) -> Result<(), String> {
    session
        .register_type(&args.type_name, &args.primary_key)
        .map_err(|err| err.to_string())?;
    println!(
        "Registered '{}' with primary key '{}'.",
        args.type_name, args.primary_key
    );
    Ok(())
}

fn run_types(session: &Session) -> Result<(), String> {
    let types = session.registered_types().map_err(|err| err.to_string())?;
    for (name, primary_key) in types {
        let count = session.count(&name).map_err(|err| err.to_string())?;
        println!("{name}\t{primary_key}\t{count}");
    }
    Ok(())
}

fn run_import(session: &Session, args: ImportArgs) -> Result<(), String> {
    let raw = read_input(&args.input)?;
    let parsed: Value = serde_json::from_str(&raw)
        .map_err(|err| format!("Failed to parse '{}': {err}", args.input.display()))?;
    let bodies = match parsed {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut imported = 0usize;
    for body in bodies {
        session
            .add_value(&args.type_name, body)
            .map_err(|err| format!("Import stopped after {imported} object(s): {err}"))?;
        imported += 1;
    }

    info!(type_name = %args.type_name, imported, "import finished");
    println!("Imported {imported} '{}' object(s).", args.type_name);
    Ok(())
}

fn run_find(session: &Session, args: FindArgs) -> Result<(), String> {
    let key = parse_key(args.key.as_deref(), args.kind)?;
    let found = find_by_primary_key(session, &args.type_name, &key).map_err(|err| err.to_string())?;

    let copy: Value = match found {
        Some(object) => detach(&object).map_err(|err| err.to_string())?,
        None => Value::Null,
    };
    print_json(&copy)
}

fn run_export(session: &Session, args: ExportArgs) -> Result<(), String> {
    let objects = session
        .objects(&args.type_name)
        .map_err(|err| err.to_string())?;
    let copies: Vec<Value> = detach_all(&objects).map_err(|err| err.to_string())?;

    match args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|err| {
                        format!(
                            "Failed to create output directory '{}': {err}",
                            parent.display()
                        )
                    })?;
                }
            }
            let raw = serde_json::to_string_pretty(&copies)
                .map_err(|err| format!("Failed to serialize export: {err}"))?;
            fs::write(&path, raw)
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            println!(
                "Exported {} '{}' object(s) to '{}'.",
                copies.len(),
                args.type_name,
                path.display()
            );
            Ok(())
        }
        None => print_json(&Value::Array(copies)),
    }
}

fn parse_key(raw: Option<&str>, kind: CliKeyKind) -> Result<KeyValue, String> {
    let required = || raw.ok_or_else(|| "--key is required unless --kind null".to_string());
    match kind {
        CliKeyKind::Null => Ok(KeyValue::Integer(None)),
        CliKeyKind::Text => Ok(KeyValue::from(required()?)),
        CliKeyKind::Integer => {
            let raw = required()?;
            raw.parse::<i64>()
                .map(KeyValue::from)
                .map_err(|err| format!("Invalid integer key '{raw}': {err}"))
        }
        CliKeyKind::Auto => {
            let raw = required()?;
            Ok(raw
                .parse::<i64>()
                .map_or_else(|_| KeyValue::from(raw), KeyValue::from))
        }
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        return Ok(raw);
    }
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

fn print_json(value: &Value) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|err| format!("Failed to serialize output: {err}"))?;
    println!("{raw}");
    Ok(())
}
