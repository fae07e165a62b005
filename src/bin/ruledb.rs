//! ruledb: CLI tool for loading rule-set files into SQLite.

use clap::{Parser, Subcommand};
use ruledb::{Database, LoadConfig, Pipeline, SourceConfig, SourceKind};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "ruledb")]
#[command(author = "Kaitu.io")]
#[command(version = "0.1.0")]
#[command(about = "Load IP-CIDR and domain rule-set files into SQLite tables", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every configured source directory
    Load {
        /// YAML configuration (defaults to the built-in meta-rules-dat layout)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output database, overriding the configuration
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Only load the named sources (repeatable)
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Load a single rule file
    LoadFile {
        /// Input rule-set JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Rule-set kind: ip_cidr or domain
        #[arg(short, long, value_parser = parse_kind)]
        kind: SourceKind,

        /// Table name (defaults to prefix + sanitized file stem)
        #[arg(short, long)]
        table: Option<String>,

        /// Table prefix used when no table name is given
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// Output database
        #[arg(short, long, default_value = ruledb::config::DEFAULT_DATABASE)]
        database: PathBuf,
    },

    /// List tables and row counts
    Tables {
        /// Database to inspect
        #[arg(short, long, default_value = ruledb::config::DEFAULT_DATABASE)]
        database: PathBuf,
    },

    /// Print the built-in configuration as YAML
    DefaultConfig,
}

fn parse_kind(s: &str) -> Result<SourceKind, String> {
    SourceKind::parse(s).ok_or_else(|| format!("unknown rule-set kind: {}", s))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Load {
            config,
            database,
            sources,
            verbose,
        } => load(config, database, &sources, verbose),
        Commands::LoadFile {
            input,
            kind,
            table,
            prefix,
            database,
        } => load_file(&input, kind, table, prefix, &database),
        Commands::Tables { database } => list_tables(&database),
        Commands::DefaultConfig => default_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_processing(path: &Path) {
    if std::io::stdout().is_terminal() {
        println!("\x1b[34mProcessing: \x1b[32m{}\x1b[0m", path.display());
    } else {
        println!("Processing: {}", path.display());
    }
}

fn load(
    config: Option<PathBuf>,
    database: Option<PathBuf>,
    sources: &[String],
    verbose: bool,
) -> ruledb::Result<()> {
    let start = Instant::now();
    let mut config = match config {
        Some(path) => LoadConfig::from_file(&path)?,
        None => LoadConfig::default(),
    };
    if let Some(database) = database {
        config.database = database;
    }
    config.select(sources)?;

    if verbose {
        println!("Database: {:?}", config.database);
        for source in &config.sources {
            println!("Source: {}", source);
        }
    }

    let mut db = Database::open(&config.database, &config.storage)?;
    let report = Pipeline::new(&mut db)
        .on_file(print_processing)
        .run(&config)?;

    if verbose {
        for source in &report.sources {
            println!(
                "  {}: {} tables, {} rows",
                source.name,
                source.tables.len(),
                source.total_rows()
            );
        }
    }

    println!("Program execution time: {:?}", start.elapsed());
    Ok(())
}

fn load_file(
    input: &Path,
    kind: SourceKind,
    table: Option<String>,
    prefix: String,
    database: &Path,
) -> ruledb::Result<()> {
    let start = Instant::now();
    let source = SourceConfig::new("file", input.parent().unwrap_or(Path::new(".")), kind, prefix);

    let mut db = Database::open(database, &Default::default())?;
    let mut pipeline = Pipeline::new(&mut db).on_file(print_processing);
    let report = match table {
        Some(table) => pipeline.load_file_as(input, &source, &table)?,
        None => pipeline.load_file(input, &source)?,
    };

    println!("Loaded {} rows into {}", report.rows, report.table);
    println!("Program execution time: {:?}", start.elapsed());
    Ok(())
}

fn list_tables(database: &Path) -> ruledb::Result<()> {
    let db = Database::open_read_only(database)?;
    for table in db.table_names()? {
        println!("{}\t{}", table, db.count_rows(&table)?);
    }
    Ok(())
}

fn default_config() -> ruledb::Result<()> {
    print!("{}", LoadConfig::default().to_yaml()?);
    Ok(())
}
