//! fluent-cql: compile predicates to CQL from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Compile a query
//! fluent-cql query --from Users --where "Id = 1234 && Age > 10" --select Name,Age
//!
//! # Compile a secondary-index lookup
//! fluent-cql index --start-key user-1 --limit 20 --where "State = 'UT' && Age >= 21"
//!
//! # Compile a serialized expression tree
//! fluent-cql query --json query.json --format json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use fluent_cql::config::{Config, OutputFormat};
use fluent_cql::prelude::*;
use fluent_cql::{compile_index, compile_predicate, compile_query};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fluent-cql")]
#[command(version)]
#[command(about = "Compile predicate expressions to CQL queries and index clauses", long_about = None)]
#[command(after_help = "EXAMPLES:
    fluent-cql query --from Users --where 'Id = 1234' --select Age
    fluent-cql query --from Users --where 'Age > 10' --where \"Name IN ('a','b')\"
    fluent-cql index --start-key k --limit 20 --where 'a = 1 && b > 3.14'
    fluent-cql explain '(Id = 1234 || Age = 10) && Name = null'")]
struct Cli {
    /// Output format (overrides the config file)
    #[arg(short, long, value_enum, global = true, env = "FLUENT_CQL_FORMAT")]
    format: Option<Format>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a SELECT query
    Query {
        /// Column family to read from
        #[arg(long, required_unless_present = "json")]
        from: Option<String>,

        /// WHERE fragment; repeat to AND several fragments
        #[arg(short = 'w', long = "where")]
        filters: Vec<String>,

        /// Comma-separated fields, or '*'
        #[arg(short, long)]
        select: Option<String>,

        /// Read a JSON-serialized expression chain instead
        #[arg(long, conflicts_with_all = ["from", "filters", "select"])]
        json: Option<PathBuf>,
    },
    /// Compile a secondary-index lookup
    Index {
        /// Row key the scan starts from
        #[arg(long, default_value = "")]
        start_key: String,

        /// Maximum rows returned (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Conjunctive predicate
        #[arg(short = 'w', long = "where", required_unless_present = "json")]
        predicate: Option<String>,

        /// Read a JSON-serialized predicate instead
        #[arg(long, conflicts_with = "predicate")]
        json: Option<PathBuf>,
    },
    /// Parse a predicate and show its tree and compiled clause
    Explain {
        /// The predicate to explain
        predicate: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("FLUENT_CQL_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    if let Some(format) = cli.format {
        config.format = format.into();
    }
    tracing::debug!(?config, "loaded configuration");

    match &cli.command {
        Commands::Query {
            from,
            filters,
            select,
            json,
        } => {
            let chain = match json {
                Some(path) => read_json(path)?,
                None => build_query(from.as_deref(), filters, select.as_deref())?,
            };
            let compiled = compile_query(&chain)?;
            print_query(&compiled, &config)
        }
        Commands::Index {
            start_key,
            limit,
            predicate,
            json,
        } => {
            let predicate = match (json, predicate) {
                (Some(path), _) => read_json(path)?,
                (None, Some(text)) => parse_predicate(text)?,
                (None, None) => bail!("an index lookup needs --where or --json"),
            };
            let limit = limit.unwrap_or(config.default_limit);
            let set = IndexQuery::new(start_key.as_str(), limit, predicate).compile()?;
            print_index(&set, &config)
        }
        Commands::Explain { predicate } => explain(predicate, cli.verbose),
    }
}

fn build_query(from: Option<&str>, filters: &[String], select: Option<&str>) -> Result<Expr> {
    let Some(from) = from else {
        bail!("a query needs --from or --json");
    };
    let mut query = Query::source(from);
    for text in filters {
        let predicate =
            parse_predicate(text).with_context(|| format!("in --where '{}'", text))?;
        query = query.filter(predicate);
    }
    if let Some(text) = select {
        query = query.select(parse_projection(text)?);
    }
    Ok(query.into_expr())
}

fn read_json(path: &Path) -> Result<Expr> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a serialized expression", path.display()))
}

fn print_query(compiled: &CompiledQuery, config: &Config) -> Result<()> {
    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(compiled)?),
        OutputFormat::Text if config.single_line => println!("{}", compiled.to_single_line()),
        OutputFormat::Text => println!("{}", compiled),
    }
    Ok(())
}

fn print_index(set: &IndexClauseSet, config: &Config) -> Result<()> {
    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(set)?),
        OutputFormat::Text => {
            println!("{} {}", "Start key:".dimmed(), set.start_key.to_string().yellow());
            println!("{} {}", "Limit:".dimmed(), set.limit.to_string().cyan());
            println!("{}", "Clauses:".green().bold());
            for (i, clause) in set.clauses.iter().enumerate() {
                println!(
                    "  {}. {} {} {}",
                    i + 1,
                    clause.field.white(),
                    clause.operator.to_string().cyan(),
                    clause.value.to_string().yellow()
                );
            }
        }
    }
    Ok(())
}

fn explain(text: &str, verbose: bool) -> Result<()> {
    println!("{} {}", "Predicate:".dimmed(), text.yellow());
    println!();

    let predicate = parse_predicate(text)?;
    println!("{}", "Parsed Tree:".green().bold());
    println!("  {}", predicate.to_string().white());
    if verbose {
        println!("  {}", format!("{:?}", predicate).dimmed());
    }

    println!();
    println!("{}", "WHERE clause:".green().bold());
    println!("  {}", compile_predicate(&predicate)?.white());

    println!();
    println!("{}", "Index clauses:".green().bold());
    match compile_index(Value::Null, 0, &predicate) {
        Ok(set) => {
            for clause in &set.clauses {
                println!("  {}", clause.to_string().white());
            }
        }
        Err(e) => println!("  {} {}", "not indexable:".yellow(), e),
    }
    Ok(())
}
