//! catalog-filter: try filter queries from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Show the parsed tree
//! catalog-filter 'tag:payments NOT lifecycle:deprecated'
//!
//! # Filter a JSON array of service documents
//! catalog-filter match 'owner:team-money' --file services.json
//! ```

mod repl;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use catalog_filter::prelude::*;

#[derive(Parser)]
#[command(name = "catalog-filter")]
#[command(version)]
#[command(about = "Parse and apply service catalog filter queries", long_about = None)]
#[command(after_help = "EXAMPLES:
    catalog-filter 'name:billing OR tag:payments'
    catalog-filter explain '(tag:api OR tag:web) NOT lifecycle:deprecated'
    catalog-filter match 'owner:\"team money\"' --file services.json")]
struct Cli {
    /// The filter query to parse
    query: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "tree", global = true)]
    format: OutputFormat,

    /// Config file with the [keys] table
    #[arg(long, env = "CATALOG_FILTER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Tree,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and explain its structure
    Explain {
        /// The filter query to explain
        query: String,
    },
    /// Print the records of a JSON file that match a query
    Match {
        /// The filter query to apply
        query: String,

        /// JSON file holding an array of service documents
        #[arg(long)]
        file: PathBuf,
    },
    /// List the filter keys and the record fields they map to
    Keys,
    /// Interactive REPL mode
    Repl {
        /// JSON file of service documents to filter as queries are entered
        #[arg(long)]
        file: Option<PathBuf>,
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
    let default = if verbose {
        "catalog_filter=debug"
    } else {
        "catalog_filter=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let parser = config.parser();

    match &cli.command {
        Some(Commands::Explain { query }) => explain_query(&parser, query),
        Some(Commands::Match { query, file }) => match_records(&parser, query, file, cli.format),
        Some(Commands::Keys) => {
            show_keys(parser.keys());
            Ok(())
        }
        Some(Commands::Repl { file }) => {
            let records = match file {
                Some(path) => load_records(path)?,
                None => Vec::new(),
            };
            repl::run_repl(&parser, &records)
        }
        None => match &cli.query {
            Some(query) => print_tree(&parser, query, cli.format),
            None => {
                println!("{}", "catalog-filter".cyan().bold());
                println!();
                println!("Usage: catalog-filter <QUERY> [OPTIONS]");
                println!();
                println!("Try: catalog-filter --help");
                Ok(())
            }
        },
    }
}

fn print_tree(parser: &FilterParser, query: &str, format: OutputFormat) -> anyhow::Result<()> {
    let root = parser.parse(query)?;
    match format {
        OutputFormat::Tree => println!("{}", root.to_string().white()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&root)?),
    }
    Ok(())
}

fn explain_query(parser: &FilterParser, query: &str) -> anyhow::Result<()> {
    println!("{}", "Filter Query Explanation".cyan().bold());
    println!();
    println!("{} {}", "Query:".dimmed(), query.yellow());
    println!();

    let root = parser.parse(query)?;
    println!("{} {}", "Bracketed:".dimmed(), root.to_string().white());
    println!(
        "{} {} literal(s), depth {}",
        "Size:".dimmed(),
        root.literal_count(),
        root.depth()
    );
    println!();
    println!("{}", "Tree:".green().bold());
    print_node(&root, 1);
    Ok(())
}

fn print_node(node: &FilterNode, indent: usize) {
    let pad = "  ".repeat(indent);
    match node {
        FilterNode::Literal { key, value } => {
            println!("{}{}{}{}", pad, key.cyan(), ":".dimmed(), value.yellow())
        }
        FilterNode::And { left, right } => {
            println!("{}{}", pad, "AND".green().bold());
            print_node(left, indent + 1);
            print_node(right, indent + 1);
        }
        FilterNode::Or { left, right } => {
            println!("{}{}", pad, "OR".magenta().bold());
            print_node(left, indent + 1);
            print_node(right, indent + 1);
        }
        FilterNode::Not { child } => {
            println!("{}{}", pad, "NOT".red().bold());
            print_node(child, indent + 1);
        }
    }
}

fn match_records(
    parser: &FilterParser,
    query: &str,
    file: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let root = parser.parse(query)?;
    let records = load_records(file)?;
    let matched = filter_records(&root, &records, parser.keys());
    debug!(total = records.len(), matched = matched.len(), "filtered records");

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matched)?),
        OutputFormat::Tree => {
            if matched.is_empty() {
                println!("{}", "(no matches)".dimmed());
                return Ok(());
            }
            for record in &matched {
                println!("  • {}", record_label(record).white());
            }
            println!();
            println!(
                "{} of {} record(s) matched",
                matched.len().to_string().cyan(),
                records.len()
            );
        }
    }
    Ok(())
}

fn load_records(file: &Path) -> anyhow::Result<Vec<Value>> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<Value> = serde_json::from_str(&content)
        .map_err(FilterError::from)
        .with_context(|| format!("{} must hold a JSON array of records", file.display()))?;
    Ok(records)
}

fn record_label(record: &Value) -> String {
    match record.get("name") {
        Some(Value::String(name)) => name.clone(),
        _ => record.to_string(),
    }
}

fn show_keys(keys: &KeySet) {
    println!("{}", "Filter Keys".cyan().bold());
    println!();
    println!("{:16} {}", "Key".white().bold(), "Record field".white().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (key, field) in keys.iter() {
        println!("{:16} {}", key.cyan(), field.dimmed());
    }
}
