//! DataScout: a Hugging Face dataset explorer.
//!
//! DataScout searches the hub's dataset listing, loads one split of a
//! dataset, and shows its schema, example rows and statistics, or exports a
//! single column as CSV. Every operation is a fresh, synchronous
//! fetch-and-display cycle against the hub.
//!
//! # Modules
//!
//! - [`hub`]: Registry access (listing, split acquisition) behind [`hub::DatasetHub`]
//! - [`table`]: Loaded split representation, parquet decoding, feature descriptions
//! - [`search`], [`explore`], [`export`]: The three user-facing operations
//! - [`app`]: Form state, event wiring and the interactive shell
//! - [`error`]: Error types for datascout operations

pub mod app;
pub mod error;
pub mod explore;
pub mod export;
pub mod hub;
pub mod search;
pub mod table;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub use error::DataScoutError;

use hub::{HubClient, HubConfig, Split};

/// The datascout CLI application.
#[derive(Parser)]
#[command(name = "datascout")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    hub: HubArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Hub connection settings shared by all subcommands.
#[derive(clap::Args)]
struct HubArgs {
    /// Hugging Face Hub endpoint.
    #[arg(long, env = "HF_ENDPOINT", default_value = hub::DEFAULT_ENDPOINT, global = true)]
    endpoint: String,

    /// Timeout in seconds for each listing request.
    #[arg(long, default_value_t = 30, global = true)]
    timeout: u64,

    /// Directory for downloaded parquet shards (defaults to the hf-hub cache).
    #[arg(long, env = "DATASCOUT_CACHE_DIR", global = true)]
    cache_dir: Option<PathBuf>,
}

impl HubArgs {
    fn to_config(&self) -> HubConfig {
        HubConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout),
            cache_dir: self.cache_dir.clone(),
            ..HubConfig::default()
        }
    }
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search dataset ids containing a substring (case-sensitive, max 50).
    Search(SearchArgs),
    /// Show schema, example rows and statistics of a dataset split.
    Explore(ExploreArgs),
    /// Export one column of a dataset split as CSV.
    Export(ExportArgs),
    /// List the column names of a dataset split.
    Columns(ColumnsArgs),
    /// Interactive explorer session on stdin/stdout.
    Shell,
}

/// Arguments for the search subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Substring to look for; empty lists the first results.
    #[arg(default_value = "")]
    query: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the explore subcommand.
#[derive(clap::Args)]
struct ExploreArgs {
    /// Dataset id or huggingface.co dataset URL.
    dataset: String,

    /// Split to load.
    #[arg(long, value_enum, default_value_t = Split::Train)]
    split: Split,

    /// Number of example rows to show (1-20).
    #[arg(long, default_value_t = app::DEFAULT_EXAMPLES as u8,
          value_parser = clap::value_parser!(u8).range(1..=app::MAX_EXAMPLES as i64))]
    examples: u8,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Dataset id or huggingface.co dataset URL.
    dataset: String,

    /// Column to export.
    #[arg(long)]
    column: String,

    /// Split to load.
    #[arg(long, value_enum, default_value_t = Split::Train)]
    split: Split,

    /// Write the CSV to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Arguments for the columns subcommand.
#[derive(clap::Args)]
struct ColumnsArgs {
    /// Dataset id or huggingface.co dataset URL.
    dataset: String,

    /// Split to read the column names from.
    #[arg(long, value_enum, default_value_t = app::COLUMN_LIST_SPLIT)]
    split: Split,
}

/// Output format for search and explore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Run the datascout CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DataScoutError> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let Some(command) = cli.command else {
        println!("datascout {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Search, inspect and export Hugging Face datasets.");
        println!();
        println!("Run 'datascout --help' for usage information.");
        return Ok(());
    };

    let config = cli.hub.to_config();
    match command {
        Commands::Search(args) => run_search(&config, args),
        Commands::Explore(args) => run_explore(&config, args),
        Commands::Export(args) => run_export(&config, args),
        Commands::Columns(args) => run_columns(&config, args),
        Commands::Shell => run_shell(&config),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();

    // A host process may already own the global subscriber.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run_search(config: &HubConfig, args: SearchArgs) -> Result<(), DataScoutError> {
    let client = HubClient::new(config)?;
    let results = search::search_datasets(&client, &args.query)?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text => {
            for id in &results {
                println!("{id}");
            }
        }
    }
    Ok(())
}

fn run_explore(config: &HubConfig, args: ExploreArgs) -> Result<(), DataScoutError> {
    // Reject malformed ids before touching the network.
    hub::resolve::parse_dataset_input(&args.dataset)?;
    let client = HubClient::new(config)?;
    let report =
        explore::explore_dataset(&client, &args.dataset, args.split, usize::from(args.examples))?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{report}"),
    }
    Ok(())
}

fn run_export(config: &HubConfig, args: ExportArgs) -> Result<(), DataScoutError> {
    hub::resolve::parse_dataset_input(&args.dataset)?;
    let client = HubClient::new(config)?;
    let result = export::export_column(&client, &args.dataset, args.split, &args.column)?;

    eprintln!("{}", result.status);
    match args.out {
        Some(path) if result.is_found() => {
            std::fs::write(&path, &result.csv)?;
            info!(path = %path.display(), bytes = result.csv.len(), "wrote CSV");
        }
        Some(_) => {}
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(result.csv.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn run_columns(config: &HubConfig, args: ColumnsArgs) -> Result<(), DataScoutError> {
    hub::resolve::parse_dataset_input(&args.dataset)?;
    let client = HubClient::new(config)?;
    let table = hub::DatasetHub::load_split(&client, &args.dataset, args.split)?;

    for column in table.column_names() {
        println!("{column}");
    }
    Ok(())
}

fn run_shell(config: &HubConfig) -> Result<(), DataScoutError> {
    let client = HubClient::new(config)?;
    let mut shell = app::Shell::new(&client);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    shell.run(stdin.lock(), &mut stdout)
}
