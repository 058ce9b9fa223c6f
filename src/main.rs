use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use fre::config::AppConfig;
use fre::index::stats::print_stats;
use fre::index::{IndexReport, IndexStore, Indexer};
use fre::output::{OutputFormat, print_records};
use fre::query::{QueryExecutor, SearchCriteria};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fre")]
#[command(about = "In-memory file retrieval engine: index a directory, search by name, size and content")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML). Defaults to config.toml in the app data directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Hide the indexing progress spinner
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a directory and print statistics
    Index {
        /// Dataset root
        path: PathBuf,
    },
    /// Index a directory, then search it
    Search {
        /// Dataset root
        path: PathBuf,

        #[command(flatten)]
        filters: SearchArgs,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// When to use colors
        #[arg(long, value_enum, default_value = "auto")]
        color: ColorMode,
    },
    /// Index a directory and print statistics only
    Stats {
        /// Dataset root
        path: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Exact file name, extension included
    #[arg(short, long)]
    name: Option<String>,

    /// Minimum size in bytes (inclusive); negative admits every size
    #[arg(long, allow_negative_numbers = true)]
    min_size: Option<i64>,

    /// Maximum size in bytes (inclusive); negative admits no size
    #[arg(long, allow_negative_numbers = true)]
    max_size: Option<i64>,

    /// Space-separated words that must all appear in the file
    #[arg(short, long)]
    content: Option<String>,

    /// File extension, case-insensitive
    #[arg(short = 't', long = "type")]
    file_type: Option<String>,

    /// JSON criteria file; flags given on the command line take precedence
    #[arg(long)]
    criteria: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Never,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let app_config = AppConfig::load(cli.config.as_deref())?;
    let show_progress = !cli.no_progress && std::io::stderr().is_terminal();

    match cli.command {
        Commands::Index { path } => {
            let (store, report) = run_index(&path, &app_config, show_progress)?;
            print_stats(&store.stats(), Some(&report));
        }
        Commands::Search {
            path,
            filters,
            json,
            color,
        } => {
            let criteria = filters.into_criteria()?;
            let (store, _) = run_index(&path, &app_config, show_progress)?;
            let results = QueryExecutor::new(&store).search(&criteria)?;
            tracing::debug!(matches = results.len(), "Search finished");

            let format = if json { OutputFormat::Json } else { OutputFormat::Plain };
            print_records(&results, format, matches!(color, ColorMode::Auto))?;
        }
        Commands::Stats { path, json } => {
            let (store, report) = run_index(&path, &app_config, show_progress)?;
            let stats = store.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_stats(&stats, Some(&report));
            }
        }
    }

    Ok(())
}

/// RUST_LOG wins; otherwise info, or debug with --verbose
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

fn run_index(path: &Path, app_config: &AppConfig, show_progress: bool) -> Result<(Arc<IndexStore>, IndexReport)> {
    let mut config = app_config.index_config();
    config.show_progress = show_progress;

    let store = Arc::new(IndexStore::new());
    let indexer = Indexer::new(store.clone(), config);
    let report = indexer.index(path)?;
    Ok((store, report))
}

impl SearchArgs {
    fn into_criteria(self) -> Result<SearchCriteria> {
        let mut criteria = match &self.criteria {
            Some(file) => {
                let content = fs::read_to_string(file)
                    .with_context(|| format!("Failed to read criteria file {}", file.display()))?;
                serde_json::from_str::<SearchCriteria>(&content)
                    .with_context(|| format!("Failed to parse criteria file {}", file.display()))?
            }
            None => SearchCriteria::new(),
        };

        if self.name.is_some() {
            criteria.file_name = self.name;
        }
        if self.min_size.is_some() {
            criteria.min_size = self.min_size;
        }
        if self.max_size.is_some() {
            criteria.max_size = self.max_size;
        }
        if self.content.is_some() {
            criteria.content_search_term = self.content;
        }
        if self.file_type.is_some() {
            criteria.file_type = self.file_type;
        }

        Ok(criteria)
    }
}
