//! Command line interface for finding PubMed papers with industry authors.
//!
//! `paperfind` searches PubMed and lists the papers that have at least one author affiliated
//! with a pharmaceutical or biotech company, either on the console or as a CSV file.
//!
//! # Usage
//!
//! ```bash
//! # Search and print the results
//! paperfind "cancer immunotherapy"
//!
//! # Consider at most 50 papers and save the results
//! paperfind "cancer immunotherapy" -m 50 -f results.csv
//!
//! # Prompt for the query, result count and output file
//! paperfind
//! ```
//!
//! An NCBI API key is taken from `--api-key`, then the `NCBI_API_KEY` environment variable
//! (a `.env` file is honored), then the configuration file.

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use clap::{builder::ArgAction, Parser};
use console::style;
use paperfind::{
  prelude::*,
  report::{write_csv_file, ReportRow},
  Config, Finder,
};
use tracing::{debug, trace, warn};
use tracing_subscriber::EnvFilter;

pub mod error;
pub mod interaction;
pub mod output;

use crate::{error::*, interaction::*, output::OutputFile};

/// Number of papers considered when neither `--max-results` nor a prompt says otherwise.
const DEFAULT_MAX_RESULTS: usize = 100;

/// Command line interface configuration and argument parsing
#[derive(Parser, Debug)]
#[command(
  name = "paperfind",
  author,
  version,
  about = "Find PubMed papers with authors from pharmaceutical or biotech companies"
)]
pub struct Cli {
  /// Search query, in PubMed syntax. Prompted for when omitted
  query: Option<String>,

  /// Maximum number of papers to consider [default: 100]
  #[arg(short, long)]
  max_results: Option<usize>,

  /// Write the results to this CSV file instead of the console
  #[arg(short = 'f', long = "file", value_name = "FILE")]
  file: Option<PathBuf>,

  /// NCBI API key, overriding NCBI_API_KEY and the configuration file
  #[arg(short, long)]
  api_key: Option<String>,

  /// Print debug information during execution
  #[arg(short, long)]
  debug: bool,

  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(short, long, action = ArgAction::Count, help = "Increase logging verbosity")]
  verbose: u8,

  /// Configuration file. Defaults to the platform configuration directory
  #[arg(long, value_name = "PATH")]
  config: Option<PathBuf>,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true)]
  accept_defaults: bool,
}

/// What to search for and where the results go.
#[derive(Debug)]
struct Request {
  query:       String,
  max_results: usize,
  output:      Option<OutputFile>,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Resolves the API key: command line, then environment.
fn api_key(cli: &Cli) -> Option<String> {
  let present = |key: &String| !key.trim().is_empty();
  cli
    .api_key
    .clone()
    .filter(present)
    .or_else(|| std::env::var("NCBI_API_KEY").ok().filter(present))
}

/// Takes the request from the arguments, prompting for whatever is missing when no query was
/// given.
fn request(cli: &Cli) -> Result<Request> {
  let interactive = cli.query.is_none();

  let query = match &cli.query {
    Some(query) => query.clone(),
    None if cli.accept_defaults =>
      return Err(CliError::Input("No search query given".to_string())),
    None => {
      println!("\n{}", style("=== paperfind ===").bold());
      cli.prompt("Search query", None)?
    },
  };

  let max_results = match cli.max_results {
    Some(max_results) => max_results,
    None if interactive => cli
      .prompt("Maximum number of results", Some(DEFAULT_MAX_RESULTS.to_string().as_str()))?
      .trim()
      .parse()
      .map_err(|_| CliError::Input("Invalid number for maximum results".to_string()))?,
    None => DEFAULT_MAX_RESULTS,
  };

  let file = match &cli.file {
    Some(file) => Some(file.clone()),
    None if interactive && cli.confirm("Save the results to a CSV file?", false)? =>
      Some(PathBuf::from(cli.prompt("Output file name", Some("papers.csv"))?.trim())),
    None => None,
  };
  let output = file.as_deref().map(output::prepare).transpose()?;

  Ok(Request { query, max_results, output })
}

/// Runs one search from start to finish.
async fn run(cli: &Cli) -> Result<()> {
  match dotenvy::dotenv() {
    Ok(path) => debug!("Loaded environment from {}", path.display()),
    Err(e) if e.not_found() => trace!("No .env file found"),
    Err(e) => warn!("Ignoring unreadable .env file: {e}"),
  }

  let mut config = Config::load(cli.config.as_deref())?;
  if let Some(key) = api_key(cli) {
    config = config.with_api_key(key);
  }
  trace!("Using configuration: {config:?}");

  let Request { query, max_results, output } = request(cli)?;
  if let Some(output) = &output {
    if output.existed {
      cli.reply(ResponseContent::Warning(&format!(
        "{} already exists and will be overwritten",
        output.path.display()
      )))?;
    }
  }

  let finder = Finder::from_config(config)?;
  cli.reply(ResponseContent::Working(&format!("Searching PubMed for \"{}\"", query.trim())))?;
  let report = finder.run(&query, Some(max_results)).await?;

  for failure in &report.failures {
    cli.reply(ResponseContent::Warning(&format!(
      "Skipped {} papers in batch {}: {}",
      failure.ids.len(),
      failure.index + 1,
      failure.error
    )))?;
  }

  match output {
    Some(output) => {
      write_csv_file(&output.path, &report.papers)?;
      cli.reply(ResponseContent::Success(&format!(
        "Saved {} papers to {}",
        report.papers.len(),
        output.path.display()
      )))
    },
    None => cli.reply(ResponseContent::Papers(&report.papers)),
  }
}

/// Entry point for the paperfind CLI application
///
/// Exits with a non-zero status only when the run as a whole fails; skipped batches are
/// reported as warnings.
#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(if cli.debug { cli.verbose.max(3) } else { cli.verbose });

  match run(&cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      debug!("Run failed: {e:?}");
      cli.reply(ResponseContent::Error(&e)).ok();
      ExitCode::FAILURE
    },
  }
}
