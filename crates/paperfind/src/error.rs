//! Error types for the paperfind library.
//!
//! Data-quality problems inside individual records are never errors: a missing affiliation,
//! title or date degrades to an empty value. The variants here cover the failures that a
//! caller has to act on:
//! - Invalid input (queries, result limits)
//! - Network and API failures from the literature source
//! - Response parsing
//! - Configuration and rule table loading
//! - Report output
//!
//! # Examples
//!
//! ```no_run
//! use paperfind::{error::FinderError, Config, Finder};
//!
//! # async fn example() -> Result<(), FinderError> {
//! let finder = Finder::from_config(Config::default())?;
//! match finder.run("", None).await {
//!   Err(FinderError::InvalidQuery(reason)) => println!("Bad query: {reason}"),
//!   Err(e) => println!("Other error: {e}"),
//!   Ok(report) => println!("{} papers", report.papers.len()),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Error type alias used for the [`paperfind`](crate) crate.
pub type Result<T> = core::result::Result<T, FinderError>;

/// Errors that can occur when searching for and filtering papers.
#[derive(Error, Debug)]
pub enum FinderError {
  /// The search query was rejected before any request was made.
  ///
  /// Queries must contain non-whitespace text and be at most 1000 characters long.
  #[error("Invalid search query: {0}")]
  InvalidQuery(String),

  /// The requested maximum number of results was zero.
  #[error("max_results must be greater than 0")]
  InvalidMaxResults,

  /// A network request failed.
  ///
  /// This can occur when:
  /// - The network is unavailable
  /// - The server is unreachable
  /// - The request times out
  /// - The server answers with an error status
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The literature API returned something other than what was asked for.
  ///
  /// The string carries the message from the API or a description of the unexpected
  /// response.
  #[error("API error: {0}")]
  ApiError(String),

  /// An XML response from the literature API could not be read.
  #[error(transparent)]
  Xml(#[from] quick_xml::Error),

  /// A JSON response from the literature API could not be decoded.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// A pattern in an affiliation rule table is not a valid regular expression.
  #[error("Invalid rule pattern: {0}")]
  Regex(#[from] regex::Error),

  /// A file system operation failed.
  ///
  /// This occurs when reading a configuration or rule file, or when writing a report.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// A configuration or rule table file is not valid TOML for its type.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// Writing a CSV report failed.
  #[error(transparent)]
  Csv(#[from] csv::Error),

  /// Configuration values are missing or inconsistent.
  #[error("{0}")]
  Config(String),
}
