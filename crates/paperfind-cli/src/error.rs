//! Error types for the `paperfind` command line interface.

use thiserror::Error;

use super::*;

/// Errors that end a `paperfind` invocation.
#[derive(Error, Debug)]
pub enum CliError {
  /// Errors from the search pipeline, configuration or report writing
  #[error(transparent)]
  Finder(#[from] FinderError),

  /// Errors from interactive prompts
  #[error(transparent)]
  Dialog(#[from] dialoguer::Error),

  /// Errors from file system operations
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// Unusable command line or prompt input
  #[error("{0}")]
  Input(String),
}

/// Type alias for Result with [`CliError`] as the error type.
pub type Result<T> = std::result::Result<T, CliError>;
