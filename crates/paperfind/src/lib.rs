//! Industry-affiliated paper discovery for PubMed.
//!
//! `paperfind` searches PubMed for a free-text query and keeps only the papers that have at
//! least one author affiliated with a pharmaceutical or biotech company, providing:
//!
//! - Heuristic affiliation classification driven by configurable rule tables
//! - Company name and contact email extraction from affiliation text
//! - Paper filtering and result assembly with stable ordering
//! - A batched, failure-tolerant search and fetch pipeline
//! - CSV report rows for downstream tooling
//!
//! # Getting Started
//!
//! ```no_run
//! use paperfind::{prelude::*, Config, Finder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let finder = Finder::from_config(Config::default())?;
//!   let report = finder.run("cancer immunotherapy", Some(50)).await?;
//!
//!   for paper in &report.papers {
//!     println!("{}: {}", paper.paper_id, paper.companies.join("; "));
//!   }
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`affiliation`]: Affiliation classification rules and email extraction
//! - [`paper`]: Raw bibliographic records and the assembled results
//! - [`pipeline`]: The search, fetch and filter orchestration
//! - [`retriever`]: The [`retriever::PaperSource`] seam and the PubMed client
//! - [`report`]: Tabular report rows and CSV output
//! - [`configuration`]: Runtime configuration
//! - [`prelude`]: Common traits and types for ergonomic imports

#![warn(missing_docs)]

use std::{
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
  time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)] use tracing_test::traced_test;

pub mod affiliation;
pub mod configuration;
pub mod error;
pub mod paper;
pub mod pipeline;
pub mod report;
pub mod retriever;

pub use crate::{configuration::Config, pipeline::Finder};
use crate::{
  affiliation::{email::extract_email, AffiliationClassifier, Classification},
  error::*,
  paper::*,
  retriever::PaperSource,
};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use paperfind::prelude::*;
///
/// fn example(source: impl PaperSource) -> Result<(), FinderError> { Ok(()) }
/// ```
pub mod prelude {
  pub use crate::{
    error::FinderError,
    paper::{AuthorRecord, PaperResult, RawAuthor, RawRecord},
    retriever::PaperSource,
  };
}
