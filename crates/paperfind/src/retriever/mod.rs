//! Sources of bibliographic records.
//!
//! The pipeline only talks to a [`PaperSource`]: something that can turn a query into an
//! ordered list of paper IDs, and a list of IDs into raw records. [`PubMed`] is the production
//! implementation over the NCBI E-utilities; tests substitute their own.
//!
//! # Examples
//!
//! ```no_run
//! use paperfind::{retriever::{PaperSource, PubMed}, Config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pubmed = PubMed::new(&Config::default())?;
//! let ids = pubmed.search("crispr off-target", 20).await?;
//! let records = pubmed.fetch(&ids).await?;
//! println!("Fetched {} of {} records", records.len(), ids.len());
//! # Ok(())
//! # }
//! ```

use super::*;

mod pubmed;
mod xml;

pub use self::pubmed::{PubMed, EFETCH_URL, ESEARCH_URL};

/// A searchable store of papers.
#[async_trait]
pub trait PaperSource: Send + Sync {
  /// Returns the IDs of at most `limit` papers matching `query`, most relevant first.
  async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;

  /// Returns the raw records for `ids`.
  ///
  /// Records come back in source order; IDs the source does not know are silently missing.
  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>>;
}

#[async_trait]
impl<S: PaperSource + ?Sized> PaperSource for std::sync::Arc<S> {
  async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
    (**self).search(query, limit).await
  }

  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>> { (**self).fetch(ids).await }
}
