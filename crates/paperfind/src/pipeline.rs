//! Search, fetch and filter orchestration.
//!
//! A run is a single pass: search once, then walk the resulting IDs in batches of
//! [`Config::batch_size`], fetching one batch at a time and keeping the papers that have a
//! company-affiliated author. Batches are produced lazily by [`Finder::batches`], so nothing is
//! fetched before the previous batch has been classified.
//!
//! A batch that fails to fetch does not fail the run under the default
//! [`FetchFailurePolicy::Skip`]; it is logged and reported in [`RunReport::failures`].

use std::pin::pin;

use futures::{stream, Stream, StreamExt};

use super::*;
use crate::{configuration::FetchFailurePolicy, retriever::PubMed};

/// Longest accepted query, in characters.
pub const MAX_QUERY_LENGTH: usize = 1000;

/// The search pipeline over a [`PaperSource`].
#[derive(Debug)]
pub struct Finder<S = PubMed> {
  source:     S,
  classifier: AffiliationClassifier,
  config:     Config,
}

/// One fetched batch, as yielded by [`Finder::batches`].
#[derive(Debug)]
pub struct Batch<'a> {
  /// Zero-based position of the batch in the run
  pub index:   usize,
  /// IDs requested in this batch
  pub ids:     &'a [String],
  /// Records returned, or why fetching failed
  pub records: Result<Vec<RawRecord>>,
}

/// A batch that could not be fetched and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
  /// Zero-based position of the batch in the run
  pub index: usize,
  /// IDs that were requested
  pub ids:   Vec<String>,
  /// Rendered error
  pub error: String,
}

/// Outcome of a [`Finder::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
  /// Qualifying papers in search order
  pub papers:   Vec<PaperResult>,
  /// Batches skipped because fetching failed
  pub failures: Vec<BatchFailure>,
  /// Number of IDs the search produced, after truncation
  pub searched: usize,
  /// Number of records fetched successfully
  pub fetched:  usize,
}

impl RunReport {
  /// Whether every batch was fetched.
  pub fn is_complete(&self) -> bool { self.failures.is_empty() }

  /// Number of IDs in skipped batches.
  pub fn skipped(&self) -> usize { self.failures.iter().map(|failure| failure.ids.len()).sum() }
}

/// Checks a query and returns it trimmed.
///
/// ```
/// use paperfind::pipeline::validate_query;
///
/// assert_eq!(validate_query("  cancer  ").unwrap(), "cancer");
/// assert!(validate_query("   ").is_err());
/// ```
pub fn validate_query(query: &str) -> Result<&str> {
  let query = query.trim();
  if query.is_empty() {
    return Err(FinderError::InvalidQuery("query must not be empty".to_string()));
  }
  let length = query.chars().count();
  if length > MAX_QUERY_LENGTH {
    return Err(FinderError::InvalidQuery(format!(
      "query is {length} characters long, the maximum is {MAX_QUERY_LENGTH}"
    )));
  }
  Ok(query)
}

impl Finder<PubMed> {
  /// Creates a finder searching PubMed with the given configuration.
  pub fn from_config(config: Config) -> Result<Self> {
    let source = PubMed::new(&config)?;
    Self::new(config, source)
  }
}

impl<S: PaperSource> Finder<S> {
  /// Creates a finder over `source`, with the classifier described by `config`.
  ///
  /// # Errors
  ///
  /// Fails when the configured rule table cannot be loaded, or the batch size is zero.
  pub fn new(config: Config, source: S) -> Result<Self> {
    if config.batch_size == 0 {
      return Err(FinderError::Config("batch_size must be at least 1".to_string()));
    }
    let classifier = config.classifier()?;
    Ok(Self { source, classifier, config })
  }

  /// Replaces the affiliation classifier.
  pub fn with_classifier(mut self, classifier: AffiliationClassifier) -> Self {
    self.classifier = classifier;
    self
  }

  /// The underlying paper source.
  pub fn source(&self) -> &S { &self.source }

  /// The affiliation classifier in use.
  pub fn classifier(&self) -> &AffiliationClassifier { &self.classifier }

  /// The configuration in use.
  pub fn config(&self) -> &Config { &self.config }

  /// Lazily fetches `ids` in batches, one batch per poll.
  pub fn batches<'a>(&'a self, ids: &'a [String]) -> impl Stream<Item = Batch<'a>> + 'a {
    stream::iter(ids.chunks(self.config.batch_size).enumerate()).then(move |(index, chunk)| {
      async move {
        debug!("Fetching batch {index} ({} IDs)", chunk.len());
        let records = self.source.fetch(chunk).await;
        Batch { index, ids: chunk, records }
      }
    })
  }

  /// Searches for `query` and returns the papers with at least one company-affiliated author.
  ///
  /// At most `max_results` IDs are considered when given. Papers keep the order the search
  /// returned them in.
  ///
  /// # Errors
  ///
  /// - [`FinderError::InvalidQuery`] for an empty or overlong query
  /// - [`FinderError::InvalidMaxResults`] for `Some(0)`
  /// - any error from the search itself
  /// - any batch error, under [`FetchFailurePolicy::Abort`]
  pub async fn run(&self, query: &str, max_results: Option<usize>) -> Result<RunReport> {
    let query = validate_query(query)?;
    if max_results == Some(0) {
      return Err(FinderError::InvalidMaxResults);
    }

    let limit = max_results.unwrap_or(self.config.search_limit);
    info!("Searching for {query:?} (up to {limit} papers)");
    let mut ids = self.source.search(query, limit).await?;
    if let Some(max) = max_results {
      ids.truncate(max);
    }

    let mut report = RunReport { searched: ids.len(), ..Default::default() };
    let mut batches = pin!(self.batches(&ids));
    while let Some(Batch { index, ids: chunk, records }) = batches.next().await {
      match records {
        Ok(mut records) => {
          report.fetched += records.len();
          records.sort_by_key(|record| {
            chunk.iter().position(|id| *id == record.paper_id).unwrap_or(usize::MAX)
          });
          report.papers.extend(records.iter().filter_map(|record| self.assemble(record)));
        },
        Err(e) if self.config.on_fetch_error == FetchFailurePolicy::Skip => {
          warn!("Skipping batch {index} ({} IDs): {e}", chunk.len());
          report.failures.push(BatchFailure { index, ids: chunk.to_vec(), error: e.to_string() });
        },
        Err(e) => return Err(e),
      }
    }

    info!(
      "Found {} qualifying papers among {} fetched ({} skipped)",
      report.papers.len(),
      report.fetched,
      report.skipped()
    );
    Ok(report)
  }

  fn assemble(&self, record: &RawRecord) -> Option<PaperResult> {
    if record.title.trim().is_empty() {
      warn!("Paper {} has no title", record.paper_id);
    }
    if record.publication_date.is_unknown() {
      debug!("Paper {} has no publication date", record.paper_id);
    }
    PaperResult::assemble(record, &self.classifier)
  }
}
