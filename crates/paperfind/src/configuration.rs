//! Runtime configuration for a paper search.
//!
//! Configuration is plain TOML deserialized into [`Config`]. Every field has a default, so an
//! empty file (or no file at all) is a valid configuration:
//!
//! ```toml
//! api_key = "0123456789abcdef"
//! batch_size = 100
//! request_delay_ms = 500
//! max_retries = 3
//! search_limit = 10000
//! on_fetch_error = "skip"
//! rules_path = "/home/me/.config/paperfind/rules.toml"
//! ```

use super::*;

/// What to do when fetching a batch of records fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFailurePolicy {
  /// Log the failure, record it in the run report and carry on with the next batch.
  #[default]
  Skip,
  /// Stop the run and return the error.
  Abort,
}

/// Settings for the search pipeline and the PubMed client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// NCBI API key, raising the request rate limit when present
  pub api_key:          Option<String>,
  /// Number of IDs fetched per request
  pub batch_size:       usize,
  /// Pause after every request, in milliseconds
  pub request_delay_ms: u64,
  /// Retries for a failing request before giving up
  pub max_retries:      u32,
  /// Number of IDs requested from search when no maximum is given
  pub search_limit:     usize,
  /// Behavior on a failing batch
  pub on_fetch_error:   FetchFailurePolicy,
  /// Optional replacement affiliation rule table
  pub rules_path:       Option<PathBuf>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_key:          None,
      batch_size:       100,
      request_delay_ms: 500,
      max_retries:      3,
      search_limit:     10_000,
      on_fetch_error:   FetchFailurePolicy::Skip,
      rules_path:       None,
    }
  }
}

impl Config {
  /// Returns the default location of the configuration file.
  ///
  /// ```
  /// let path = paperfind::Config::default_path();
  /// assert!(path.ends_with("paperfind/config.toml"));
  /// ```
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("paperfind").join("config.toml")
  }

  /// Parses a configuration from a TOML string.
  pub fn from_toml_str(toml_str: &str) -> Result<Self> {
    let config: Self = toml::from_str(toml_str)?;
    config.validate()
  }

  /// Reads a configuration file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Loads the configuration at `path`, or at [`Config::default_path`] when `None`.
  ///
  /// A missing default file yields the defaults; a missing explicit file is an error.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    match path {
      Some(path) => Self::from_file(path),
      None => {
        let path = Self::default_path();
        if path.exists() {
          Self::from_file(path)
        } else {
          trace!("No configuration at {}, using defaults", path.display());
          Ok(Self::default())
        }
      },
    }
  }

  /// Sets the NCBI API key.
  pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
    self.api_key = Some(api_key.into());
    self
  }

  /// Sets the number of IDs fetched per request.
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size;
    self
  }

  /// Sets the pause after every request.
  pub fn with_request_delay(mut self, delay: Duration) -> Self {
    self.request_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
    self
  }

  /// Sets the number of retries per request.
  pub fn with_max_retries(mut self, max_retries: u32) -> Self {
    self.max_retries = max_retries;
    self
  }

  /// Sets the behavior on a failing batch.
  pub fn with_fetch_failure_policy(mut self, policy: FetchFailurePolicy) -> Self {
    self.on_fetch_error = policy;
    self
  }

  /// Sets a replacement affiliation rule table.
  pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.rules_path = Some(path.into());
    self
  }

  /// The pause after every request.
  pub fn request_delay(&self) -> Duration { Duration::from_millis(self.request_delay_ms) }

  /// Builds the affiliation classifier this configuration describes.
  pub fn classifier(&self) -> Result<AffiliationClassifier> {
    let rules = match &self.rules_path {
      Some(path) => affiliation::RuleSet::from_file(path)?,
      None => affiliation::RuleSet::default(),
    };
    Ok(AffiliationClassifier::new(rules))
  }

  fn validate(self) -> Result<Self> {
    if self.batch_size == 0 {
      return Err(FinderError::Config("batch_size must be at least 1".to_string()));
    }
    if self.search_limit == 0 {
      return Err(FinderError::Config("search_limit must be at least 1".to_string()));
    }
    Ok(self)
  }
}
