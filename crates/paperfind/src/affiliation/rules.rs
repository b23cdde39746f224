//! Data tables driving affiliation classification.
//!
//! A [`RuleSet`] is an ordered list of `pattern → verdict` entries. The built-in table lives in
//! `config/rules.toml` and can be replaced wholesale with a user supplied file of the same
//! shape:
//!
//! ```toml
//! [[rules]]
//! pattern = '\buniversi'
//! verdict = "exclude"
//!
//! [[rules]]
//! pattern = '\binc\b'
//! verdict = "legal_suffix"
//! ```
//!
//! Patterns are regular expressions compiled case-insensitively.
//!
//! A table may also list `connectors`, the words that join a department or division to the
//! company it belongs to ("Research Division *of* Pfizer Inc"). Tables without the key use
//! [`DEFAULT_CONNECTORS`].

use regex::RegexBuilder;

use super::*;

/// The built-in rule table shipped with the crate.
pub const DEFAULT_RULES: &str = include_str!("../../config/rules.toml");

/// Words after which a company name may start, compared case-insensitively.
pub const DEFAULT_CONNECTORS: &[&str] =
  &["of", "with", "and", "at", "for", "in", "from", "by", "to", "via", "within"];

lazy_static! {
  static ref BUILTIN: RuleSet =
    RuleSet::from_toml_str(DEFAULT_RULES).expect("built-in rule table must parse");
}

/// What a matching pattern says about an affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  /// Academic, government or hospital indicator.
  Exclude,
  /// Corporate legal-entity suffix such as "Inc" or "GmbH".
  LegalSuffix,
  /// Industry descriptor such as "Pharmaceuticals" or "Therapeutics".
  IndustryTerm,
  /// Fragment of a curated company name such as "Pfizer".
  KnownCompany,
}

impl Verdict {
  /// Whether this verdict is evidence for a company affiliation.
  pub fn is_inclusion(self) -> bool { !matches!(self, Self::Exclude) }
}

/// A single `pattern → verdict` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
  /// Case-insensitive pattern matched against affiliation text
  #[serde(deserialize_with = "deserialize_pattern")]
  pub pattern: Regex,
  /// What a match means
  pub verdict: Verdict,
}

impl Rule {
  /// Compiles `pattern` case-insensitively into a rule.
  ///
  /// # Errors
  ///
  /// Returns [`FinderError::Regex`] when the pattern is not a valid regular expression.
  pub fn new(pattern: &str, verdict: Verdict) -> Result<Self> {
    Ok(Self { pattern: compile(pattern)?, verdict })
  }
}

/// An immutable table of classification rules.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSet {
  /// Rules in table order
  rules:      Vec<Rule>,
  /// Words a company name never starts with
  #[serde(default = "default_connectors")]
  connectors: Vec<String>,
}

impl Default for RuleSet {
  fn default() -> Self { BUILTIN.clone() }
}

impl RuleSet {
  /// Creates a rule set from explicit rules.
  pub fn new(rules: Vec<Rule>) -> Self { Self { rules, connectors: default_connectors() } }

  /// Parses a rule table from a TOML string.
  ///
  /// # Errors
  ///
  /// Returns [`FinderError::TomlDe`] for malformed TOML, unknown verdicts or invalid
  /// patterns.
  pub fn from_toml_str(toml_str: &str) -> Result<Self> { Ok(toml::from_str(toml_str)?) }

  /// Reads a rule table from a TOML file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    debug!("Loading affiliation rules from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  /// Returns a copy of this rule set with one more rule appended.
  pub fn with_rule(mut self, pattern: &str, verdict: Verdict) -> Result<Self> {
    self.rules.push(Rule::new(pattern, verdict)?);
    Ok(self)
  }

  /// Returns a copy of this rule set with the given connector words.
  pub fn with_connectors<I, S>(mut self, connectors: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>, {
    self.connectors = connectors.into_iter().map(Into::into).collect();
    self
  }

  /// The rules in table order.
  pub fn rules(&self) -> &[Rule] { &self.rules }

  /// The connector words, as listed.
  pub fn connectors(&self) -> &[String] { &self.connectors }

  /// Whether `word` is a connector, ignoring case and surrounding punctuation.
  pub fn is_connector(&self, word: &str) -> bool {
    let word = word.trim_matches(|c: char| !c.is_alphanumeric());
    !word.is_empty() && self.connectors.iter().any(|connector| connector.eq_ignore_ascii_case(word))
  }

  /// Number of rules carrying `verdict`.
  pub fn count(&self, verdict: Verdict) -> usize {
    self.rules.iter().filter(|rule| rule.verdict == verdict).count()
  }

  /// Whether any exclusion rule matches `text`.
  pub fn excludes(&self, text: &str) -> bool { self.matches(text, Verdict::Exclude) }

  /// Whether any rule with the given verdict matches `text`.
  pub fn matches(&self, text: &str, verdict: Verdict) -> bool {
    self.rules.iter().any(|rule| rule.verdict == verdict && rule.pattern.is_match(text))
  }

  /// Byte offset of the leftmost inclusion match in `text`, if any.
  pub fn first_inclusion(&self, text: &str) -> Option<usize> {
    self
      .rules
      .iter()
      .filter(|rule| rule.verdict.is_inclusion())
      .filter_map(|rule| rule.pattern.find(text))
      .map(|found| found.start())
      .min()
  }

  /// Whether `segment` consists of nothing but a legal-entity suffix, like `"Inc."`.
  pub fn is_bare_legal_suffix(&self, segment: &str) -> bool {
    let segment = segment.trim().trim_end_matches('.');
    !segment.is_empty()
      && self.rules.iter().filter(|rule| rule.verdict == Verdict::LegalSuffix).any(|rule| {
        rule.pattern.find(segment).is_some_and(|found| {
          segment[..found.start()].trim().is_empty()
            && segment[found.end()..].trim_matches(|c: char| c == '.' || c.is_whitespace()).is_empty()
        })
      })
  }
}

fn default_connectors() -> Vec<String> {
  DEFAULT_CONNECTORS.iter().map(|connector| connector.to_string()).collect()
}

/// Compiles a rule pattern case-insensitively.
fn compile(pattern: &str) -> Result<Regex> {
  Ok(RegexBuilder::new(pattern).case_insensitive(true).build()?)
}

/// Custom deserializer turning rule table strings into case-insensitive [`Regex`]es.
fn deserialize_pattern<'de, D>(deserializer: D) -> std::result::Result<Regex, D::Error>
where D: serde::Deserializer<'de> {
  let s: String = String::deserialize(deserializer)?;
  compile(&s).map_err(serde::de::Error::custom)
}
