//! Affiliation classification: company or not, and which company.
//!
//! The [`AffiliationClassifier`] applies an immutable [`RuleSet`] to a single affiliation string.
//! It never fails; anything it cannot make sense of is treated as a non-company affiliation.
//!
//! # Algorithm
//!
//! 1. The text is split into clauses on `;`, one per listed affiliation. The first clause that
//!    yields a company decides the result.
//! 2. Email addresses are removed and the clause is split into comma separated segments. A
//!    segment holding only a legal suffix (`"Inc."`) is glued back onto the segment before it.
//! 3. If any exclusion rule matches the clause, only a segment carrying a legal-entity suffix
//!    and no exclusion term of its own can still name a company.
//! 4. Otherwise the leftmost segment with any inclusion match names the company.
//! 5. The company name starts after the last connector word ("of", "with", ...) that precedes
//!    the first inclusion match, or at the start of the segment when there is none. It ends at
//!    the segment boundary. Letter case never moves either end.
//!
//! # Examples
//!
//! ```
//! use paperfind::affiliation::AffiliationClassifier;
//!
//! let classifier = AffiliationClassifier::default();
//!
//! let result = classifier.classify(Some("Acme Pharmaceuticals Inc, Boston, MA"));
//! assert!(result.is_company);
//! assert_eq!(result.company_name.as_deref(), Some("Acme Pharmaceuticals Inc"));
//!
//! let result = classifier.classify(Some("Department of Biology, Stanford University"));
//! assert!(!result.is_company);
//! ```

use super::*;

pub mod email;
pub mod rules;

use self::email::strip_contact;
pub use self::rules::{Rule, RuleSet, Verdict};

lazy_static! {
  static ref WORD: Regex = Regex::new(r"\S+").unwrap();
  static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Outcome of classifying one affiliation string.
///
/// `company_name` is set exactly when `is_company` is true; use the constructors to keep it
/// that way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
  /// Whether the affiliation denotes a pharmaceutical or biotech company
  pub is_company:   bool,
  /// Normalized company name
  pub company_name: Option<String>,
}

impl Classification {
  /// A non-company classification.
  pub fn not_company() -> Self { Self::default() }

  /// A company classification with the given name.
  pub fn company(name: impl Into<String>) -> Self {
    Self { is_company: true, company_name: Some(name.into()) }
  }
}

/// Rule-driven affiliation classifier.
#[derive(Debug, Clone, Default)]
pub struct AffiliationClassifier {
  /// The rule table, fixed at construction
  rules: RuleSet,
}

impl AffiliationClassifier {
  /// Creates a classifier over the given rule table.
  pub fn new(rules: RuleSet) -> Self { Self { rules } }

  /// The rule table this classifier applies.
  pub fn rules(&self) -> &RuleSet { &self.rules }

  /// Classifies a single affiliation string.
  ///
  /// Missing, empty and whitespace-only input is not a company.
  pub fn classify(&self, affiliation: Option<&str>) -> Classification {
    let Some(text) = affiliation.map(str::trim).filter(|text| !text.is_empty()) else {
      return Classification::not_company();
    };

    match text.split(';').find_map(|clause| self.classify_clause(clause)) {
      Some(name) => {
        trace!("Classified {text:?} as company {name:?}");
        Classification::company(name)
      },
      None => Classification::not_company(),
    }
  }

  /// Returns the company named by one clause, if any.
  fn classify_clause(&self, clause: &str) -> Option<String> {
    let excluded = self.rules.excludes(clause);

    self.segments(&strip_contact(clause)).into_iter().find_map(|segment| {
      let names_company = if excluded {
        self.rules.matches(&segment, Verdict::LegalSuffix) && !self.rules.excludes(&segment)
      } else {
        self.rules.first_inclusion(&segment).is_some()
      };
      names_company.then(|| self.company_name(&segment))
    })
  }

  /// Splits a clause on commas, gluing bare legal suffixes onto the preceding segment.
  fn segments(&self, clause: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for part in clause.split(',').map(str::trim) {
      if !part.chars().any(char::is_alphanumeric) {
        continue;
      }
      match segments.last_mut() {
        Some(previous) if self.rules.is_bare_legal_suffix(part) => {
          previous.push_str(", ");
          previous.push_str(part);
        },
        _ => segments.push(part.to_string()),
      }
    }
    segments
  }

  /// Extracts the normalized company name from a company segment.
  fn company_name(&self, segment: &str) -> String {
    let anchored = self.rules.first_inclusion(segment).map_or(segment, |hit| {
      let start = WORD
        .find_iter(&segment[..hit])
        .filter(|word| self.rules.is_connector(word.as_str()))
        .last()
        .map_or(0, |word| word.end());
      segment[start..].trim_start()
    });

    normalize_name(if anchored.is_empty() { segment } else { anchored })
  }
}

/// Collapses whitespace and drops a trailing period unless it closes a dotted abbreviation.
fn normalize_name(name: &str) -> String {
  let collapsed = WHITESPACE.replace_all(name.trim(), " ");
  let trimmed = collapsed.trim_end_matches([';', ':']).trim_end();
  match trimmed.strip_suffix('.') {
    Some(rest) if !is_dotted_abbreviation(rest) => rest.trim_end().to_string(),
    _ => trimmed.to_string(),
  }
}

/// Whether `text` ends like `"S.A"`, i.e. a letter directly after a period.
fn is_dotted_abbreviation(text: &str) -> bool {
  let mut chars = text.chars().rev();
  chars.next().is_some_and(char::is_alphabetic) && chars.next() == Some('.')
}
