//! Bibliographic records as fetched, and papers as reported.
//!
//! A [`RawRecord`] is what a [`PaperSource`] hands back for one paper. It is turned into a
//! [`PaperResult`] by [`PaperResult::assemble`], which is also where the filtering decision of
//! the whole crate lives: a paper without a company-affiliated author produces no result.
//!
//! # Examples
//!
//! ```
//! use paperfind::{
//!   affiliation::AffiliationClassifier,
//!   paper::{PaperResult, PublicationDate, RawAuthor, RawRecord},
//! };
//!
//! let record = RawRecord {
//!   paper_id:         "38012345".to_string(),
//!   title:            "Checkpoint inhibitors in practice".to_string(),
//!   publication_date: PublicationDate::Year(2023),
//!   authors:          vec![
//!     RawAuthor::new("Jane Doe", Some("Acme Therapeutics Inc, Boston, MA")),
//!     RawAuthor::new("John Roe", Some("Stanford University. john@stanford.edu")),
//!   ],
//! };
//!
//! let paper = PaperResult::assemble(&record, &AffiliationClassifier::default()).unwrap();
//! assert_eq!(paper.companies, vec!["Acme Therapeutics Inc"]);
//! assert_eq!(paper.corresponding_author_email.as_deref(), Some("john@stanford.edu"));
//! ```

use chrono::{Datelike, Month};

use super::*;

/// An author entry exactly as fetched: a name and the affiliation text, if any.
///
/// Several affiliations for one author are joined with `"; "` into a single text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAuthor {
  /// Display name, e.g. "Jane Doe"
  pub name:        String,
  /// Free-text institutional description
  pub affiliation: Option<String>,
}

impl RawAuthor {
  /// Creates a raw author from a name and optional affiliation text.
  pub fn new(name: impl Into<String>, affiliation: Option<&str>) -> Self {
    Self { name: name.into(), affiliation: affiliation.map(str::to_string) }
  }
}

/// One fetched paper before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
  /// Source identifier (the PubMed ID)
  pub paper_id:         String,
  /// Article title, empty when the source had none
  pub title:            String,
  /// Publication date, possibly partial
  pub publication_date: PublicationDate,
  /// Authors in byline order
  pub authors:          Vec<RawAuthor>,
}

/// A publication date as precise as the source provides it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublicationDate {
  /// No date available
  #[default]
  Unknown,
  /// Year only
  Year(i32),
  /// Year and month (1-12)
  YearMonth(i32, u32),
  /// A full calendar date
  Day(NaiveDate),
  /// Free text that could not be structured, e.g. "2023 Jan-Feb"
  Text(String),
}

impl PublicationDate {
  /// Builds the most precise date the given parts allow.
  ///
  /// Months may be numeric ("03") or names ("Mar", "March"). Parts that do not parse are
  /// dropped rather than rejected, so `("2023", "Spring", None)` becomes `Year(2023)`.
  ///
  /// ```
  /// use paperfind::paper::PublicationDate;
  ///
  /// assert_eq!(PublicationDate::from_parts(Some("2023"), Some("Mar"), None).to_string(), "2023-03");
  /// assert_eq!(
  ///   PublicationDate::from_parts(Some("2023"), Some("3"), Some("7")).to_string(),
  ///   "2023-03-07"
  /// );
  /// ```
  pub fn from_parts(year: Option<&str>, month: Option<&str>, day: Option<&str>) -> Self {
    let Some(year) = year.and_then(|y| y.trim().parse::<i32>().ok()) else {
      return Self::Unknown;
    };
    let Some(month) = month.and_then(parse_month) else {
      return Self::Year(year);
    };
    day
      .and_then(|d| d.trim().parse::<u32>().ok())
      .and_then(|d| NaiveDate::from_ymd_opt(year, month, d))
      .map_or(Self::YearMonth(year, month), Self::Day)
  }

  /// The year, when known.
  pub fn year(&self) -> Option<i32> {
    match self {
      Self::Year(year) | Self::YearMonth(year, _) => Some(*year),
      Self::Day(date) => Some(date.year()),
      Self::Unknown | Self::Text(_) => None,
    }
  }

  /// Whether no date is available.
  pub fn is_unknown(&self) -> bool {
    match self {
      Self::Unknown => true,
      Self::Text(text) => text.trim().is_empty(),
      _ => false,
    }
  }
}

impl Display for PublicationDate {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Unknown => Ok(()),
      Self::Year(year) => write!(f, "{year:04}"),
      Self::YearMonth(year, month) => write!(f, "{year:04}-{month:02}"),
      Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
      Self::Text(text) => write!(f, "{text}"),
    }
  }
}

/// Parses a numeric or named month.
fn parse_month(month: &str) -> Option<u32> {
  let month = month.trim();
  match month.parse::<u32>() {
    Ok(number) => (1..=12).contains(&number).then_some(number),
    Err(_) => Month::from_str(month).ok().map(|m| m.number_from_month()),
  }
}

/// An author after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
  /// Display name
  pub name:                  String,
  /// Whether the affiliation denotes a pharmaceutical or biotech company
  pub is_company_affiliated: bool,
  /// Company name, present exactly when `is_company_affiliated` is true
  pub company_name:          Option<String>,
  /// First email address in the affiliation text
  pub email:                 Option<String>,
}

impl AuthorRecord {
  /// Classifies a raw author and extracts their email from the same affiliation text.
  pub fn build(raw: &RawAuthor, classifier: &AffiliationClassifier) -> Self {
    let affiliation = raw.affiliation.as_deref();
    let Classification { is_company, company_name } = classifier.classify(affiliation);
    Self {
      name: raw.name.clone(),
      is_company_affiliated: is_company,
      company_name,
      email: affiliation.and_then(extract_email),
    }
  }
}

/// A qualifying paper: at least one author is company-affiliated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperResult {
  /// Source identifier (the PubMed ID)
  pub paper_id:                   String,
  /// Article title, empty when the source had none
  pub title:                      String,
  /// Publication date, possibly partial
  pub publication_date:           PublicationDate,
  /// Company-affiliated authors in byline order, never empty
  pub qualifying_authors:         Vec<AuthorRecord>,
  /// Distinct company names in first-seen order
  pub companies:                  Vec<String>,
  /// First email found scanning every author in byline order
  pub corresponding_author_email: Option<String>,
}

impl PaperResult {
  /// Classifies every author of `raw` and assembles a result if any is company-affiliated.
  ///
  /// Returns `None` when no author qualifies. Company names are deduplicated
  /// case-insensitively, keeping the casing seen first. The corresponding author email is
  /// taken from all authors, not only the qualifying ones, since the contact author is often
  /// an academic.
  pub fn assemble(raw: &RawRecord, classifier: &AffiliationClassifier) -> Option<Self> {
    let authors: Vec<AuthorRecord> =
      raw.authors.iter().map(|author| AuthorRecord::build(author, classifier)).collect();

    let corresponding_author_email = authors.iter().find_map(|author| author.email.clone());

    let qualifying_authors: Vec<AuthorRecord> =
      authors.into_iter().filter(|author| author.is_company_affiliated).collect();
    if qualifying_authors.is_empty() {
      return None;
    }

    let mut companies: Vec<String> = Vec::new();
    for name in qualifying_authors.iter().filter_map(|author| author.company_name.as_deref()) {
      if !companies.iter().any(|seen| seen.to_lowercase() == name.to_lowercase()) {
        companies.push(name.to_string());
      }
    }

    Some(Self {
      paper_id: raw.paper_id.clone(),
      title: raw.title.clone(),
      publication_date: raw.publication_date.clone(),
      qualifying_authors,
      companies,
      corresponding_author_email,
    })
  }

  /// Names of the qualifying authors, in byline order.
  pub fn author_names(&self) -> Vec<&str> {
    self.qualifying_authors.iter().map(|author| author.name.as_str()).collect()
  }
}
