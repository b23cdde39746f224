//! Tabular report rows and CSV output.
//!
//! Each qualifying paper becomes one [`ReportRow`]. Multi-valued cells are joined with `"; "`
//! and missing values are rendered as [`NOT_AVAILABLE`], so every cell is non-empty.

use std::io::Write;

use super::*;

/// Placeholder for a missing value.
pub const NOT_AVAILABLE: &str = "N/A";

/// Separator for multi-valued cells.
pub const SEPARATOR: &str = "; ";

/// One paper flattened into report columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
  /// PubMed identifier
  #[serde(rename = "PubmedID")]
  pub paper_id:         String,
  /// Article title
  #[serde(rename = "Title")]
  pub title:            String,
  /// Publication date
  #[serde(rename = "Publication Date")]
  pub publication_date: String,
  /// Company-affiliated authors
  #[serde(rename = "Non-academic Author(s)")]
  pub authors:          String,
  /// Distinct companies
  #[serde(rename = "Company Affiliation(s)")]
  pub companies:        String,
  /// Corresponding author email
  #[serde(rename = "Corresponding Author Email")]
  pub email:            String,
}

/// Column headers, in output order.
pub const HEADERS: [&str; 6] = [
  "PubmedID",
  "Title",
  "Publication Date",
  "Non-academic Author(s)",
  "Company Affiliation(s)",
  "Corresponding Author Email",
];

fn or_not_available(value: impl Into<String>) -> String {
  let value = value.into();
  if value.trim().is_empty() {
    NOT_AVAILABLE.to_string()
  } else {
    value
  }
}

impl From<&PaperResult> for ReportRow {
  fn from(paper: &PaperResult) -> Self {
    Self {
      paper_id:         or_not_available(paper.paper_id.as_str()),
      title:            or_not_available(paper.title.as_str()),
      publication_date: or_not_available(paper.publication_date.to_string()),
      authors:          or_not_available(paper.author_names().join(SEPARATOR)),
      companies:        or_not_available(paper.companies.join(SEPARATOR)),
      email:            or_not_available(
        paper.corresponding_author_email.as_deref().unwrap_or_default(),
      ),
    }
  }
}

/// Writes `papers` as CSV with a header row, even when there are no papers.
pub fn write_csv<W: Write>(writer: W, papers: &[PaperResult]) -> Result<()> {
  let mut rows = csv::Writer::from_writer(writer);
  if papers.is_empty() {
    rows.write_record(HEADERS)?;
  }
  for paper in papers {
    rows.serialize(ReportRow::from(paper))?;
  }
  rows.flush()?;
  debug!("Wrote {} report rows", papers.len());
  Ok(())
}

/// Writes `papers` as CSV to the file at `path`, replacing it if it exists.
pub fn write_csv_file(path: impl AsRef<Path>, papers: &[PaperResult]) -> Result<()> {
  let path = path.as_ref();
  let file = std::fs::File::create(path)?;
  write_csv(std::io::BufWriter::new(file), papers)?;
  info!("Saved {} papers to {}", papers.len(), path.display());
  Ok(())
}
