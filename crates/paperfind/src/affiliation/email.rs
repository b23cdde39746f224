//! Syntactic email extraction from affiliation text.

use super::*;

lazy_static! {
  /// Standard email address shape, nothing more.
  pub(crate) static ref EMAIL: Regex = Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap();
  /// PubMed's lead-in for author emails inside affiliation strings.
  pub(crate) static ref ELECTRONIC_ADDRESS: Regex =
    Regex::new(r"(?i)electronic\s+address\s*:?").unwrap();
}

/// Returns the first email address found in `text`.
///
/// Trailing sentence punctuation that the pattern swallows (PubMed affiliations usually end
/// with `"... Electronic address: jane@acme.com."`) is removed. A candidate whose domain loses
/// its last dot to that trimming is not an address and is skipped. Deliverability is not
/// checked.
///
/// # Examples
///
/// ```
/// use paperfind::affiliation::email::extract_email;
///
/// let text = "Acme Inc, Boston, MA, USA. Electronic address: jane@acme.com.";
/// assert_eq!(extract_email(text).as_deref(), Some("jane@acme.com"));
/// assert_eq!(extract_email("Acme Inc, Boston"), None);
/// ```
pub fn extract_email(text: &str) -> Option<String> {
  EMAIL
    .find_iter(text)
    .map(|found| found.as_str().trim_end_matches(['.', '-']))
    .find(|email| email.split_once('@').is_some_and(|(_, domain)| domain.contains('.')))
    .map(str::to_string)
}

/// Removes email addresses and their PubMed lead-in from `text`.
pub(crate) fn strip_contact(text: &str) -> String {
  let without_emails = EMAIL.replace_all(text, "");
  ELECTRONIC_ADDRESS.replace_all(&without_emails, "").into_owned()
}
