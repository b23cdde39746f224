use super::*;

/// A [`PaperSource`] serving a fixed corpus, with scripted fetch failures.
#[derive(Default)]
pub struct Scripted {
  pub corpus:    Vec<RawRecord>,
  /// Outcomes for successive fetches: `true` fails the fetch. Unscripted fetches succeed.
  pub failures:  Mutex<VecDeque<bool>>,
  pub searches:  Mutex<Vec<(String, usize)>>,
  pub fetches:   Mutex<Vec<Vec<String>>>,
  pub search_ok: bool,
}

impl Scripted {
  pub fn new(corpus: Vec<RawRecord>) -> Self {
    Self { corpus, search_ok: true, ..Default::default() }
  }

  pub fn failing_fetches(self, script: &[bool]) -> Self {
    *self.failures.lock().unwrap() = script.iter().copied().collect();
    self
  }

  pub fn failing_search(mut self) -> Self {
    self.search_ok = false;
    self
  }

  pub fn fetched_batches(&self) -> Vec<Vec<String>> { self.fetches.lock().unwrap().clone() }
}

#[async_trait]
impl PaperSource for Scripted {
  async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, FinderError> {
    self.searches.lock().unwrap().push((query.to_string(), limit));
    if !self.search_ok {
      return Err(FinderError::ApiError("search backend down".to_string()));
    }
    Ok(self.corpus.iter().take(limit).map(|record| record.paper_id.clone()).collect())
  }

  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>, FinderError> {
    self.fetches.lock().unwrap().push(ids.to_vec());
    if self.failures.lock().unwrap().pop_front().unwrap_or(false) {
      return Err(FinderError::ApiError(format!("fetch of {} IDs timed out", ids.len())));
    }
    Ok(self.corpus.iter().filter(|record| ids.contains(&record.paper_id)).cloned().collect())
  }
}

pub fn academic(paper_id: &str) -> RawRecord {
  RawRecord {
    paper_id:         paper_id.to_string(),
    title:            format!("Academic paper {paper_id}"),
    publication_date: PublicationDate::Year(2023),
    authors:          vec![
      RawAuthor::new("Ada Lovelace", Some("Department of Mathematics, University of London")),
      RawAuthor::new("Alan Turing", Some("University of Manchester. alan@manchester.ac.uk")),
    ],
  }
}

pub fn industry(paper_id: &str, company: &str) -> RawRecord {
  RawRecord {
    paper_id:         paper_id.to_string(),
    title:            format!("Industry paper {paper_id}"),
    publication_date: PublicationDate::YearMonth(2024, 2),
    authors:          vec![
      RawAuthor::new("Grace Hopper", Some(format!("{company}, Boston, MA, USA").as_str())),
      RawAuthor::new("Ada Lovelace", Some("Stanford University. ada@stanford.edu")),
    ],
  }
}

pub fn finder(source: Arc<Scripted>, config: Config) -> Finder<Arc<Scripted>> {
  Finder::new(config, source).unwrap()
}

pub fn ids(report: &RunReport) -> Vec<&str> {
  report.papers.iter().map(|paper| paper.paper_id.as_str()).collect()
}
