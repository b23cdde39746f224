//! PubMed source over the NCBI E-utilities.

use reqwest::{Client, StatusCode};

use super::*;

/// NCBI E-utilities search endpoint.
pub const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
/// NCBI E-utilities fetch endpoint.
pub const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

/// PubMed client over the NCBI E-utilities.
///
/// Transient failures (timeouts, refused connections, 5xx and 429 responses) are retried with
/// exponential backoff (1s, 2s, 4s, ...) up to the configured number of retries. Any other
/// failure is returned at once. Every request is followed by the configured pause to stay under
/// the NCBI rate limit.
#[derive(Debug, Clone)]
pub struct PubMed {
  client:        Client,
  api_key:       Option<String>,
  max_retries:   u32,
  request_delay: Duration,
  esearch_url:   String,
  efetch_url:    String,
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
  esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
  #[serde(default)]
  idlist: Vec<String>,
  #[serde(rename = "ERROR")]
  error:  Option<String>,
}

impl PubMed {
  /// Creates a client using the API key, retry and delay settings of `config`.
  pub fn new(config: &Config) -> Result<Self> {
    let client =
      Client::builder().user_agent(concat!("paperfind/", env!("CARGO_PKG_VERSION"))).build()?;
    Ok(Self {
      client,
      api_key: config.api_key.clone(),
      max_retries: config.max_retries,
      request_delay: config.request_delay(),
      esearch_url: ESEARCH_URL.to_string(),
      efetch_url: EFETCH_URL.to_string(),
    })
  }

  /// Points the client at another E-utilities host, e.g. a mirror.
  pub fn with_base_url(mut self, base_url: &str) -> Self {
    let base_url = base_url.trim_end_matches('/');
    self.esearch_url = format!("{base_url}/esearch.fcgi");
    self.efetch_url = format!("{base_url}/efetch.fcgi");
    self
  }

  fn params<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut params = vec![("db", "pubmed")];
    params.extend_from_slice(extra);
    if let Some(key) = &self.api_key {
      params.push(("api_key", key.as_str()));
    }
    params
  }

  async fn get(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut attempt = 0;
    loop {
      let outcome = self.send(url, params).await;
      tokio::time::sleep(self.request_delay).await;

      match outcome {
        Ok(body) => return Ok(body),
        Err(e) if attempt < self.max_retries && is_transient(&e) => {
          let backoff = Duration::from_secs(1 << attempt.min(6));
          warn!("Request to {url} failed (attempt {}): {e}, retrying in {backoff:?}", attempt + 1);
          tokio::time::sleep(backoff).await;
          attempt += 1;
        },
        Err(e) => return Err(e),
      }
    }
  }

  async fn send(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
    let response = self.client.get(url).query(params).send().await?.error_for_status()?;
    let body = response.text().await?;
    trace!("Response from {url}: {} bytes", body.len());
    Ok(body)
  }
}

/// Whether a failed request is worth repeating.
fn is_transient(error: &FinderError) -> bool {
  let FinderError::Network(error) = error else { return false };
  match error.status() {
    Some(status) => status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
    None => error.is_timeout() || error.is_connect(),
  }
}

#[async_trait]
impl PaperSource for PubMed {
  async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
    let retmax = limit.to_string();
    let params = self.params(&[
      ("term", query),
      ("retmax", retmax.as_str()),
      ("retmode", "json"),
      ("sort", "relevance"),
    ]);
    let body = self.get(&self.esearch_url, &params).await?;

    let response: ESearchResponse = serde_json::from_str(&body)?;
    if let Some(error) = response.esearchresult.error {
      return Err(FinderError::ApiError(error));
    }
    debug!("PubMed search returned {} IDs", response.esearchresult.idlist.len());
    Ok(response.esearchresult.idlist)
  }

  async fn fetch(&self, ids: &[String]) -> Result<Vec<RawRecord>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }
    let id = ids.join(",");
    let params = self.params(&[("id", id.as_str()), ("retmode", "xml")]);
    let body = self.get(&self.efetch_url, &params).await?;
    xml::parse_articles(&body)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    io::{Read, Write},
    net::TcpListener,
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
    },
  };

  use super::*;

  /// Serves `status` with an empty body to every connection, counting them.
  fn serve(status: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    std::thread::spawn(move || {
      for mut stream in listener.incoming().flatten() {
        counter.fetch_add(1, Ordering::SeqCst);
        let mut request = [0_u8; 4096];
        let _ = stream.read(&mut request);
        let _ = write!(
          stream,
          "HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
        );
      }
    });
    (format!("http://{address}/"), hits)
  }

  fn client(base_url: &str, max_retries: u32) -> PubMed {
    let config = Config::default().with_max_retries(max_retries).with_request_delay(Duration::ZERO);
    PubMed::new(&config).unwrap().with_base_url(base_url)
  }

  fn offline_client() -> PubMed {
    let config = Config::default().with_max_retries(0).with_request_delay(Duration::ZERO);
    // Nothing listens on the discard port.
    PubMed::new(&config).unwrap().with_base_url("http://127.0.0.1:9/")
  }

  #[test]
  fn test_base_url() {
    let pubmed = offline_client();
    assert_eq!(pubmed.esearch_url, "http://127.0.0.1:9/esearch.fcgi");
    assert_eq!(pubmed.efetch_url, "http://127.0.0.1:9/efetch.fcgi");
  }

  #[test]
  fn test_params_carry_api_key() {
    let pubmed = PubMed::new(&Config::default().with_api_key("k3y")).unwrap();
    let params = pubmed.params(&[("term", "cancer")]);
    assert_eq!(params, vec![("db", "pubmed"), ("term", "cancer"), ("api_key", "k3y")]);

    let pubmed = PubMed::new(&Config::default()).unwrap();
    assert!(!pubmed.params(&[]).iter().any(|(key, _)| *key == "api_key"));
  }

  #[test]
  fn test_esearch_response() {
    let body = r#"{"header":{"type":"esearch"},"esearchresult":{"count":"2","idlist":["2","1"]}}"#;
    let response: ESearchResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.esearchresult.idlist, vec!["2", "1"]);
    assert!(response.esearchresult.error.is_none());

    let body = r#"{"esearchresult":{"ERROR":"Invalid query"}}"#;
    let response: ESearchResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.esearchresult.error.as_deref(), Some("Invalid query"));
  }

  #[tokio::test]
  async fn test_fetch_nothing_skips_request() {
    assert!(offline_client().fetch(&[]).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_client_errors_are_not_retried() {
    let (base_url, hits) = serve("400 Bad Request");
    let started = std::time::Instant::now();
    let result = client(&base_url, 3).search("cancer", 10).await;
    assert!(matches!(result, Err(FinderError::Network(_))));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_secs(1));
  }

  #[tokio::test]
  async fn test_server_errors_and_rate_limits_are_retried() {
    for status in ["503 Service Unavailable", "429 Too Many Requests"] {
      let (base_url, hits) = serve(status);
      let result = client(&base_url, 1).fetch(&["1".to_string()]).await;
      assert!(matches!(result, Err(FinderError::Network(_))), "{status}");
      assert_eq!(hits.load(Ordering::SeqCst), 2, "{status}");
    }
  }

  #[tokio::test]
  async fn test_unreachable_host_is_network_error() {
    let result = offline_client().search("cancer", 10).await;
    assert!(matches!(result, Err(FinderError::Network(_))));
  }
}
