//! PubMed `efetch` XML parsing.

use quick_xml::{events::Event, Reader};

use super::*;

/// Parses a `PubmedArticleSet` document into raw records, in document order.
///
/// Articles without a PMID are dropped. Inline markup inside titles and affiliations
/// (`<i>`, `<sup>`, ...) is flattened into its text.
pub(crate) fn parse_articles(xml: &str) -> Result<Vec<RawRecord>> {
  let mut reader = Reader::from_str(xml);
  let mut path_stack: Vec<String> = Vec::new();
  let mut records = Vec::new();
  let mut article: Option<ArticleBuilder> = None;
  let mut buf = Vec::new();

  loop {
    match reader.read_event_into(&mut buf)? {
      Event::Start(e) => {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        match name.as_str() {
          "PubmedArticle" => article = Some(ArticleBuilder::default()),
          "Author" if parent_is(&path_stack, "AuthorList") =>
            if let Some(article) = article.as_mut() {
              article.author = Some(AuthorBuilder::default());
            },
          "Affiliation" =>
            if let Some(author) = article.as_mut().and_then(|a| a.author.as_mut()) {
              author.affiliations.push(String::new());
            },
          _ => (),
        }
        path_stack.push(name);
      },
      Event::Text(e) => {
        let text = e.unescape().map_err(quick_xml::Error::from)?;
        if let Some(article) = article.as_mut() {
          article.push_text(&path_stack, &text);
        }
      },
      Event::CData(e) => {
        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
        if let Some(article) = article.as_mut() {
          article.push_text(&path_stack, &text);
        }
      },
      Event::End(_) => {
        let name = path_stack.pop().unwrap_or_default();
        match name.as_str() {
          "Author" =>
            if let Some(article) = article.as_mut() {
              article.finish_author();
            },
          "PubmedArticle" =>
            if let Some(record) = article.take().and_then(ArticleBuilder::build) {
              records.push(record);
            },
          _ => (),
        }
      },
      Event::Eof => break,
      _ => (),
    }
    buf.clear();
  }

  trace!("Parsed {} PubMed articles", records.len());
  Ok(records)
}

/// Whether the innermost open element is `name`.
fn parent_is(path_stack: &[String], name: &str) -> bool {
  path_stack.last().is_some_and(|last| last == name)
}

/// Whether any open element is `name`.
fn within(path_stack: &[String], name: &str) -> bool {
  path_stack.iter().any(|element| element == name)
}

/// Collapses runs of whitespace into single spaces.
fn collapse(text: &str) -> String { text.split_whitespace().collect::<Vec<_>>().join(" ") }

#[derive(Debug, Default)]
struct ArticleBuilder {
  pmid:         Option<String>,
  title:        String,
  year:         Option<String>,
  month:        Option<String>,
  day:          Option<String>,
  medline_date: Option<String>,
  authors:      Vec<RawAuthor>,
  author:       Option<AuthorBuilder>,
}

#[derive(Debug, Default)]
struct AuthorBuilder {
  last_name:       String,
  fore_name:       String,
  initials:        String,
  collective_name: String,
  affiliations:    Vec<String>,
}

impl ArticleBuilder {
  fn push_text(&mut self, path_stack: &[String], text: &str) {
    let Some(element) = path_stack.last() else { return };

    if let Some(author) = self.author.as_mut() {
      if within(path_stack, "Affiliation") {
        if let Some(affiliation) = author.affiliations.last_mut() {
          affiliation.push_str(text);
        }
        return;
      }
      match element.as_str() {
        "LastName" => author.last_name.push_str(text),
        "ForeName" => author.fore_name.push_str(text),
        "Initials" => author.initials.push_str(text),
        "CollectiveName" => author.collective_name.push_str(text),
        _ => (),
      }
      return;
    }

    if within(path_stack, "ArticleTitle") {
      self.title.push_str(text);
      return;
    }

    let parent = path_stack.len().checked_sub(2).map(|index| path_stack[index].as_str());
    if element == "PMID" && parent == Some("MedlineCitation") {
      self.pmid.get_or_insert_with(String::new).push_str(text);
      return;
    }

    if within(path_stack, "PubDate") {
      let slot = match element.as_str() {
        "Year" => &mut self.year,
        "Month" => &mut self.month,
        "Day" => &mut self.day,
        "MedlineDate" => &mut self.medline_date,
        _ => return,
      };
      slot.get_or_insert_with(String::new).push_str(text);
    }
  }

  fn finish_author(&mut self) {
    let Some(author) = self.author.take() else { return };
    let last_name = collapse(&author.last_name);
    let given = [&author.fore_name, &author.initials]
      .into_iter()
      .map(|name| collapse(name))
      .find(|name| !name.is_empty());

    let name = match given {
      Some(given) if !last_name.is_empty() => format!("{given} {last_name}"),
      _ if !last_name.is_empty() => last_name,
      _ => collapse(&author.collective_name),
    };
    if name.is_empty() {
      trace!("Skipping author without a name");
      return;
    }

    let affiliations: Vec<String> = author
      .affiliations
      .iter()
      .map(|text| collapse(text))
      .filter(|text| !text.is_empty())
      .collect();
    let affiliation = (!affiliations.is_empty()).then(|| affiliations.join("; "));

    self.authors.push(RawAuthor { name, affiliation });
  }

  fn build(self) -> Option<RawRecord> {
    let paper_id = self.pmid.map(|pmid| collapse(&pmid)).filter(|pmid| !pmid.is_empty())?;

    let publication_date = match (&self.year, &self.medline_date) {
      (Some(year), _) => PublicationDate::from_parts(
        Some(year.as_str()),
        self.month.as_deref(),
        self.day.as_deref(),
      ),
      (None, Some(medline)) => PublicationDate::Text(collapse(medline)),
      (None, None) => PublicationDate::Unknown,
    };

    Some(RawRecord {
      paper_id,
      title: collapse(&self.title),
      publication_date,
      authors: self.authors,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ARTICLE_SET: &str = r#"<?xml version="1.0" ?>
<!DOCTYPE PubmedArticleSet PUBLIC "-//NLM//DTD PubMedArticle, 1st January 2024//EN" "https://dtd.nlm.nih.gov/ncbi/pubmed/out/pubmed_240101.dtd">
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE" Owner="NLM">
      <PMID Version="1">38012345</PMID>
      <Article PubModel="Print">
        <Journal>
          <JournalIssue CitedMedium="Internet">
            <PubDate><Year>2023</Year><Month>Nov</Month><Day>07</Day></PubDate>
          </JournalIssue>
          <Title>Journal of Things</Title>
        </Journal>
        <ArticleTitle>Targeting <i>KRAS</i> G12C in lung cancer &amp; beyond.</ArticleTitle>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y">
            <LastName>Doe</LastName>
            <ForeName>Jane</ForeName>
            <Initials>J</Initials>
            <AffiliationInfo>
              <Affiliation>Acme Therapeutics Inc, Boston, MA, USA.</Affiliation>
            </AffiliationInfo>
            <AffiliationInfo>
              <Affiliation>Department of Medicine, Harvard Medical School, Boston, MA, USA. jane@acme.com.</Affiliation>
            </AffiliationInfo>
          </Author>
          <Author ValidYN="Y">
            <LastName>Roe</LastName>
            <Initials>JR</Initials>
          </Author>
          <Author ValidYN="Y">
            <CollectiveName>KRAS Study Group</CollectiveName>
          </Author>
          <Author ValidYN="Y">
            <AffiliationInfo><Affiliation>Nowhere</Affiliation></AffiliationInfo>
          </Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
    <PubmedData>
      <ReferenceList>
        <Reference><ArticleIdList><ArticleId IdType="pubmed">11111111</ArticleId></ArticleIdList></Reference>
      </ReferenceList>
    </PubmedData>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation>
      <PMID Version="1">38000001</PMID>
      <CommentsCorrectionsList>
        <CommentsCorrections RefType="CommentOn"><PMID Version="1">1</PMID></CommentsCorrections>
      </CommentsCorrectionsList>
      <Article>
        <Journal>
          <JournalIssue><PubDate><MedlineDate>2023 Jan-Feb</MedlineDate></PubDate></JournalIssue>
        </Journal>
        <AuthorList>
          <Author><LastName>Solo</LastName><ForeName>Han</ForeName></Author>
        </AuthorList>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

  #[test]
  fn test_parse_article_set() {
    let records = parse_articles(ARTICLE_SET).unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.paper_id, "38012345");
    assert_eq!(first.title, "Targeting KRAS G12C in lung cancer & beyond.");
    assert_eq!(first.publication_date.to_string(), "2023-11-07");
    assert_eq!(first.authors.len(), 3);
    assert_eq!(first.authors[0].name, "Jane Doe");
    assert_eq!(
      first.authors[0].affiliation.as_deref(),
      Some(
        "Acme Therapeutics Inc, Boston, MA, USA.; Department of Medicine, Harvard Medical School, \
         Boston, MA, USA. jane@acme.com."
      )
    );
    assert_eq!(first.authors[1], RawAuthor::new("JR Roe", None));
    assert_eq!(first.authors[2].name, "KRAS Study Group");
  }

  #[test]
  fn test_missing_title_and_medline_date() {
    let records = parse_articles(ARTICLE_SET).unwrap();
    let second = &records[1];
    assert_eq!(second.paper_id, "38000001");
    assert_eq!(second.title, "");
    assert_eq!(second.publication_date, PublicationDate::Text("2023 Jan-Feb".to_string()));
    assert_eq!(second.authors, vec![RawAuthor::new("Han Solo", None)]);
  }

  #[test]
  fn test_empty_set() {
    assert!(parse_articles("<PubmedArticleSet></PubmedArticleSet>").unwrap().is_empty());
    assert!(parse_articles("").unwrap().is_empty());
  }

  #[test]
  fn test_article_without_pmid_is_dropped() {
    let xml = "<PubmedArticleSet><PubmedArticle><MedlineCitation><Article>\
               <ArticleTitle>Orphan</ArticleTitle></Article></MedlineCitation></PubmedArticle>\
               </PubmedArticleSet>";
    assert!(parse_articles(xml).unwrap().is_empty());
  }

  #[test]
  fn test_malformed_xml_is_an_error() {
    let xml = "<PubmedArticleSet><PubmedArticle></MedlineCitation></PubmedArticleSet>";
    assert!(matches!(parse_articles(xml), Err(FinderError::Xml(_))));
  }

  #[test]
  fn test_classifies_parsed_record() {
    let records = parse_articles(ARTICLE_SET).unwrap();
    let paper = PaperResult::assemble(&records[0], &AffiliationClassifier::default()).unwrap();
    assert_eq!(paper.companies, vec!["Acme Therapeutics Inc"]);
    assert_eq!(paper.corresponding_author_email.as_deref(), Some("jane@acme.com"));
  }
}
