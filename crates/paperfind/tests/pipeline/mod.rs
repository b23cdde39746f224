use super::*;

mod failures;

#[tokio::test]
async fn test_keeps_only_industry_papers_in_order() -> TestResult<()> {
  let source = Arc::new(Scripted::new(vec![
    industry("1", "Acme Pharmaceuticals Inc"),
    academic("2"),
    industry("3", "Globex Biotech"),
  ]));
  let report = finder(source, Config::default()).run("kinase inhibitors", None).await?;

  assert_eq!(ids(&report), vec!["1", "3"]);
  assert_eq!(report.searched, 3);
  assert_eq!(report.fetched, 3);
  assert!(report.is_complete());

  let first = &report.papers[0];
  assert_eq!(first.companies, vec!["Acme Pharmaceuticals Inc"]);
  assert_eq!(first.author_names(), vec!["Grace Hopper"]);
  assert_eq!(first.corresponding_author_email.as_deref(), Some("ada@stanford.edu"));
  Ok(())
}

#[tokio::test]
async fn test_no_qualifying_papers_is_ok() -> TestResult<()> {
  let source = Arc::new(Scripted::new(vec![academic("1"), academic("2")]));
  let report = finder(source, Config::default()).run("history of computing", None).await?;
  assert!(report.papers.is_empty());
  assert_eq!(report.fetched, 2);
  Ok(())
}

#[tokio::test]
async fn test_empty_search_fetches_nothing() -> TestResult<()> {
  let source = Arc::new(Scripted::new(vec![]));
  let report = finder(source.clone(), Config::default()).run("nothing matches", None).await?;
  assert_eq!(report, RunReport::default());
  assert!(source.fetched_batches().is_empty());
  Ok(())
}

#[tokio::test]
async fn test_max_results_truncates_search() -> TestResult<()> {
  let corpus = (1..=10).map(|i| industry(&i.to_string(), "Acme Inc")).collect();
  let source = Arc::new(Scripted::new(corpus));
  let report = finder(source.clone(), Config::default()).run("acme", Some(4)).await?;

  assert_eq!(ids(&report), vec!["1", "2", "3", "4"]);
  assert_eq!(report.searched, 4);
  assert_eq!(source.searches.lock().unwrap().as_slice(), &[("acme".to_string(), 4)]);
  Ok(())
}

#[tokio::test]
async fn test_search_limit_without_max_results() -> TestResult<()> {
  let source = Arc::new(Scripted::new(vec![industry("1", "Acme Inc")]));
  let config = Config { search_limit: 250, ..Config::default() };
  finder(source.clone(), config).run("  acme  ", None).await?;
  assert_eq!(source.searches.lock().unwrap().as_slice(), &[("acme".to_string(), 250)]);
  Ok(())
}

#[tokio::test]
async fn test_ids_are_fetched_in_batches() -> TestResult<()> {
  let corpus = (1..=7).map(|i| industry(&i.to_string(), "Acme Inc")).collect();
  let source = Arc::new(Scripted::new(corpus));
  let report =
    finder(source.clone(), Config::default().with_batch_size(3)).run("acme", None).await?;

  assert_eq!(report.papers.len(), 7);
  let sizes: Vec<usize> = source.fetched_batches().iter().map(Vec::len).collect();
  assert_eq!(sizes, vec![3, 3, 1]);
  assert_eq!(source.fetched_batches()[1], vec!["4", "5", "6"]);
  Ok(())
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_searching() {
  let source = Arc::new(Scripted::new(vec![industry("1", "Acme Inc")]));
  let finder = finder(source.clone(), Config::default());

  assert!(matches!(finder.run("", None).await, Err(FinderError::InvalidQuery(_))));
  assert!(matches!(finder.run(&"x".repeat(1001), None).await, Err(FinderError::InvalidQuery(_))));
  assert!(matches!(finder.run("acme", Some(0)).await, Err(FinderError::InvalidMaxResults)));
  assert!(source.searches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_failure_fails_the_run() {
  let source = Arc::new(Scripted::new(vec![industry("1", "Acme Inc")]).failing_search());
  let result = finder(source.clone(), Config::default()).run("acme", None).await;
  assert!(matches!(result, Err(FinderError::ApiError(_))));
  assert!(source.fetched_batches().is_empty());
}

#[tokio::test]
async fn test_report_rows_from_run() -> TestResult<()> {
  let source = Arc::new(Scripted::new(vec![industry("1", "Acme Therapeutics"), academic("2")]));
  let report = finder(source, Config::default()).run("acme", None).await?;

  let rows: Vec<ReportRow> = report.papers.iter().map(ReportRow::from).collect();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].companies, "Acme Therapeutics");
  assert_eq!(rows[0].publication_date, "2024-02");

  let mut buffer = Vec::new();
  write_csv(&mut buffer, &report.papers)?;
  assert_eq!(String::from_utf8(buffer)?.lines().count(), 2);
  Ok(())
}
