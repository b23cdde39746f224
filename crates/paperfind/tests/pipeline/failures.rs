use super::*;

#[tokio::test]
async fn test_failed_batch_is_skipped_and_reported() -> TestResult<()> {
  let corpus = (1..=5).map(|i| industry(&i.to_string(), "Acme Inc")).collect();
  let source = Arc::new(Scripted::new(corpus).failing_fetches(&[false, true, false]));
  let report =
    finder(source.clone(), Config::default().with_batch_size(2)).run("acme", None).await?;

  assert_eq!(ids(&report), vec!["1", "2", "5"]);
  assert_eq!(report.fetched, 3);
  assert_eq!(report.failures.len(), 1);
  assert_eq!(report.failures[0].index, 1);
  assert_eq!(report.failures[0].ids, vec!["3", "4"]);
  assert!(report.failures[0].error.contains("timed out"));
  assert_eq!(report.skipped(), 2);
  assert_eq!(source.fetched_batches().len(), 3);
  Ok(())
}

#[tokio::test]
async fn test_every_batch_failing_still_completes() -> TestResult<()> {
  let corpus = (1..=4).map(|i| industry(&i.to_string(), "Acme Inc")).collect();
  let source = Arc::new(Scripted::new(corpus).failing_fetches(&[true, true]));
  let report = finder(source, Config::default().with_batch_size(2)).run("acme", None).await?;

  assert!(report.papers.is_empty());
  assert_eq!(report.failures.len(), 2);
  assert_eq!(report.skipped(), 4);
  Ok(())
}

#[tokio::test]
async fn test_abort_policy_stops_at_first_failure() {
  let corpus = (1..=6).map(|i| industry(&i.to_string(), "Acme Inc")).collect();
  let source = Arc::new(Scripted::new(corpus).failing_fetches(&[false, true, false]));
  let config =
    Config::default().with_batch_size(2).with_fetch_failure_policy(FetchFailurePolicy::Abort);

  let result = finder(source.clone(), config).run("acme", None).await;
  assert!(matches!(result, Err(FinderError::ApiError(message)) if message.contains("timed out")));
  assert_eq!(source.fetched_batches().len(), 2);
}
