use prepkit::{Fetcher, NoopReporter, Reporter, TransferError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Collector {
    reports: Vec<(u64, u64)>,
    finished: bool,
}

impl Reporter for Collector {
    fn report(&mut self, current: u64, total: u64) {
        self.reports.push((current, total));
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

#[tokio::test]
async fn test_fetch_writes_body_and_reports_progress() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0..20_000u32).map(|i| (i % 199) as u8).collect();

    Mock::given(method("GET"))
        .and(path("/models/weights.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("checkpoints").join("weights.bin");
    let url = format!("{}/models/weights.bin", server.uri());

    let mut collector = Collector::default();
    let returned = Fetcher::new()
        .unwrap()
        .fetch(&url, &dest, &mut collector)
        .await
        .unwrap();

    assert_eq!(returned, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), body);

    assert!(!collector.reports.is_empty());
    assert!(collector.reports.iter().all(|&(_, total)| total == 20_000));
    assert!(collector.reports.windows(2).all(|w| w[0].0 <= w[1].0));
    assert_eq!(collector.reports.last(), Some(&(20_000, 20_000)));
    assert!(collector.finished);
}

#[tokio::test]
async fn test_fetch_fails_on_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing.zip"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("missing.zip");
    let url = format!("{}/missing.zip", server.uri());

    let err = Fetcher::new()
        .unwrap()
        .fetch(&url, &dest, NoopReporter)
        .await
        .unwrap_err();

    match err {
        TransferError::Status(status) => assert_eq!(status.as_u16(), 404),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_fetch_rejects_invalid_locator() {
    let dir = tempfile::tempdir().unwrap();
    let err = Fetcher::new()
        .unwrap()
        .fetch("file:///etc/hosts", &dir.path().join("hosts"), NoopReporter)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidUrl { .. }));
}

#[tokio::test]
async fn test_fetch_unreachable_host() {
    // Nothing listens on port 9 of the loopback interface
    let dir = tempfile::tempdir().unwrap();
    let err = Fetcher::new()
        .unwrap()
        .fetch("http://127.0.0.1:9/file", &dir.path().join("f"), NoopReporter)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::Request(_)));
}
