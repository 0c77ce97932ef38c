//! Opsview v3 client against a fake Opsview REST server.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opsview_core::{Credentials, Opsview, OpsviewError, ReloadLock};

const VALID_USERNAME: &str = "validUsername";
const VALID_PASSWORD: &str = "validPassword";
const VALID_TOKEN: &str = "validToken";

/// Fake server plus a private lock directory for one test.
struct TestServer {
    server: MockServer,
    lock_dir: TempDir,
}

impl TestServer {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            lock_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    fn host(&self) -> String {
        format!("{}/rest", self.server.uri())
    }

    fn lock(&self) -> ReloadLock {
        ReloadLock::new(self.lock_dir.path().join("reload.lock"))
    }

    fn client(&self, username: &str, password: &str) -> Opsview {
        let credentials = Credentials::new(username, password, self.host());
        Opsview::with_settings(Some(3), credentials, self.lock()).expect("Failed to build client")
    }

    fn valid_client(&self) -> Opsview {
        self.client(VALID_USERNAME, VALID_PASSWORD)
    }

    /// Accept valid credentials, reject anything else with 401.
    async fn mount_login(&self, expected_logins: u64) {
        Mock::given(method("POST"))
            .and(path("/rest/login"))
            .and(body_json(json!({"username": VALID_USERNAME, "password": VALID_PASSWORD})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": VALID_TOKEN})))
            .expect(expected_logins)
            .mount(&self.server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "invalid credentials"})),
            )
            .with_priority(10)
            .mount(&self.server)
            .await;
    }

    async fn mount_reload(&self, response: ResponseTemplate, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/rest/reload"))
            .and(header("X-Opsview-Username", VALID_USERNAME))
            .and(header("X-Opsview-Token", VALID_TOKEN))
            .respond_with(response)
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }
}

fn downtime_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(2030, 1, 15, 22, 0, 0).unwrap();
    (start, start + Duration::hours(2))
}

fn downtime_ack() -> serde_json::Value {
    json!({
        "summary": {"num_hostgroups": 1, "num_hosts": 1, "num_services": 1},
        "list": {
            "hostgroups": [{"id": 1, "name": "hostgroup1"}],
            "hosts": [{"id": 1, "hostname": "host1"}],
            "services": [{"id": 1, "hostname": "host1", "servicename": "check_http"}]
        }
    })
}

fn reload_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "server_status": 0,
        "configuration_status": "uptodate",
        "average_duration": 1200,
        "lastupdated": 0,
        "messages": []
    }))
}

#[tokio::test]
async fn test_set_downtime_invalid_credentials() {
    let ts = TestServer::start().await;
    ts.mount_login(0).await;

    let opsview = ts.client("invalidUsername", "invalidPassword");
    let (start, end) = downtime_window();
    let err = opsview
        .set_downtime(start, end, "maintenance", "host1.tests.com", Some("check_http"))
        .await
        .unwrap_err();

    match err {
        OpsviewError::Authentication(msg) => assert!(msg.contains("invalid credentials"), "{msg}"),
        other => panic!("expected authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_set_downtime_matching_host_and_service() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;

    let (start, end) = downtime_window();
    Mock::given(method("POST"))
        .and(path("/rest/downtime"))
        .and(query_param("svc.hostname", "host1.tests.com"))
        .and(query_param("svc.servicename", "check_http"))
        .and(header("X-Opsview-Username", VALID_USERNAME))
        .and(header("X-Opsview-Token", VALID_TOKEN))
        .and(body_json(json!({
            "starttime": "2030/01/15 22:00:00",
            "endtime": "2030/01/16 00:00:00",
            "comment": "maintenance"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(downtime_ack()))
        .expect(1)
        .mount(&ts.server)
        .await;

    let ack = ts
        .valid_client()
        .set_downtime(start, end, "maintenance", "host1.tests.com", Some("check_http"))
        .await
        .unwrap();

    assert_eq!(ack.summary.num_hostgroups, 1);
    assert_eq!(ack.summary.num_hosts, 1);
    assert_eq!(ack.summary.num_services, 1);
    assert_eq!(ack.list.hostgroups[0].name, "hostgroup1");
    assert_eq!(ack.list.hosts[0].hostname, "host1");
    assert_eq!(ack.list.services[0].servicename, "check_http");
}

#[tokio::test]
async fn test_set_downtime_without_service_pattern() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;

    Mock::given(method("POST"))
        .and(path("/rest/downtime"))
        .and(query_param("svc.hostname", "host%"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downtime_ack()))
        .expect(1)
        .mount(&ts.server)
        .await;

    let (start, end) = downtime_window();
    ts.valid_client()
        .set_downtime(start, end, "all hosts", "host%", None)
        .await
        .unwrap();

    let requests = ts.server.received_requests().await.unwrap();
    let downtime = requests
        .iter()
        .find(|r| r.url.path() == "/rest/downtime")
        .expect("downtime request not received");
    assert!(downtime.url.query_pairs().all(|(key, _)| key != "svc.servicename"));
}

#[tokio::test]
async fn test_set_downtime_unknown_host_surfaces_api_error() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;

    Mock::given(method("POST"))
        .and(path("/rest/downtime"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "The host nohost was not found",
            "detail": "no objects matched svc.hostname=nohost"
        })))
        .mount(&ts.server)
        .await;

    let (start, end) = downtime_window();
    let err = ts
        .valid_client()
        .set_downtime(start, end, "maintenance", "nohost", None)
        .await
        .unwrap_err();

    assert_eq!(err.detail(), Some("no objects matched svc.hostname=nohost"));
    match err {
        OpsviewError::Api { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "The host nohost was not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_set_downtime_rejects_inverted_window() {
    let ts = TestServer::start().await;
    ts.mount_login(0).await;

    let (start, end) = downtime_window();
    let err = ts
        .valid_client()
        .set_downtime(end, start, "backwards", "host1.tests.com", None)
        .await
        .unwrap_err();
    assert!(matches!(err, OpsviewError::InvalidArgument(_)));
}

#[tokio::test]
async fn test_token_is_reused_across_calls() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;
    ts.mount_reload(reload_ok(), 1).await;

    Mock::given(method("POST"))
        .and(path("/rest/downtime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downtime_ack()))
        .expect(2)
        .mount(&ts.server)
        .await;

    let opsview = ts.valid_client();
    let (start, end) = downtime_window();
    for _ in 0..2 {
        opsview
            .set_downtime(start, end, "maintenance", "host1.tests.com", Some("check_http"))
            .await
            .unwrap();
    }
    opsview.reload(None).await.unwrap();
}

#[tokio::test]
async fn test_reload_releases_lock() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;
    ts.mount_reload(reload_ok(), 1).await;

    let status = ts.valid_client().reload(None).await.unwrap();
    assert_eq!(status.server_status, 0);
    assert_eq!(status.configuration_status.as_deref(), Some("uptodate"));
    assert!(!ts.lock().is_held());
}

#[tokio::test]
async fn test_reload_while_locked() {
    let ts = TestServer::start().await;
    ts.mount_login(0).await;
    ts.mount_reload(reload_ok(), 0).await;

    let _held = ts.lock().try_acquire().unwrap();
    let err = ts.valid_client().reload(None).await.unwrap_err();

    match err {
        OpsviewError::ReloadInProgress { lock_path } => {
            assert_eq!(lock_path.as_deref(), Some(ts.lock().path()));
        }
        other => panic!("expected reload conflict, got {other:?}"),
    }
    assert!(ts.lock().is_held());
}

#[tokio::test]
async fn test_reload_in_the_past_is_rejected() {
    let ts = TestServer::start().await;
    ts.mount_login(0).await;
    ts.mount_reload(reload_ok(), 0).await;

    let past = Utc::now() - Duration::minutes(5);
    let err = ts.valid_client().reload(Some(past)).await.unwrap_err();

    match err {
        OpsviewError::ScheduleInPast(at) => assert_eq!(at, past),
        other => panic!("expected scheduling error, got {other:?}"),
    }
    assert!(!ts.lock().is_held());
}

#[tokio::test]
async fn test_scheduled_reload_runs_after_delay() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;
    ts.mount_reload(reload_ok(), 1).await;

    let started = std::time::Instant::now();
    let at = Utc::now() + Duration::milliseconds(300);
    ts.valid_client().reload(Some(at)).await.unwrap();

    assert!(started.elapsed() >= StdDuration::from_millis(250));
    assert!(Utc::now() >= at);
}

#[tokio::test]
async fn test_reload_failure_releases_lock() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;
    ts.mount_reload(
        ResponseTemplate::new(500).set_body_json(json!({"message": "reload failed"})),
        1,
    )
    .await;

    let err = ts.valid_client().reload(None).await.unwrap_err();
    assert!(matches!(err, OpsviewError::Api { status: 500, .. }));
    assert!(!ts.lock().is_held());
}

#[tokio::test]
async fn test_reload_conflict_from_server() {
    let ts = TestServer::start().await;
    ts.mount_login(1).await;
    ts.mount_reload(
        ResponseTemplate::new(409).set_body_json(json!({
            "server_status": 1,
            "messages": ["Reload already running"]
        })),
        1,
    )
    .await;

    let err = ts.valid_client().reload(None).await.unwrap_err();
    assert!(matches!(err, OpsviewError::ReloadInProgress { lock_path: None }));
    assert!(!ts.lock().is_held());
}

#[tokio::test]
async fn test_reload_with_invalid_credentials_releases_lock() {
    let ts = TestServer::start().await;
    ts.mount_login(0).await;
    ts.mount_reload(reload_ok(), 0).await;

    let err = ts
        .client("invalidUsername", "invalidPassword")
        .reload(None)
        .await
        .unwrap_err();
    assert!(matches!(err, OpsviewError::Authentication(_)));
    assert!(!ts.lock().is_held());
}
