//! End-to-end behavior of a compile → backtest → save → delete run.

use std::sync::Arc;
use std::time::Duration;

use qcloud_core::{
    ApiClient, ApiErrorKind, CancellationToken, ClientConfig, Coordinator, Credential,
    HttpMethod, LoadingRetry, PollPolicy, RunRequest, ScriptedHttpClient,
};
use serde_json::{json, Value};

const FAST: PollPolicy = PollPolicy::new(Duration::from_millis(1), None);

fn client(http: Arc<ScriptedHttpClient>) -> ApiClient {
    let config = ClientConfig::new(Credential::new("42", "secret").expect("credential"))
        .with_base_url("https://api.test/v2")
        .with_loading_retry(LoadingRetry::disabled())
        .with_diagnostics_path(None);
    ApiClient::with_http_client(config, http).expect("client")
}

fn coordinator(http: Arc<ScriptedHttpClient>) -> Coordinator {
    Coordinator::new(client(http))
}

fn compile(state: &str) -> Value {
    json!({ "success": true, "compileId": "abc123", "state": state, "logs": [] })
}

fn backtest(status: &str, completed: bool) -> Value {
    let progress = if completed { 1.0 } else { 0.5 };
    let statistics = if completed {
        json!({ "Net Profit": "12.5%" })
    } else {
        json!({})
    };
    json!({
        "success": true,
        "backtest": {
            "backtestId": "bt-1",
            "name": "ema-cross",
            "status": status,
            "completed": completed,
            "progress": progress,
            "statistics": statistics
        }
    })
}

fn script_successful_run(http: &ScriptedHttpClient) {
    http.push_json(compile("InQueue"))
        .push_json(compile("InQueue"))
        .push_json(compile("BuildSuccess"))
        .push_json(backtest("In Queue...", false))
        .push_json(backtest("In Progress...", false))
        .push_json(backtest("In Progress...", false))
        .push_json(backtest("Completed.", true))
        .push_json(json!({ "success": true }));
}

// =============================================================================
// Full run
// =============================================================================

#[tokio::test]
async fn when_a_run_completes_the_result_is_saved_and_the_remote_backtest_deleted() {
    // Given: a compile that settles after two polls and a backtest that completes on the third read
    let http = Arc::new(ScriptedHttpClient::new());
    script_successful_run(&http);
    let output = tempfile::tempdir().expect("tempdir");
    let request = RunRequest::new(7, "ema-cross", output.path().join("results"))
        .with_parameter("ema_fast", 10)
        .with_compile_poll(FAST)
        .with_backtest_poll(FAST);

    // When
    let outcome = coordinator(http.clone())
        .run_backtest(&request)
        .await
        .expect("run succeeds");

    // Then: handles and result
    assert_eq!(outcome.compile_id.as_str(), "abc123");
    assert_eq!(outcome.backtest_id.as_str(), "bt-1");
    assert!(outcome.result.backtest.completed);
    assert!(outcome.deleted);

    // Then: the final read envelope is on disk
    let expected_path = output.path().join("results").join("ema-cross.json");
    assert_eq!(outcome.result_path, expected_path);
    let saved: Value = serde_json::from_str(
        &std::fs::read_to_string(&expected_path).expect("result file"),
    )
    .expect("result is JSON");
    assert_eq!(saved["backtest"]["backtestId"], json!("bt-1"));
    assert_eq!(saved["backtest"]["statistics"]["Net Profit"], json!("12.5%"));

    // Then: the call sequence
    let requests = http.requests();
    let paths = requests
        .iter()
        .map(|request| request.url.trim_start_matches("https://api.test/v2").to_string())
        .collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec![
            "/compile/create",
            "/compile/read",
            "/compile/read",
            "/backtests/create",
            "/backtests/read",
            "/backtests/read",
            "/backtests/read",
            "/backtests/delete",
        ]
    );
    let bodies = http.request_bodies();
    assert_eq!(
        bodies[3],
        json!({
            "projectId": 7,
            "compileId": "abc123",
            "backtestName": "ema-cross",
            "parameters": { "ema_fast": 10 }
        })
    );
    assert_eq!(requests[7].method, HttpMethod::Delete);
    assert_eq!(bodies[7], json!({ "projectId": 7, "backtestId": "bt-1" }));
}

#[tokio::test]
async fn when_keep_remote_is_set_no_delete_is_sent() {
    let http = Arc::new(ScriptedHttpClient::new());
    script_successful_run(&http);
    let output = tempfile::tempdir().expect("tempdir");
    let request = RunRequest::new(7, "kept", output.path())
        .keep_remote()
        .with_compile_poll(FAST)
        .with_backtest_poll(FAST);

    let outcome = coordinator(http.clone())
        .run_backtest(&request)
        .await
        .expect("run succeeds");

    assert!(!outcome.deleted);
    assert!(outcome.result_path.exists());
    assert_eq!(http.request_count(), 7);
    assert!(http
        .requests()
        .iter()
        .all(|request| request.method != HttpMethod::Delete));
}

// =============================================================================
// Failure paths
// =============================================================================

#[tokio::test]
async fn when_the_build_fails_no_backtest_is_created() {
    let http = Arc::new(ScriptedHttpClient::new());
    http.push_json(compile("InQueue"))
        .push_json(json!({
            "success": true,
            "compileId": "abc123",
            "state": "BuildError",
            "logs": ["main.py:12 NameError"]
        }));
    let output = tempfile::tempdir().expect("tempdir");
    let request = RunRequest::new(7, "broken", output.path()).with_compile_poll(FAST);

    let error = coordinator(http.clone())
        .run_backtest(&request)
        .await
        .expect_err("build failure");

    assert_eq!(error.kind(), ApiErrorKind::BuildFailed);
    assert_eq!(http.request_count(), 2);
    assert!(!output.path().join("broken.json").exists());
}

#[tokio::test]
async fn when_the_run_is_cancelled_up_front_nothing_is_sent() {
    let http = Arc::new(ScriptedHttpClient::new());
    let token = CancellationToken::new();
    token.cancel();
    let output = tempfile::tempdir().expect("tempdir");

    let error = coordinator(http.clone())
        .with_cancellation(token)
        .run_backtest(&RunRequest::new(7, "cancelled", output.path()))
        .await
        .expect_err("cancelled");

    assert_eq!(error.kind(), ApiErrorKind::Cancelled);
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn when_the_test_name_is_a_path_the_run_is_rejected_before_any_call() {
    let http = Arc::new(ScriptedHttpClient::new());
    let output = tempfile::tempdir().expect("tempdir");

    let error = coordinator(http.clone())
        .run_backtest(&RunRequest::new(7, "nested/name", output.path()))
        .await
        .expect_err("invalid name");

    assert_eq!(error.kind(), ApiErrorKind::Misuse);
    assert_eq!(http.request_count(), 0);
}

#[tokio::test]
async fn two_coordinators_can_share_one_client() {
    // Given: one client, cloned into two coordinators with their own cancellation
    let http = Arc::new(ScriptedHttpClient::new());
    script_successful_run(&http);
    script_successful_run(&http);
    let shared = client(Arc::clone(&http));
    let first = Coordinator::new(shared.clone());
    let second = Coordinator::new(shared);
    let output = tempfile::tempdir().expect("tempdir");

    let first_request = RunRequest::new(1, "first", output.path())
        .with_compile_poll(FAST)
        .with_backtest_poll(FAST);
    let second_request = RunRequest::new(2, "second", output.path())
        .with_compile_poll(FAST)
        .with_backtest_poll(FAST);

    // When: the runs go one after another through the same client
    let first_outcome = first.run_backtest(&first_request).await.expect("first run");
    let second_outcome = second.run_backtest(&second_request).await.expect("second run");

    // Then: both results land on disk and every request went through the shared transport
    assert!(first_outcome.result_path.ends_with("first.json"));
    assert!(second_outcome.result_path.ends_with("second.json"));
    assert!(first_outcome.result_path.exists());
    assert!(second_outcome.result_path.exists());
    assert_eq!(http.request_count(), 16);

    // Cancelling one coordinator leaves the other untouched
    first.cancellation_token().cancel();
    assert!(!second.cancellation_token().is_cancelled());
}
