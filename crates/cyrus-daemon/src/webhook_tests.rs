use super::*;
use crate::auth_config::WebhookAuthConfig;
use async_trait::async_trait;
use axum::routing::{get, post};
use axum::Router;
use cyrus_adapters::{FakeIssueTracker, Runner, RunnerError, RunnerHandle, RunnerInput};
use cyrus_core::{FakeClock, RunnerEvent, RunnerSelection};
use cyrus_engine::ConfigurationManager;
use cyrus_wire::WebhookAuth;
use parking_lot::Mutex as SyncMutex;
use std::collections::HashMap;
use tempfile::tempdir;
use tokio::sync::mpsc;

/// A `Runner` that never finishes, so a dispatched session stays
/// registered for the lifetime of the test regardless of how the
/// background finalizing task happens to get scheduled against the
/// real HTTP client/server round trip below.
struct HangingRunner {
    held: SyncMutex<Option<mpsc::Sender<RunnerEvent>>>,
}

#[async_trait]
impl Runner for HangingRunner {
    fn supports_streaming(&self) -> bool {
        true
    }

    async fn start(
        &self,
        _input: RunnerInput,
        _resume_session_id: Option<String>,
        on_event: mpsc::Sender<RunnerEvent>,
    ) -> Result<RunnerHandle, RunnerError> {
        *self.held.lock() = Some(on_event);
        Ok(RunnerHandle::default())
    }

    async fn push_message(&self, _text: &str) -> Result<(), RunnerError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), RunnerError> {
        self.held.lock().take();
        Ok(())
    }
}

fn minimal_repo_json(id: &str) -> String {
    format!(
        r#"{{
            "id": "{id}", "name": "{id}", "repositoryPath": "/tmp/{id}",
            "baseBranch": "main", "trackerToken": "tok", "trackerWorkspaceId": "ws-1",
            "teamKeys": ["ENG"], "isActive": true
        }}"#
    )
}

/// Builds a fully wired `AppState<FakeClock>` and boots it on an
/// ephemeral localhost port, returning the base URL. Exercising the
/// real axum router (rather than calling `handle`/`status` directly)
/// is what actually proves the routing, auth, and dispatch wiring in
/// `main.rs` holds together.
async fn spawn_daemon(dir: &tempfile::TempDir) -> String {
    let config_path = dir.path().join("config.json");
    std::fs::write(&config_path, format!(r#"{{"repositories": [{}]}}"#, minimal_repo_json("repo-1"))).unwrap();
    let config = Arc::new(ConfigurationManager::load(&config_path, dir.path().join("backups")).unwrap());

    let tracker = Arc::new(FakeIssueTracker::new());
    let mut trackers: HashMap<String, Arc<dyn cyrus_adapters::IssueTracker>> = HashMap::new();
    trackers.insert("repo-1".to_string(), tracker);
    let runner_factory: Arc<dyn Fn(&RunnerSelection) -> Arc<dyn Runner> + Send + Sync> =
        Arc::new(|_selection| Arc::new(HangingRunner { held: SyncMutex::new(None) }) as Arc<dyn Runner>);
    let orchestrator =
        Arc::new(cyrus_engine::Orchestrator::new(dir.path().to_path_buf(), trackers, runner_factory, FakeClock::new()));

    let state = AppState {
        orchestrator,
        config,
        auth: WebhookAuthConfig::for_test(WebhookAuth::Bearer { token: "tok123".to_string() }),
    };
    let router: Router = Router::new()
        .route("/webhook", post(handle::<FakeClock>))
        .route("/status", get(status::<FakeClock>))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn issue_assigned_body() -> serde_json::Value {
    serde_json::json!({
        "type": "AgentSessionEvent",
        "action": "assigned",
        "organization_id": "ws-1",
        "issue": { "id": "issue-1", "identifier": "ENG-1", "title": "Fix the thing", "team": { "key": "ENG" }, "labels": [] }
    })
}

#[tokio::test]
async fn rejects_requests_with_no_bearer_token() {
    let dir = tempdir().unwrap();
    let base_url = spawn_daemon(&dir).await;
    let client = reqwest::Client::new();

    let response = client.post(format!("{base_url}/webhook")).json(&issue_assigned_body()).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejects_malformed_payload_with_bad_request() {
    let dir = tempdir().unwrap();
    let base_url = spawn_daemon(&dir).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{base_url}/webhook"))
        .bearer_auth("tok123")
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dispatches_a_valid_webhook_and_reports_it_in_status() {
    let dir = tempdir().unwrap();
    let base_url = spawn_daemon(&dir).await;
    let client = reqwest::Client::new();

    let response =
        client.post(format!("{base_url}/webhook")).bearer_auth("tok123").json(&issue_assigned_body()).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let status: cyrus_core::ActiveWorkStatus = client.get(format!("{base_url}/status")).send().await.unwrap().json().await.unwrap();
    assert_eq!(status.active_sessions.len(), 1);
}
