//! Sandbox session lifecycle tests against a stub runtime.
//!
//! The runtime loader is an injected capability, so these tests swap the
//! CPython subprocess for in-process stubs and exercise the session state
//! machine directly: phase transitions, the run guard, output clearing, and
//! error-as-output behavior.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use showcase_viewer::error::AppError;
use showcase_viewer::github::GithubClient;
use showcase_viewer::models::SessionPhase;
use showcase_viewer::sandbox::{
    OutputBuffer, RuntimeError, RuntimeLoader, SandboxRuntime, SandboxSession,
};

/// Emits configured lines after an optional delay, then optionally fails.
struct StubRuntime {
    delay: Duration,
    lines: Vec<String>,
    fail_with: Option<String>,
}

impl StubRuntime {
    fn emitting(lines: &[&str]) -> Self {
        Self {
            delay: Duration::ZERO,
            lines: lines.iter().map(|s| s.to_string()).collect(),
            fail_with: None,
        }
    }
}

#[async_trait]
impl SandboxRuntime for StubRuntime {
    async fn execute(
        &mut self,
        _code: &str,
        output: &OutputBuffer,
    ) -> Result<(), RuntimeError> {
        tokio::time::sleep(self.delay).await;
        for line in &self.lines {
            output.push_line(line);
        }
        match &self.fail_with {
            Some(message) => Err(RuntimeError::Exec(message.clone())),
            None => Ok(()),
        }
    }
}

struct FailingLoader;

#[async_trait]
impl RuntimeLoader for FailingLoader {
    async fn load(&self) -> Result<Box<dyn SandboxRuntime>, RuntimeError> {
        Err(RuntimeError::Bootstrap("no interpreter on this host".to_string()))
    }
}

struct StubLoader;

#[async_trait]
impl RuntimeLoader for StubLoader {
    async fn load(&self) -> Result<Box<dyn SandboxRuntime>, RuntimeError> {
        Ok(Box::new(StubRuntime::emitting(&["booted"])))
    }
}

fn session_with(runtime: StubRuntime) -> SandboxSession {
    SandboxSession::with_runtime(Box::new(runtime), "tool-x")
}

/// Client pointing at a closed port; only used where the session is expected
/// to survive a content-fetch failure.
fn unreachable_client() -> GithubClient {
    GithubClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(1)).unwrap()
}

#[tokio::test]
async fn session_starts_runtime_ready_without_source() {
    let session = session_with(StubRuntime::emitting(&[]));
    let status = session.status();
    assert_eq!(status.phase, SessionPhase::RuntimeReady);
    assert!(status.code.is_none());
    assert!(status.output.is_empty());
}

#[tokio::test]
async fn installing_source_transitions_to_source_ready() {
    let session = session_with(StubRuntime::emitting(&[]));
    session.install_source("print('hi')".to_string());
    let status = session.status();
    assert_eq!(status.phase, SessionPhase::SourceReady);
    assert_eq!(status.code.as_deref(), Some("print('hi')"));
}

#[tokio::test]
async fn run_without_source_is_rejected() {
    let session = session_with(StubRuntime::emitting(&[]));
    let err = session.run(Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn run_captures_output_in_order() {
    let session = session_with(StubRuntime::emitting(&["one", "two", "three"]));
    session.install_source("code".to_string());
    session.run(Duration::from_secs(1)).await.unwrap();

    let status = session.status();
    assert_eq!(status.phase, SessionPhase::SourceReady);
    assert_eq!(status.output, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn each_run_clears_the_previous_output() {
    let session = session_with(StubRuntime::emitting(&["line"]));
    session.install_source("code".to_string());

    session.run(Duration::from_secs(1)).await.unwrap();
    session.run(Duration::from_secs(1)).await.unwrap();

    // Only one run's worth of output, never an accumulated tail.
    assert_eq!(session.status().output, vec!["line"]);
}

#[tokio::test]
async fn runtime_error_becomes_output_text_not_failure() {
    let session = session_with(StubRuntime {
        delay: Duration::ZERO,
        lines: vec!["partial".to_string()],
        fail_with: Some("boom".to_string()),
    });
    session.install_source("code".to_string());

    // The run itself succeeds; the session stays interactive.
    session.run(Duration::from_secs(1)).await.unwrap();

    let status = session.status();
    assert_eq!(status.phase, SessionPhase::SourceReady);
    assert_eq!(status.output[0], "partial");
    assert!(status.output[1].contains("boom"));
}

#[tokio::test]
async fn concurrent_run_is_rejected_and_does_not_reset_output() {
    let session = Arc::new(session_with(StubRuntime {
        delay: Duration::from_millis(300),
        lines: vec!["slow done".to_string()],
        fail_with: None,
    }));
    session.install_source("code".to_string());

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.run(Duration::from_secs(5)).await })
    };

    // Give the first run time to take the phase guard.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(session.status().phase, SessionPhase::Running);

    let err = session.run(Duration::from_secs(5)).await.unwrap_err();
    assert!(matches!(err, AppError::RunInFlight));

    first.await.unwrap().unwrap();
    let status = session.status();
    assert_eq!(status.phase, SessionPhase::SourceReady);
    assert_eq!(status.output, vec!["slow done"]);
}

#[tokio::test]
async fn execution_past_the_deadline_is_cut_off() {
    let session = session_with(StubRuntime {
        delay: Duration::from_secs(60),
        lines: vec!["never".to_string()],
        fail_with: None,
    });
    session.install_source("code".to_string());

    session.run(Duration::from_millis(100)).await.unwrap();

    let status = session.status();
    assert_eq!(status.phase, SessionPhase::SourceReady);
    assert_eq!(status.output.len(), 1);
    assert!(status.output[0].contains("timed out"));
}

#[tokio::test]
async fn bootstrap_failure_is_terminal_for_the_open() {
    let client = unreachable_client();
    let err = SandboxSession::open(&FailingLoader, &client, "alice", "tool-x")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::SandboxUnavailable(_)));
}

#[tokio::test]
async fn content_fetch_failure_leaves_session_usable_with_notice() {
    let client = unreachable_client();
    let session = SandboxSession::open(&StubLoader, &client, "alice", "tool-x")
        .await
        .unwrap();

    let status = session.status();
    assert_eq!(status.phase, SessionPhase::RuntimeReady);
    assert!(status.code.is_none());
    assert!(status.notice.is_some());
}
