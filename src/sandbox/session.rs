//! Sandbox session lifecycle and guarded execution.
//!
//! A session is created only after the runtime booted; source loading then
//! runs once. Selection policy for the entry file: the entry named `main.py`
//! (case-insensitive) wins, else the first `.py` file in listing order.
//! Inline base64 content is decoded directly; larger files are fetched from
//! their `download_url`. When neither is available the session stays usable
//! with a notice and nothing loaded.
//!
//! Execution is phase-guarded: `SourceReady → Running` happens under the
//! state lock, so a second run while one is in flight is rejected rather
//! than queued, and never touches the in-flight output buffer.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::github::{decode_base64, GithubClient};
use crate::models::{EntryType, RepoEntry, SandboxStatus, SessionPhase};
use crate::sandbox::interpreter::{OutputBuffer, RuntimeLoader, SandboxRuntime};

const ENTRY_POINT_NAME: &str = "main.py";
const SOURCE_EXTENSION: &str = ".py";

const NO_RUNNABLE_FILE_NOTICE: &str =
    "No Python file (.py) found in the root of this repository.";
const CONTENT_UNAVAILABLE_NOTICE: &str =
    "Python file found, but its content is not accessible.";

/// Deadline for a single execution; a hung script cannot block the session
/// forever.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SandboxSession {
    repo: String,
    /// Exclusive to this session; locked for the duration of one execution.
    runtime: tokio::sync::Mutex<Box<dyn SandboxRuntime>>,
    state: Mutex<SessionState>,
    output: OutputBuffer,
}

impl std::fmt::Debug for SandboxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxSession")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

struct SessionState {
    phase: SessionPhase,
    code: Option<String>,
    notice: Option<String>,
}

impl SandboxSession {
    /// Boot the runtime and load the repository's entry file. Bootstrap
    /// failure is terminal; source-loading failure is recoverable and leaves
    /// the session open with nothing loaded.
    pub async fn open(
        loader: &dyn RuntimeLoader,
        client: &GithubClient,
        owner: &str,
        repo: &str,
    ) -> Result<Self> {
        let runtime = loader
            .load()
            .await
            .map_err(|e| AppError::SandboxUnavailable(e.to_string()))?;

        let session = Self::with_runtime(runtime, repo);
        session.load_source(client, owner).await;
        Ok(session)
    }

    /// Session around an already-booted runtime, no source loaded yet.
    pub fn with_runtime(runtime: Box<dyn SandboxRuntime>, repo: &str) -> Self {
        Self {
            repo: repo.to_string(),
            runtime: tokio::sync::Mutex::new(runtime),
            state: Mutex::new(SessionState {
                phase: SessionPhase::RuntimeReady,
                code: None,
                notice: None,
            }),
            output: OutputBuffer::new(),
        }
    }

    /// Cache source text directly, transitioning to `SourceReady`.
    pub fn install_source(&self, code: String) {
        let mut state = self.lock_state();
        state.code = Some(code);
        state.notice = None;
        state.phase = SessionPhase::SourceReady;
    }

    async fn load_source(&self, client: &GithubClient, owner: &str) {
        match self.fetch_source(client, owner).await {
            Ok(Some(code)) => self.install_source(code),
            // Notice already recorded by fetch_source.
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("failed to load sandbox source: {}", e);
                self.set_notice(format!("Could not load the project files: {}", e));
            }
        }
    }

    async fn fetch_source(&self, client: &GithubClient, owner: &str) -> Result<Option<String>> {
        let entries = client.fetch_contents(owner, &self.repo).await?;

        let Some(entry) = select_entry_file(&entries) else {
            self.set_notice(NO_RUNNABLE_FILE_NOTICE.to_string());
            return Ok(None);
        };

        if let Some(content) = &entry.content {
            return decode_base64(content).map(Some);
        }
        if let Some(url) = &entry.download_url {
            return client.fetch_raw_file(url).await.map(Some);
        }

        self.set_notice(CONTENT_UNAVAILABLE_NOTICE.to_string());
        Ok(None)
    }

    /// Execute the cached source under the phase guard.
    ///
    /// Rejects with `RunInFlight` while a previous run has not settled. The
    /// output buffer is cleared synchronously before execution starts, so a
    /// stale run's tail never interleaves with the new run.
    pub async fn run(&self, deadline: Duration) -> Result<()> {
        let code = {
            let mut state = self.lock_state();
            match state.phase {
                SessionPhase::Running => return Err(AppError::RunInFlight),
                SessionPhase::RuntimeReady => {
                    return Err(AppError::BadRequest(
                        "No source file is loaded in this sandbox".to_string(),
                    ))
                }
                SessionPhase::SourceReady => {}
            }
            let code = state
                .code
                .clone()
                .ok_or_else(|| AppError::Internal("SourceReady without source".to_string()))?;
            state.phase = SessionPhase::Running;
            code
        };

        self.output.clear();

        let run_result = {
            let mut runtime = self.runtime.lock().await;
            tokio::time::timeout(deadline, runtime.execute(&code, &self.output)).await
        };

        // The run has settled, whatever the outcome; a poisoned lock must not
        // leave the phase stuck at Running.
        self.lock_state().phase = SessionPhase::SourceReady;

        match run_result {
            Ok(Ok(())) => {}
            // Runtime-raised errors become output text; the session stays
            // interactive.
            Ok(Err(e)) => self.output.push_line(&e.to_string()),
            Err(_) => self.output.push_line(&format!(
                "Execution timed out after {} seconds",
                deadline.as_secs()
            )),
        }

        Ok(())
    }

    pub fn status(&self) -> SandboxStatus {
        let state = self.lock_state();
        SandboxStatus {
            repo: self.repo.clone(),
            phase: state.phase,
            code: state.code.clone(),
            notice: state.notice.clone(),
            output: self.output.snapshot(),
        }
    }

    fn set_notice(&self, notice: String) {
        self.lock_state().notice = Some(notice);
    }

    /// Phase, code, and notice are plain values that stay coherent across a
    /// panic, so a poisoned lock is recovered rather than bricking the
    /// session.
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Entry-file selection policy: `main.py` (case-insensitive) first, else the
/// first `.py` file in listing order. Only file entries qualify.
pub fn select_entry_file(entries: &[RepoEntry]) -> Option<&RepoEntry> {
    entries
        .iter()
        .find(|e| {
            e.entry_type == EntryType::File && e.name.eq_ignore_ascii_case(ENTRY_POINT_NAME)
        })
        .or_else(|| {
            entries
                .iter()
                .find(|e| e.entry_type == EntryType::File && e.name.ends_with(SOURCE_EXTENSION))
        })
}
