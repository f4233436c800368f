//! Interpreter runtime capability and its CPython implementation.
//!
//! `RuntimeLoader` is the bootstrap seam: `load()` either produces a usable
//! runtime or fails terminally for the session. `SandboxRuntime::execute`
//! streams everything the interpreter writes on stdout/stderr, in emission
//! order, into the session's `OutputBuffer` — nothing reaches the host
//! console. A failed execution is reported as an error value, never a panic;
//! the session turns it into output text.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Runtime bootstrap failed; terminal for the session.
    #[error("Failed to initialize the Python environment: {0}")]
    Bootstrap(String),

    /// Infrastructure failure while executing (spawn, pipes). User-code
    /// failures are not errors — their tracebacks land in the output buffer.
    #[error("Execution failed: {0}")]
    Exec(String),
}

/// Order-preserving, shared buffer of captured output lines.
///
/// Cloned into the stdout/stderr pump tasks; a single lock keeps lines in
/// the order the interpreter emitted them.
#[derive(Clone, Default)]
pub struct OutputBuffer {
    lines: Arc<Mutex<Vec<String>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&self, line: &str) {
        self.lock().push(line.to_string());
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        // A poisoned buffer still holds valid lines; keep going.
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
pub trait SandboxRuntime: Send {
    /// Execute source text, appending stdout/stderr lines to `output`.
    async fn execute(&mut self, code: &str, output: &OutputBuffer)
        -> std::result::Result<(), RuntimeError>;
}

/// Bootstrap capability handed to the session; stubbed in tests.
#[async_trait]
pub trait RuntimeLoader: Send + Sync {
    async fn load(&self) -> std::result::Result<Box<dyn SandboxRuntime>, RuntimeError>;
}

/// Boots `PythonRuntime` instances backed by a local CPython interpreter.
///
/// The interpreter program path is the single configuration knob
/// (`--python`, default `python3`).
pub struct PythonLoader {
    program: String,
}

impl PythonLoader {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl RuntimeLoader for PythonLoader {
    async fn load(&self) -> std::result::Result<Box<dyn SandboxRuntime>, RuntimeError> {
        // Probe the interpreter up front so a missing binary fails the
        // bootstrap, not the first run.
        let status = Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| RuntimeError::Bootstrap(format!("{}: {}", self.program, e)))?;

        if !status.success() {
            return Err(RuntimeError::Bootstrap(format!(
                "{} --version exited with {}",
                self.program, status
            )));
        }

        tracing::info!("Python runtime ready ({})", self.program);
        Ok(Box::new(PythonRuntime {
            program: self.program.clone(),
        }))
    }
}

/// Runs source through `python -I -` (isolated mode, script on stdin).
/// Exclusive to one session; never shared across repositories.
pub struct PythonRuntime {
    program: String,
}

#[async_trait]
impl SandboxRuntime for PythonRuntime {
    async fn execute(
        &mut self,
        code: &str,
        output: &OutputBuffer,
    ) -> std::result::Result<(), RuntimeError> {
        let mut child = Command::new(&self.program)
            .arg("-I")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RuntimeError::Exec(format!("failed to start {}: {}", self.program, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RuntimeError::Exec("stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Exec("stdout unavailable".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RuntimeError::Exec("stderr unavailable".to_string()))?;

        let source = code.to_string();
        let feed = async move {
            let result = stdin.write_all(source.as_bytes()).await;
            let _ = stdin.shutdown().await;
            result
        };

        // Pump both streams while feeding stdin; the interpreter may exit
        // before consuming all input (syntax error), so feed errors are not
        // fatal — the traceback is already in the buffer.
        let (feed_result, _, _) = tokio::join!(
            feed,
            pump_lines(stdout, output.clone()),
            pump_lines(stderr, output.clone()),
        );
        if let Err(e) = feed_result {
            tracing::debug!("stdin feed ended early: {}", e);
        }

        child
            .wait()
            .await
            .map_err(|e| RuntimeError::Exec(e.to_string()))?;

        Ok(())
    }
}

async fn pump_lines<R: AsyncRead + Unpin>(reader: R, output: OutputBuffer) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        output.push_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_buffer_preserves_order() {
        let buffer = OutputBuffer::new();
        buffer.push_line("first");
        buffer.push_line("second");
        buffer.push_line("third");
        assert_eq!(buffer.snapshot(), vec!["first", "second", "third"]);
    }

    #[test]
    fn output_buffer_clear_empties_lines() {
        let buffer = OutputBuffer::new();
        buffer.push_line("stale");
        buffer.clear();
        assert!(buffer.snapshot().is_empty());
    }
}
