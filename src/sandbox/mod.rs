//! Python sandbox: runtime bootstrap, source loading, guarded execution.
//!
//! The interpreter is an injected capability (`RuntimeLoader`) so tests can
//! substitute a stub; production boots a local CPython subprocess in
//! isolated mode. One session exists at a time, owned by the app state.

mod interpreter;
mod session;

pub use interpreter::{OutputBuffer, PythonLoader, RuntimeError, RuntimeLoader, SandboxRuntime};
pub use session::{select_entry_file, SandboxSession, RUN_TIMEOUT};
