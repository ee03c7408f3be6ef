//! Engine implementation that spawns the real engine binary.
//!
//! Every run owns its child process and pipes. Input is written and both
//! output channels are drained concurrently so neither side can block the
//! other on a full pipe. When the time limit elapses or the batch is
//! cancelled the child is killed and reaped before returning.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use battle_core::error::{BattleError, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

use crate::engine::{cancelled_error, CancelToken, Engine, EngineOutput};

/// Runs the engine binary at a fixed path.
///
/// Owns a small tokio runtime that drives child processes and timers. The
/// blocking [`Engine`] methods must not be called from inside another tokio
/// runtime; async callers use [`ProcessEngine::run_async`] instead, which
/// runs on the caller's runtime. Dropping the engine shuts its runtime down
/// in the background, so it may be dropped from async code.
#[derive(Debug)]
pub struct ProcessEngine {
    path: PathBuf,
    // Always `Some` until dropped.
    runtime: Option<Runtime>,
}

impl ProcessEngine {
    /// Create an engine for the binary at `path`.
    ///
    /// The binary is not checked until the first run.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("battle-engine-io")
            .enable_all()
            .build()
            .map_err(|e| BattleError::engine_io("failed to start engine runtime", &e))?;

        Ok(Self {
            path: path.into(),
            runtime: Some(runtime),
        })
    }

    /// Path of the engine binary.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the engine from async code.
    pub async fn run_async(
        &self,
        seed: u32,
        input: &[u8],
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<EngineOutput> {
        run_engine(&self.path, seed, input, timeout, cancel).await
    }
}

impl Engine for ProcessEngine {
    fn run(&self, seed: u32, input: &[u8], timeout: Option<Duration>) -> Result<EngineOutput> {
        self.run_cancellable(seed, input, timeout, &CancelToken::new())
    }

    fn run_cancellable(
        &self,
        seed: u32,
        input: &[u8],
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<EngineOutput> {
        let Some(runtime) = &self.runtime else {
            return Err(BattleError::EngineFailure {
                status: None,
                message: "engine runtime has shut down".to_string(),
            });
        };
        runtime.block_on(run_engine(&self.path, seed, input, timeout, cancel))
    }
}

impl Drop for ProcessEngine {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Everything a finished child left behind.
struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

/// Why a run stopped before the child finished.
enum Interrupted {
    TimedOut(Duration),
    Cancelled,
}

async fn run_engine(
    path: &Path,
    seed: u32,
    input: &[u8],
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Result<EngineOutput> {
    if cancel.is_cancelled() {
        return Err(cancelled_error());
    }

    let mut child = Command::new(path)
        .arg(seed.to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| BattleError::engine_io(&format!("failed to spawn {}", path.display()), &e))?;

    let pid = child.id();
    debug!(?pid, seed, input_bytes = input.len(), "Spawned engine");

    let finished = tokio::select! {
        result = communicate(&mut child, input, timeout) => result,
        () = cancel.cancelled() => Err(Interrupted::Cancelled),
    };

    let captured = match finished {
        Ok(captured) => {
            captured.map_err(|e| BattleError::engine_io("engine pipe error", &e))?
        }
        Err(interrupted) => {
            // The exchange future is gone, so the pipes are already closed.
            if let Err(e) = child.kill().await {
                warn!(?pid, error = %e, "Failed to kill engine");
            }
            return Err(match interrupted {
                Interrupted::TimedOut(timeout) => {
                    warn!(?pid, seed, ?timeout, "Engine timed out and was killed");
                    BattleError::EngineTimeout { timeout }
                }
                Interrupted::Cancelled => {
                    debug!(?pid, seed, "Engine run cancelled");
                    cancelled_error()
                }
            });
        }
    };

    let stderr = String::from_utf8_lossy(&captured.stderr).into_owned();
    if !captured.status.success() {
        debug!(?pid, seed, status = ?captured.status, "Engine failed");
        return Err(BattleError::EngineFailure {
            status: captured.status.code(),
            message: stderr,
        });
    }

    if !stderr.trim().is_empty() {
        warn!(seed, diagnostics = %stderr.trim_end(), "Engine succeeded with diagnostic output");
    }
    debug!(?pid, seed, output_bytes = captured.stdout.len(), "Engine finished");

    Ok(EngineOutput {
        stdout: captured.stdout,
        stderr,
    })
}

/// Feed stdin, drain both outputs and wait for exit, within `timeout`.
async fn communicate(
    child: &mut Child,
    input: &[u8],
    timeout: Option<Duration>,
) -> std::result::Result<std::io::Result<Captured>, Interrupted> {
    let exchange = exchange(child, input);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, exchange)
            .await
            .map_err(|_| Interrupted::TimedOut(limit)),
        None => Ok(exchange.await),
    }
}

async fn exchange(child: &mut Child, input: &[u8]) -> std::io::Result<Captured> {
    let stdin = child.stdin.take();
    let mut stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
    let mut stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

    let write = async move {
        let Some(mut stdin) = stdin else {
            return Ok(());
        };
        match stdin.write_all(input).await {
            // The engine may exit without reading everything; its status decides.
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
            other => other,
        }
        // `stdin` drops here, closing the pipe so the engine sees EOF.
    };

    let mut out = Vec::new();
    let mut err = Vec::new();
    let (written, read_out, read_err) = tokio::join!(
        write,
        stdout.read_to_end(&mut out),
        stderr.read_to_end(&mut err)
    );
    written?;
    read_out?;
    read_err?;

    let status = child.wait().await?;
    Ok(Captured {
        status,
        stdout: out,
        stderr: err,
    })
}

fn missing_pipe(name: &str) -> std::io::Error {
    std::io::Error::other(format!("engine {name} was not captured"))
}
