//! Engine capability: run one engagement for one seed.
//!
//! [`ProcessEngine`](crate::process::ProcessEngine) is the production
//! implementation. Tests substitute in-memory engines that return canned
//! output without spawning anything.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use battle_core::error::{BattleError, Result};
use tokio::sync::Notify;

/// Captured output of a successful engine run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// Primary output, handed to the decoder.
    pub stdout: Vec<u8>,
    /// Diagnostic output. Advisory only when the run succeeded.
    pub stderr: String,
}

impl EngineOutput {
    /// Output with the given stdout and no diagnostics.
    pub fn new(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Something that can run the combat engine.
///
/// Implementations must return `Ok` only when the engine exited successfully,
/// [`BattleError::EngineTimeout`] when `timeout` elapsed (after making sure
/// nothing keeps running), and [`BattleError::EngineFailure`] for any other
/// failure, carrying the engine's diagnostics.
///
/// [`BattleError::EngineTimeout`]: battle_core::error::BattleError::EngineTimeout
/// [`BattleError::EngineFailure`]: battle_core::error::BattleError::EngineFailure
pub trait Engine: Send + Sync {
    /// Run the engine once with `seed` and `input` on stdin.
    fn run(&self, seed: u32, input: &[u8], timeout: Option<Duration>) -> Result<EngineOutput>;

    /// Like [`Engine::run`], but stop early once `cancel` fires.
    ///
    /// The default refuses to start once `cancel` has fired; a run that has
    /// already started goes to completion.
    fn run_cancellable(
        &self,
        seed: u32,
        input: &[u8],
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<EngineOutput> {
        if cancel.is_cancelled() {
            return Err(cancelled_error());
        }
        self.run(seed, input, timeout)
    }
}

impl<E: Engine + ?Sized> Engine for Arc<E> {
    fn run(&self, seed: u32, input: &[u8], timeout: Option<Duration>) -> Result<EngineOutput> {
        (**self).run(seed, input, timeout)
    }

    fn run_cancellable(
        &self,
        seed: u32,
        input: &[u8],
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> Result<EngineOutput> {
        (**self).run_cancellable(seed, input, timeout, cancel)
    }
}

/// Error returned for runs stopped by a [`CancelToken`].
pub(crate) fn cancelled_error() -> BattleError {
    BattleError::EngineFailure {
        status: None,
        message: "run cancelled".to_string(),
    }
}

/// Shared flag telling in-flight runs of a batch to give up.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<CancelState>,
}

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    /// Create a token that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Whether the token has fired.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until the token fires.
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
    }

    struct Counting(std::sync::atomic::AtomicUsize);

    impl Engine for Counting {
        fn run(&self, _: u32, _: &[u8], _: Option<Duration>) -> Result<EngineOutput> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(EngineOutput::new("0"))
        }
    }

    #[test]
    fn test_default_run_cancellable_respects_fired_token() {
        let engine = Counting(std::sync::atomic::AtomicUsize::new(0));
        let cancel = CancelToken::new();
        assert!(engine.run_cancellable(1, b"", None, &cancel).is_ok());

        cancel.cancel();
        let err = engine.run_cancellable(1, b"", None, &cancel).unwrap_err();
        assert_eq!(err, cancelled_error());
        assert_eq!(engine.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let token = CancelToken::new();
        let waiter = {
            let token = token.clone();
            tokio::spawn(async move { token.cancelled().await })
        };
        tokio::task::yield_now().await;
        token.cancel();
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_fired() {
        let token = CancelToken::new();
        token.cancel();
        token.cancelled().await;
    }
}
