//! Per-call cancellation and deadlines.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::errors::DocumentStoreError;

/// The caller's cancellation signal and optional deadline for one or more calls.
///
/// Cloning a context shares its cancellation token, so cancelling any clone
/// cancels every in-flight call that was handed one.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    token: CancellationToken,
    timeout: Option<Duration>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context driven by an existing cancellation token.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            token,
            timeout: None,
        }
    }

    /// Abandon each call that runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The token that cancels calls made with this context.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Cancel every call made with this context.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` to completion unless the context is cancelled or the
    /// deadline elapses first, in which case `fut` is dropped.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, DocumentStoreError>
    where
        F: Future<Output = Result<T, DocumentStoreError>>,
    {
        if self.token.is_cancelled() {
            return Err(DocumentStoreError::cancelled("cancelled before the request was sent"));
        }

        let bounded = async {
            match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| {
                    DocumentStoreError::cancelled(format!("deadline of {:?} elapsed", timeout))
                })?,
                None => fut.await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                Err(DocumentStoreError::cancelled("cancelled by caller"))
            }
            result = bounded => result,
        }
    }
}
