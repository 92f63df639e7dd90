use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// The deadline elapsed before the wrapped future finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("deadline exceeded")]
pub struct DeadlineExceeded;

/// Per-call context handed down from the tool dispatcher to every GitHub
/// round trip. Cancellation beyond the deadline is dropping the future.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
}

impl CallContext {
    /// No deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// `secs == 0` means no deadline, matching `GITHUB_HTTP_TIMEOUT_SECS=0`.
    pub fn from_timeout_secs(secs: u64) -> Self {
        if secs == 0 {
            Self::background()
        } else {
            Self::with_timeout(Duration::from_secs(secs))
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, DeadlineExceeded> {
        match self.deadline {
            Some(at) => tokio::time::timeout_at(at, fut)
                .await
                .map_err(|_| DeadlineExceeded),
            None => Ok(fut.await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_never_expires() {
        let ctx = CallContext::background();
        assert!(ctx.deadline().is_none());
        assert_eq!(ctx.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn expired_deadline_cancels_the_future() {
        let ctx = CallContext::with_timeout(Duration::from_millis(10));
        let out = ctx
            .run(tokio::time::sleep(Duration::from_secs(5)))
            .await;
        assert_eq!(out, Err(DeadlineExceeded));
    }

    #[test]
    fn zero_secs_disables_the_deadline() {
        assert!(CallContext::from_timeout_secs(0).deadline().is_none());
        assert!(CallContext::from_timeout_secs(5).deadline().is_some());
    }
}
