//! Cooperative cancellation with optional wall-clock deadlines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::calculator::FibError;

/// Cooperative cancellation token with an optional deadline.
///
/// Clones share the manual cancellation flag and the deadline. The token is
/// considered cancelled if either `cancel()` was called or the deadline has
/// passed.
///
/// # Example
/// ```
/// use fibmemo_core::progress::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check_cancelled().is_err());
/// ```
#[derive(Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancellationToken {
    /// Create a token that is only cancelled manually.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Create a token that expires `budget` from now.
    #[must_use]
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some((Instant::now() + budget, budget)),
        }
    }

    /// Derive a token sharing this token's cancellation flag but with its own deadline.
    #[must_use]
    pub fn child_with_timeout(&self, budget: Duration) -> Self {
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline: Some((Instant::now() + budget, budget)),
        }
    }

    /// Check if cancellation has been requested (either manual or timeout).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed) || self.is_expired()
    }

    fn is_expired(&self) -> bool {
        self.deadline
            .is_some_and(|(deadline, _)| Instant::now() >= deadline)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check for cancellation, returning an error if cancelled.
    ///
    /// Manual cancellation wins over an expired deadline.
    ///
    /// ```
    /// use std::time::Duration;
    /// use fibmemo_core::progress::CancellationToken;
    /// use fibmemo_core::FibError;
    ///
    /// let token = CancellationToken::with_timeout(Duration::ZERO);
    /// assert_eq!(token.check_cancelled(), Err(FibError::Timeout(Duration::ZERO)));
    /// ```
    pub fn check_cancelled(&self) -> Result<(), FibError> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(FibError::Cancelled);
        }
        match self.deadline {
            Some((deadline, budget)) if Instant::now() >= deadline => {
                Err(FibError::Timeout(budget))
            }
            _ => Ok(()),
        }
    }

    /// Remaining time before the deadline, or `None` if there is no deadline.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|(deadline, _)| deadline.saturating_duration_since(Instant::now()))
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn check_cancelled_ok() {
        let token = CancellationToken::new();
        assert!(token.check_cancelled().is_ok());
        assert_eq!(token.remaining(), None);
    }

    #[test]
    fn check_cancelled_err() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(token.check_cancelled(), Err(FibError::Cancelled));
    }

    #[test]
    fn timeout_token_not_expired() {
        let token = CancellationToken::with_timeout(Duration::from_secs(60));
        assert!(!token.is_cancelled());
        assert!(token.check_cancelled().is_ok());
        assert!(token.remaining().unwrap() > Duration::from_secs(0));
    }

    #[test]
    fn timeout_token_manual_cancel() {
        let token = CancellationToken::with_timeout(Duration::from_secs(60));
        token.cancel();
        assert!(token.is_cancelled());
        assert_eq!(token.check_cancelled(), Err(FibError::Cancelled));
    }

    #[test]
    fn timeout_token_expired() {
        let token = CancellationToken::with_timeout(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(1));
        assert!(token.is_cancelled());
        assert_eq!(
            token.check_cancelled(),
            Err(FibError::Timeout(Duration::from_millis(0)))
        );
    }

    #[test]
    fn child_shares_flag_not_deadline() {
        let parent = CancellationToken::new();
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert!(child.check_cancelled().is_ok());
        parent.cancel();
        assert_eq!(child.check_cancelled(), Err(FibError::Cancelled));

        let expired = CancellationToken::new().child_with_timeout(Duration::ZERO);
        assert!(matches!(expired.check_cancelled(), Err(FibError::Timeout(_))));
    }

    #[test]
    fn cancellation_propagates_through_clone() {
        let token1 = CancellationToken::new();
        let token2 = token1.clone();
        token1.cancel();
        assert!(token2.is_cancelled());
    }
}
