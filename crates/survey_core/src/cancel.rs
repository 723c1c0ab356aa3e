//! Cooperative cancellation checks for store operations.
//!
//! # Invariants
//! - A cancelled token is observed before any statement is issued.
//! - Cancellation is never preemptive; callers check at operation boundaries.

use std::error::Error;
use std::fmt::{Display, Formatter};
use tokio_util::sync::CancellationToken;

/// Marker error returned when a caller-supplied token has been cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl Display for Cancelled {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation cancelled")
    }
}

impl Error for Cancelled {}

/// Returns `Err(Cancelled)` when `token` has been cancelled.
pub fn ensure_active(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        return Err(Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_active, Cancelled};
    use tokio_util::sync::CancellationToken;

    #[test]
    fn active_token_passes() {
        let token = CancellationToken::new();
        assert_eq!(ensure_active(&token), Ok(()));
    }

    #[test]
    fn cancelled_child_token_is_observed() {
        let parent = CancellationToken::new();
        let child = parent.child_token();
        parent.cancel();
        assert_eq!(ensure_active(&child), Err(Cancelled));
    }
}
