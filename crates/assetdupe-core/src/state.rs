//! Cooperative cancellation handle shared by every stage of one scan.

use tokio_util::sync::CancellationToken;

use crate::error::ScanError;

/// Cancellation flag for a single scan.
///
/// Clones share the same flag. The caller keeps one clone and calls
/// [`ScanState::cancel`]; the pipeline polls [`ScanState::check`] between
/// filesystem operations. Once set, the flag is never cleared.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    token: CancellationToken,
}

impl ScanState {
    /// Create a state with cancellation not requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_canceled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fail with [`ScanError::Canceled`] once cancellation is requested.
    pub fn check(&self) -> Result<(), ScanError> {
        if self.is_canceled() {
            Err(ScanError::Canceled)
        } else {
            Ok(())
        }
    }

    /// Resolve when cancellation is requested.
    pub async fn canceled(&self) {
        self.token.cancelled().await;
    }
}
