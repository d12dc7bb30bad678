use super::RebindError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;

static NEXT_CAPTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Backend side of a capture: fires the completion exactly once.
///
/// Consumed by [`complete`](Self::complete), so a second completion cannot be expressed.
#[derive(Debug)]
pub struct CaptureCompleter {
    id: u64,
    tx: oneshot::Sender<()>,
}

impl CaptureCompleter {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Signal that the new binding has been written.
    ///
    /// Returns false when the controller side is already gone (cancelled or timed out).
    pub fn complete(self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Controller side of an interactive capture armed by an [`InputBackend`](crate::backend::InputBackend).
///
/// Holds the single-shot completion channel and the backend's release hook. The hook
/// runs exactly once: through [`release`](Self::release), or on drop if nobody released
/// the operation explicitly.
pub struct CaptureOperation {
    id: u64,
    completion: Option<oneshot::Receiver<()>>,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl CaptureOperation {
    /// Create a connected completer/operation pair.
    ///
    /// `on_release` should stop the backend listener and free whatever the capture holds.
    pub fn pair<F>(on_release: F) -> (CaptureCompleter, CaptureOperation)
    where
        F: FnOnce() + Send + 'static,
    {
        let id = NEXT_CAPTURE_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        (
            CaptureCompleter { id, tx },
            CaptureOperation {
                id,
                completion: Some(rx),
                on_release: Some(Box::new(on_release)),
            },
        )
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_released(&self) -> bool {
        self.on_release.is_none()
    }

    /// Wait for the backend to complete the capture.
    ///
    /// Resolves to false if the completer was dropped without firing, or if this
    /// operation already finished waiting once.
    pub async fn completed(&mut self) -> bool {
        let Some(rx) = self.completion.as_mut() else {
            return false;
        };
        let fired = rx.await.is_ok();
        self.completion = None;
        fired
    }

    /// Non-blocking check for a completion that has already been sent.
    ///
    /// Consumes the completion like [`completed`](Self::completed) does.
    pub fn try_completed(&mut self) -> bool {
        let Some(rx) = self.completion.as_mut() else {
            return false;
        };
        match rx.try_recv() {
            Ok(()) => {
                self.completion = None;
                true
            }
            Err(_) => false,
        }
    }

    /// Release the backend resources behind this capture.
    ///
    /// A second call is a programming error and is reported as [`RebindError::DoubleRelease`].
    pub fn release(&mut self) -> Result<(), RebindError> {
        match self.on_release.take() {
            Some(release) => {
                release();
                tracing::debug!("Released capture operation {}", self.id);
                Ok(())
            }
            None => {
                tracing::error!("Capture operation {} released twice", self.id);
                Err(RebindError::DoubleRelease(self.id))
            }
        }
    }
}

impl fmt::Debug for CaptureOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureOperation")
            .field("id", &self.id)
            .field("pending", &self.completion.is_some())
            .field("released", &self.is_released())
            .finish()
    }
}

impl Drop for CaptureOperation {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.take() {
            tracing::warn!("Capture operation {} dropped without release", self.id);
            release();
        }
    }
}
