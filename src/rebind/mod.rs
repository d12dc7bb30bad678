//! Interactive rebinding.
//!
//! A rebind session moves the controller from `Idle` to `AwaitingInput` and back:
//!
//! 1. [`RebindController::start_rebind`] validates the binding slot, disables the whole
//!    action map, puts the view into its in-progress state and arms a capture on the
//!    input backend. It returns as soon as the capture is armed.
//! 2. A spawned task waits for the capture to complete, for an explicit
//!    [`cancel_rebind`](RebindController::cancel_rebind) or for the optional timeout.
//! 3. On any of those it releases the capture, updates the view label and re-enables
//!    the action map, in that order. The view's button comes back last, once a new
//!    session can be started.
//!
//! A capture that fires races with cancel and timeout; the capture always wins, so the
//! label on screen is the binding the backend stored.
//!
//! Only one session can be starting or awaiting input at a time; a second
//! `start_rebind` is rejected with [`RebindError::SessionActive`].

pub mod capture;

pub use capture::{CaptureCompleter, CaptureOperation};

use crate::backend::{InputBackend, InputError, RebindView};
use crate::metrics::Metrics;
use crate::models::{BindingSlot, ControllerConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot, watch};

/// Label shown on the rebind row while waiting for input.
pub const IN_PROGRESS_LABEL: &str = "...";

/// Errors raised by the rebind controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RebindError {
    #[error("Binding {slot} cannot be rebound: {source}")]
    Configuration {
        slot: BindingSlot,
        #[source]
        source: InputError,
    },

    #[error("A rebind for {0} is already waiting for input")]
    SessionActive(BindingSlot),

    #[error("No rebind in progress")]
    NoActiveSession,

    #[error("Capture operation {0} was already released")]
    DoubleRelease(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindState {
    Idle,
    AwaitingInput { slot: BindingSlot },
}

/// How a session left `AwaitingInput`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebindOutcome {
    /// The backend captured a new control.
    Completed,
    /// [`RebindController::cancel_rebind`] was called.
    Cancelled,
    /// The configured capture timeout elapsed.
    TimedOut,
    /// The backend dropped the capture without completing it.
    Aborted,
}

/// Events broadcast to [`RebindController::subscribe`] listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebindEvent {
    Started {
        slot: BindingSlot,
    },
    Finished {
        slot: BindingSlot,
        outcome: RebindOutcome,
        label: String,
    },
}

/// Controller options taken from [`ControllerConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebindOptions {
    /// Action map disabled for the duration of a session.
    pub action_map: String,
    pub capture_timeout: Option<Duration>,
}

impl From<&ControllerConfig> for RebindOptions {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            action_map: config.input.action_map.clone(),
            capture_timeout: config.rebind.capture_timeout(),
        }
    }
}

struct ActiveSession {
    id: u64,
    slot: BindingSlot,
    cancel_tx: Option<oneshot::Sender<()>>,
    /// `cancel_rebind` callers waiting for the outcome
    waiters: Vec<oneshot::Sender<RebindOutcome>>,
}

struct Inner {
    input: Arc<dyn InputBackend>,
    options: RebindOptions,
    metrics: Arc<Metrics>,
    session: Mutex<Option<ActiveSession>>,
    next_session_id: AtomicU64,
    state_tx: watch::Sender<RebindState>,
    event_tx: broadcast::Sender<RebindEvent>,
}

/// Drives interactive rebind sessions against an [`InputBackend`].
///
/// Cloning is cheap and every clone controls the same session. The session lock is
/// never held while the input backend or a [`RebindView`] is called, so views may call
/// back into the controller.
#[derive(Clone)]
pub struct RebindController {
    inner: Arc<Inner>,
    runtime: Handle,
}

impl RebindController {
    /// Create a controller. Session tasks are spawned on `runtime`.
    pub fn new(
        input: Arc<dyn InputBackend>,
        options: RebindOptions,
        metrics: Arc<Metrics>,
        runtime: Handle,
    ) -> Self {
        let (state_tx, _) = watch::channel(RebindState::Idle);
        let (event_tx, _) = broadcast::channel(32);
        Self {
            inner: Arc::new(Inner {
                input,
                options,
                metrics,
                session: Mutex::new(None),
                next_session_id: AtomicU64::new(1),
                state_tx,
                event_tx,
            }),
            runtime,
        }
    }

    pub fn state(&self) -> RebindState {
        *self.inner.state_tx.borrow()
    }

    pub fn is_awaiting_input(&self) -> bool {
        matches!(self.state(), RebindState::AwaitingInput { .. })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RebindEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<RebindState> {
        self.inner.state_tx.subscribe()
    }

    /// Human-readable label for the control currently bound to `slot`.
    pub fn binding_label(&self, slot: BindingSlot) -> Option<String> {
        self.inner.binding_label(slot)
    }

    /// Start capturing a new control for `slot`.
    ///
    /// On success the action map is disabled, `view` shows [`IN_PROGRESS_LABEL`] with
    /// its button disabled, and the capture is armed. Returns immediately; the session
    /// finishes on a spawned task.
    ///
    /// # Errors
    ///
    /// - [`RebindError::SessionActive`] if another session is starting or awaiting input
    /// - [`RebindError::Configuration`] if the backend rejects the slot. The action map
    ///   and the view are left as they were.
    pub fn start_rebind(
        &self,
        slot: BindingSlot,
        view: Arc<dyn RebindView>,
    ) -> Result<(), RebindError> {
        let inner = &self.inner;
        let id = inner.next_session_id.fetch_add(1, Ordering::Relaxed);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        // Reserve the controller, then let go of the lock before touching the backend.
        {
            let mut session = inner.lock_session();
            if let Some(active) = session.as_ref() {
                inner.metrics.record_rebind_rejected();
                tracing::warn!(
                    "Rejecting rebind of {}: {} is still waiting for input",
                    slot,
                    active.slot
                );
                return Err(RebindError::SessionActive(active.slot));
            }
            *session = Some(ActiveSession {
                id,
                slot,
                cancel_tx: Some(cancel_tx),
                waiters: Vec::new(),
            });
        }

        if let Err(source) = inner.input.validate_slot(slot) {
            tracing::error!("Cannot rebind {}: {}", slot, source);
            inner.clear_session(id);
            return Err(RebindError::Configuration { slot, source });
        }

        let previous_label = inner.binding_label(slot);

        // The whole map goes quiet so the key being captured can't trigger gameplay.
        inner.input.disable_group(&inner.options.action_map);
        view.set_label(IN_PROGRESS_LABEL);
        view.set_interactable(false);

        let operation = match inner.input.begin_interactive_capture(slot) {
            Ok(operation) => operation,
            Err(source) => {
                tracing::error!("Input backend failed to arm capture for {}: {}", slot, source);
                view.set_label(previous_label.as_deref().unwrap_or_default());
                inner.input.enable_group(&inner.options.action_map);
                inner.clear_session(id);
                view.set_interactable(true);
                return Err(RebindError::Configuration { slot, source });
            }
        };

        inner.state_tx.send_replace(RebindState::AwaitingInput { slot });
        inner.metrics.record_rebind_started();
        let _ = inner.event_tx.send(RebindEvent::Started { slot });

        tracing::info!(
            "Rebind session {} started for {} (capture {})",
            id,
            slot,
            operation.id()
        );

        let task_inner = Arc::clone(inner);
        self.runtime.spawn(async move {
            task_inner
                .await_capture(id, slot, operation, cancel_rx, view, previous_label)
                .await;
        });

        Ok(())
    }

    /// Cancel the current session and wait for it to finish.
    ///
    /// Returns the outcome the session actually ended with. That is
    /// [`RebindOutcome::Completed`] when the backend had already captured a control,
    /// in which case the new binding stays and the view shows it.
    ///
    /// # Errors
    ///
    /// [`RebindError::NoActiveSession`] if nothing is starting or awaiting input, or the
    /// session failed to start.
    pub async fn cancel_rebind(&self) -> Result<RebindOutcome, RebindError> {
        let (slot, reply_rx) = {
            let mut session = self.inner.lock_session();
            let Some(active) = session.as_mut() else {
                return Err(RebindError::NoActiveSession);
            };
            if let Some(cancel_tx) = active.cancel_tx.take() {
                let _ = cancel_tx.send(());
            }
            let (reply_tx, reply_rx) = oneshot::channel();
            active.waiters.push(reply_tx);
            (active.slot, reply_rx)
        };

        tracing::info!("Cancelling rebind of {}", slot);
        reply_rx.await.map_err(|_| RebindError::NoActiveSession)
    }

    /// Wait until no session is awaiting input.
    pub async fn wait_idle(&self) {
        let mut state_rx = self.inner.state_tx.subscribe();
        let _ = state_rx
            .wait_for(|state| *state == RebindState::Idle)
            .await;
    }
}

impl Inner {
    fn lock_session(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop session `id` and publish Idle. Returns its cancel waiters.
    fn clear_session(&self, id: u64) -> Vec<oneshot::Sender<RebindOutcome>> {
        let mut session = self.lock_session();
        if !session.as_ref().is_some_and(|active| active.id == id) {
            return Vec::new();
        }
        let waiters = session.take().map(|active| active.waiters).unwrap_or_default();
        // Published under the lock so a session started right after is never
        // overwritten by this Idle.
        self.state_tx.send_replace(RebindState::Idle);
        waiters
    }

    fn binding_label(&self, slot: BindingSlot) -> Option<String> {
        let path = self.input.effective_path(slot)?;
        Some(self.input.format_path_for_display(&path, true))
    }

    async fn await_capture(
        self: Arc<Self>,
        id: u64,
        slot: BindingSlot,
        mut operation: CaptureOperation,
        cancel_rx: oneshot::Receiver<()>,
        view: Arc<dyn RebindView>,
        previous_label: Option<String>,
    ) {
        let capture_timeout = self.options.capture_timeout;
        let deadline = async move {
            match capture_timeout {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };

        // A capture that already fired wins over a cancel or timeout arriving with it.
        let outcome = tokio::select! {
            biased;
            fired = operation.completed() => {
                if fired { RebindOutcome::Completed } else { RebindOutcome::Aborted }
            }
            _ = cancel_rx => RebindOutcome::Cancelled,
            _ = deadline => RebindOutcome::TimedOut,
        };

        self.finish(id, slot, operation, view, previous_label, outcome);
    }

    fn finish(
        &self,
        id: u64,
        slot: BindingSlot,
        mut operation: CaptureOperation,
        view: Arc<dyn RebindView>,
        previous_label: Option<String>,
        outcome: RebindOutcome,
    ) {
        if let Err(err) = operation.release() {
            tracing::error!("Rebind session {} for {}: {}", id, slot, err);
        }

        // The backend may have delivered between the wait ending and the release.
        // Once released it cannot fire any more, so this check is final.
        let fired_late = matches!(outcome, RebindOutcome::Cancelled | RebindOutcome::TimedOut)
            && operation.try_completed();
        let outcome = if fired_late {
            tracing::debug!("Capture for {} fired before the {:?} took effect", slot, outcome);
            RebindOutcome::Completed
        } else {
            outcome
        };

        let label = match outcome {
            RebindOutcome::Completed => self.binding_label(slot).unwrap_or_else(|| {
                tracing::warn!("Capture for {} completed but the slot has no path", slot);
                String::new()
            }),
            _ => previous_label.unwrap_or_default(),
        };

        view.set_label(&label);

        // Only after the capture is released, so captured input can't leak into gameplay.
        self.input.enable_group(&self.options.action_map);

        let waiters = self.clear_session(id);

        match outcome {
            RebindOutcome::Completed => {
                self.metrics.record_rebind_completed();
                tracing::info!("Rebind session {} bound {} to '{}'", id, slot, label);
            }
            RebindOutcome::Cancelled => {
                self.metrics.record_rebind_cancelled();
                tracing::info!("Rebind session {} for {} cancelled", id, slot);
            }
            RebindOutcome::TimedOut => {
                self.metrics.record_rebind_timed_out();
                tracing::warn!("Rebind session {} for {} timed out", id, slot);
            }
            RebindOutcome::Aborted => {
                self.metrics.record_rebind_aborted();
                tracing::warn!("Input backend abandoned capture for {}", slot);
            }
        }

        let _ = self.event_tx.send(RebindEvent::Finished {
            slot,
            outcome,
            label,
        });

        // The session is already cleared, so the view may start the next one from here.
        view.set_interactable(true);

        for waiter in waiters {
            let _ = waiter.send(outcome);
        }
    }
}
