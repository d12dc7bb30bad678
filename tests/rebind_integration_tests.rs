//! Integration tests for RebindController against the in-memory input backend
//!
//! These tests verify that a rebind session:
//! - Disables the action map while waiting and re-enables it only after release
//! - Labels the view with the newly captured control
//! - Restores the previous label on cancel, timeout and abandoned captures
//! - Refuses a second session while one is waiting

use gamesettings::backend::memory::{InputEvent, MemoryInput, RecordingView, ViewEvent};
use gamesettings::backend::{InputBackend, RebindView};
use gamesettings::metrics::Metrics;
use gamesettings::rebind::{IN_PROGRESS_LABEL, RebindOptions};
use gamesettings::{
    BindingSlot, RebindController, RebindError, RebindEvent, RebindOutcome, RebindState,
};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use tokio::time::{Duration, timeout};

const MAP: &str = "Player";

struct Fixture {
    input: Arc<MemoryInput>,
    controller: RebindController,
    metrics: Arc<Metrics>,
    jump: BindingSlot,
    crouch: BindingSlot,
}

fn fixture(capture_timeout: Option<Duration>) -> Fixture {
    let input = Arc::new(MemoryInput::new());
    let jump = input.add_action(MAP, "Jump", &["<Keyboard>/space", "<Gamepad>/buttonSouth"]);
    let crouch = input.add_action(MAP, "Crouch", &["<Keyboard>/leftCtrl"]);
    input.add_action("Menu", "Back", &["<Keyboard>/escape"]);

    let metrics = Arc::new(Metrics::new());
    let controller = RebindController::new(
        input.clone() as Arc<dyn InputBackend>,
        RebindOptions {
            action_map: MAP.to_string(),
            capture_timeout,
        },
        Arc::clone(&metrics),
        tokio::runtime::Handle::current(),
    );

    Fixture {
        input,
        controller,
        metrics,
        jump: BindingSlot::new(jump, 0),
        crouch: BindingSlot::new(crouch, 0),
    }
}

async fn settle(controller: &RebindController) {
    timeout(Duration::from_secs(2), controller.wait_idle())
        .await
        .expect("Timeout waiting for rebind to finish");
}

#[tokio::test]
async fn test_completed_rebind_journal_order() {
    let f = fixture(None);
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view.clone()).unwrap();

    assert_eq!(f.controller.state(), RebindState::AwaitingInput { slot: f.jump });
    assert!(!f.input.is_group_enabled(MAP));
    assert!(f.input.is_group_enabled("Menu"));
    assert!(f.input.is_capturing(f.jump));
    assert_eq!(view.label(), IN_PROGRESS_LABEL);
    assert!(!view.is_interactable());

    assert!(f.input.press("<Keyboard>/j"));
    settle(&f.controller).await;

    assert_eq!(
        f.input.journal(),
        vec![
            InputEvent::GroupDisabled(MAP.to_string()),
            InputEvent::CaptureArmed(f.jump),
            InputEvent::CaptureCompleted {
                slot: f.jump,
                path: "<Keyboard>/j".to_string(),
            },
            InputEvent::CaptureReleased(f.jump),
            InputEvent::GroupEnabled(MAP.to_string()),
        ]
    );
    assert!(!f.input.is_capturing(f.jump));
    assert!(f.input.is_group_enabled(MAP));
}

#[tokio::test]
async fn test_completed_rebind_labels_new_binding() {
    let f = fixture(None);
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view.clone()).unwrap();
    f.input.press("<Keyboard>/leftShift");
    settle(&f.controller).await;

    let path = f.input.effective_path(f.jump).unwrap();
    assert_eq!(path, "<Keyboard>/leftShift");
    assert_eq!(view.label(), f.input.format_path_for_display(&path, true));
    assert_eq!(view.label(), "Left Shift");
    assert!(view.is_interactable());
    assert_eq!(
        view.history(),
        vec![
            ViewEvent::Label(IN_PROGRESS_LABEL.to_string()),
            ViewEvent::Interactable(false),
            ViewEvent::Label("Left Shift".to_string()),
            ViewEvent::Interactable(true),
        ]
    );
    assert_eq!(f.controller.binding_label(f.jump).as_deref(), Some("Left Shift"));
}

#[tokio::test]
async fn test_captured_control_triggers_action_after_rebind() {
    let f = fixture(None);
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view).unwrap();
    f.input.press("<Keyboard>/j");
    settle(&f.controller).await;

    // The press consumed by the capture never reached gameplay
    assert!(
        !f.input
            .journal()
            .iter()
            .any(|event| matches!(event, InputEvent::ActionTriggered(_)))
    );

    assert!(!f.input.press("<Keyboard>/j"));
    assert_eq!(
        f.input.journal().last(),
        Some(&InputEvent::ActionTriggered(f.jump.action))
    );
}

#[tokio::test]
async fn test_second_rebind_rejected_while_waiting() {
    let f = fixture(None);
    let jump_view = Arc::new(RecordingView::new("Space"));
    let crouch_view = Arc::new(RecordingView::new("Left Ctrl"));

    f.controller.start_rebind(f.jump, jump_view.clone()).unwrap();
    let result = f.controller.start_rebind(f.crouch, crouch_view.clone());

    assert_eq!(result, Err(RebindError::SessionActive(f.jump)));
    assert!(crouch_view.history().is_empty());
    assert!(!f.input.is_capturing(f.crouch));
    assert_eq!(f.metrics.rebinds_rejected.load(Ordering::Relaxed), 1);

    // The first session is untouched and still completes normally
    f.input.press("<Keyboard>/k");
    settle(&f.controller).await;
    assert_eq!(jump_view.label(), "K");

    // And a new session can start afterwards
    f.controller.start_rebind(f.crouch, crouch_view).unwrap();
    assert_eq!(
        f.controller.cancel_rebind().await,
        Ok(RebindOutcome::Cancelled)
    );
}

#[tokio::test]
async fn test_cancel_restores_previous_label() {
    let f = fixture(None);
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view.clone()).unwrap();
    let outcome = timeout(Duration::from_secs(2), f.controller.cancel_rebind())
        .await
        .expect("Timeout cancelling rebind")
        .unwrap();

    assert_eq!(outcome, RebindOutcome::Cancelled);

    assert_eq!(f.controller.state(), RebindState::Idle);
    assert_eq!(view.label(), "Space");
    assert!(view.is_interactable());
    assert!(f.input.is_group_enabled(MAP));
    assert_eq!(
        f.input.journal(),
        vec![
            InputEvent::GroupDisabled(MAP.to_string()),
            InputEvent::CaptureArmed(f.jump),
            InputEvent::CaptureReleased(f.jump),
            InputEvent::GroupEnabled(MAP.to_string()),
        ]
    );
    assert_eq!(
        f.input.effective_path(f.jump).as_deref(),
        Some("<Keyboard>/space")
    );
    assert_eq!(f.metrics.rebinds_cancelled.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_cancel_without_session() {
    let f = fixture(None);
    assert_eq!(
        f.controller.cancel_rebind().await,
        Err(RebindError::NoActiveSession)
    );
}

#[tokio::test]
async fn test_capture_timeout() {
    let f = fixture(Some(Duration::from_millis(50)));
    let mut events = f.controller.subscribe();
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view.clone()).unwrap();
    settle(&f.controller).await;

    assert_eq!(
        events.recv().await.unwrap(),
        RebindEvent::Started { slot: f.jump }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        RebindEvent::Finished {
            slot: f.jump,
            outcome: RebindOutcome::TimedOut,
            label: "Space".to_string(),
        }
    );
    assert_eq!(view.label(), "Space");
    assert!(f.input.is_group_enabled(MAP));
    assert!(!f.input.is_capturing(f.jump));
    assert_eq!(f.metrics.rebinds_timed_out.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_abandoned_capture_aborts_session() {
    let f = fixture(None);
    let mut events = f.controller.subscribe();
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view.clone()).unwrap();
    assert!(f.input.abandon_capture());
    settle(&f.controller).await;

    let _started = events.recv().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        RebindEvent::Finished {
            slot: f.jump,
            outcome: RebindOutcome::Aborted,
            label: "Space".to_string(),
        }
    );
    assert!(f.input.is_group_enabled(MAP));
    assert_eq!(f.metrics.rebinds_aborted.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn test_invalid_slot_leaves_map_enabled() {
    let f = fixture(None);
    let view = Arc::new(RecordingView::new("Left Ctrl"));
    let slot = BindingSlot::new(f.crouch.action, 3);

    let result = f.controller.start_rebind(slot, view.clone());

    assert!(matches!(result, Err(RebindError::Configuration { slot: s, .. }) if s == slot));
    assert_eq!(f.controller.state(), RebindState::Idle);
    assert!(f.input.is_group_enabled(MAP));
    assert!(f.input.journal().is_empty());
    assert!(view.history().is_empty());
    assert_eq!(f.metrics.rebinds_started.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn test_finished_event_carries_label() {
    let f = fixture(None);
    let mut events = f.controller.subscribe();
    let view = Arc::new(RecordingView::new("Button South"));
    let slot = BindingSlot::new(f.jump.action, 1);

    f.controller.start_rebind(slot, view).unwrap();
    f.input.press("<Gamepad>/buttonNorth");
    settle(&f.controller).await;

    let _started = events.recv().await.unwrap();
    assert_eq!(
        events.recv().await.unwrap(),
        RebindEvent::Finished {
            slot,
            outcome: RebindOutcome::Completed,
            label: "Button North".to_string(),
        }
    );
    assert_eq!(f.metrics.rebinds_finished(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn test_capture_wins_over_cancel_sent_right_after() {
    let f = fixture(None);
    let mut events = f.controller.subscribe();

    for round in 0..64 {
        let view = Arc::new(RecordingView::new("Space"));
        let key = if round % 2 == 0 { "<Keyboard>/j" } else { "<Keyboard>/space" };

        f.controller.start_rebind(f.jump, view.clone()).unwrap();
        // The capture fires and the cancel arrives before the session task runs
        assert!(f.input.press(key));
        let outcome = timeout(Duration::from_secs(2), f.controller.cancel_rebind())
            .await
            .expect("Timeout cancelling rebind");

        assert_eq!(outcome, Ok(RebindOutcome::Completed), "round {}", round);

        let path = f.input.effective_path(f.jump).unwrap();
        assert_eq!(path, key);
        assert_eq!(view.label(), f.input.format_path_for_display(&path, true));

        assert_eq!(events.recv().await.unwrap(), RebindEvent::Started { slot: f.jump });
        match events.recv().await.unwrap() {
            RebindEvent::Finished { outcome, label, .. } => {
                assert_eq!(outcome, RebindOutcome::Completed, "round {}", round);
                assert_eq!(label, view.label());
            }
            other => panic!("Expected Finished event, got: {:?}", other),
        }
    }

    assert_eq!(f.metrics.rebinds_completed.load(Ordering::Relaxed), 64);
    assert_eq!(f.metrics.rebinds_cancelled.load(Ordering::Relaxed), 0);
    assert!(f.input.is_group_enabled(MAP));
}

#[tokio::test(flavor = "current_thread")]
async fn test_capture_wins_over_timeout() {
    let f = fixture(Some(Duration::from_millis(1)));
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view.clone()).unwrap();
    // Let the session task arm its deadline, then block the only worker past it
    tokio::task::yield_now().await;
    std::thread::sleep(std::time::Duration::from_millis(20));
    assert!(f.input.press("<Keyboard>/q"));
    settle(&f.controller).await;

    assert_eq!(view.label(), "Q");
    assert_eq!(f.metrics.rebinds_completed.load(Ordering::Relaxed), 1);
    assert_eq!(f.metrics.rebinds_timed_out.load(Ordering::Relaxed), 0);
}

/// Starts the next rebind as soon as its button is re-enabled.
struct ChainedView {
    inner: RecordingView,
    controller: RebindController,
    next: Mutex<Option<(BindingSlot, Arc<RecordingView>)>>,
    chained: Mutex<Option<Result<(), RebindError>>>,
}

impl RebindView for ChainedView {
    fn set_label(&self, text: &str) {
        self.inner.set_label(text);
    }

    fn set_interactable(&self, enabled: bool) {
        self.inner.set_interactable(enabled);
        if !enabled {
            return;
        }
        let next = self.next.lock().unwrap().take();
        if let Some((slot, view)) = next {
            let result = self.controller.start_rebind(slot, view);
            *self.chained.lock().unwrap() = Some(result);
        }
    }
}

#[tokio::test]
async fn test_view_can_start_next_rebind_when_reenabled() {
    let f = fixture(None);
    let crouch_view = Arc::new(RecordingView::new("Left Ctrl"));
    let view = Arc::new(ChainedView {
        inner: RecordingView::new("Space"),
        controller: f.controller.clone(),
        next: Mutex::new(Some((f.crouch, crouch_view.clone()))),
        chained: Mutex::new(None),
    });

    f.controller.start_rebind(f.jump, view.clone()).unwrap();
    f.input.press("<Keyboard>/j");

    timeout(Duration::from_secs(2), async {
        while !f.input.is_capturing(f.crouch) {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("Chained rebind never started");

    assert_eq!(*view.chained.lock().unwrap(), Some(Ok(())));
    assert_eq!(view.inner.label(), "J");
    assert_eq!(f.controller.state(), RebindState::AwaitingInput { slot: f.crouch });
    assert_eq!(crouch_view.label(), IN_PROGRESS_LABEL);
    assert!(!f.input.is_group_enabled(MAP));

    assert_eq!(
        f.controller.cancel_rebind().await,
        Ok(RebindOutcome::Cancelled)
    );
    assert_eq!(crouch_view.label(), "Left Ctrl");
    assert!(f.input.is_group_enabled(MAP));
}

#[tokio::test]
async fn test_cancel_reports_completed_session() {
    let f = fixture(None);
    let view = Arc::new(RecordingView::new("Space"));

    f.controller.start_rebind(f.jump, view.clone()).unwrap();
    f.input.press("<Keyboard>/z");

    assert_eq!(
        f.controller.cancel_rebind().await,
        Ok(RebindOutcome::Completed)
    );
    assert_eq!(view.label(), "Z");
    assert_eq!(
        f.controller.cancel_rebind().await,
        Err(RebindError::NoActiveSession)
    );
}
