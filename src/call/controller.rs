use std::sync::Arc;

use tokio::sync::mpsc;

use super::api::{CallBackend, CallError, CallResponse};
use super::draft::CallRequestDraft;
use super::state::{reduce, Effect, FormEvent, SubmissionState, Transition};

type CallOutcome = Result<CallResponse, CallError>;

/// Drives the call request form: owns the draft and submission state, runs the
/// reducer and executes its effects on the tokio runtime.
///
/// Request tasks report back over a channel owned by the controller. Dropping the
/// controller drops the receiver, so an outcome that arrives afterwards is discarded.
pub struct CallController {
    draft: CallRequestDraft,
    state: SubmissionState,
    backend: Arc<dyn CallBackend>,
    outcome_tx: mpsc::UnboundedSender<CallOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<CallOutcome>,
}

impl CallController {
    pub fn new(backend: Arc<dyn CallBackend>, draft: CallRequestDraft) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            draft,
            state: SubmissionState::Idle,
            backend,
            outcome_tx,
            outcome_rx,
        }
    }

    pub fn draft(&self) -> &CallRequestDraft {
        &self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn backend(&self) -> Arc<dyn CallBackend> {
        Arc::clone(&self.backend)
    }

    /// Apply one event. Must be called inside a tokio runtime since a valid submit
    /// spawns the request task.
    pub fn dispatch(&mut self, event: FormEvent) {
        let submitting = matches!(event, FormEvent::SubmitRequested);
        if submitting && self.state.is_pending() {
            tracing::warn!("Submit ignored: a call request is already in flight");
        }

        if let FormEvent::CallResolved(Ok(response)) = &event {
            if let Some(room) = &response.room_name {
                tracing::info!("Call placed in room {}", room);
            }
            if response.success == Some(false) {
                tracing::warn!("Backend answered 2xx but reported success=false");
            }
        }

        let previous = self.state.clone();
        let Transition {
            draft,
            state,
            effect,
        } = reduce(
            std::mem::take(&mut self.draft),
            std::mem::take(&mut self.state),
            event,
        );
        self.draft = draft;

        if state != previous {
            log_transition(&state);
        }
        self.state = state;

        if let Some(effect) = effect {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::PlaceCall(request) => {
                tracing::info!(
                    "Placing call to {} (wait_for_answer={}) via {}",
                    request.phone_number,
                    request.wait_for_answer,
                    self.backend.endpoint()
                );
                let backend = Arc::clone(&self.backend);
                let outcome_tx = self.outcome_tx.clone();

                tokio::spawn(async move {
                    // Inner task so a panicking backend still settles the form
                    let request_task =
                        tokio::spawn(async move { backend.place_call(request).await });
                    let outcome = match request_task.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(CallError::Transport {
                            message: format!("request task failed: {}", e),
                        }),
                    };
                    let _ = outcome_tx.send(outcome);
                });
            }
        }
    }

    /// Apply any outcomes that have arrived. Returns true if anything changed.
    pub fn poll_outcomes(&mut self) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.dispatch(FormEvent::CallResolved(outcome));
            changed = true;
        }
        changed
    }

    /// Wait for the in-flight request, if any, and return the resulting state
    pub async fn settle(&mut self) -> SubmissionState {
        while self.state.is_pending() {
            match self.outcome_rx.recv().await {
                Some(outcome) => self.dispatch(FormEvent::CallResolved(outcome)),
                None => self.dispatch(FormEvent::CallResolved(Err(CallError::Transport {
                    message: "outcome channel closed".to_string(),
                }))),
            }
        }
        self.state.clone()
    }

    /// Submit the current draft and wait for it to settle.
    ///
    /// If a request is already pending this returns `Pending` immediately without
    /// issuing another one.
    pub async fn submit(&mut self) -> SubmissionState {
        if self.state.is_pending() {
            tracing::warn!("Submit ignored: a call request is already in flight");
            return self.state.clone();
        }
        self.dispatch(FormEvent::SubmitRequested);
        self.settle().await
    }
}

fn log_transition(state: &SubmissionState) {
    match state {
        SubmissionState::Idle => tracing::debug!("Call form reset"),
        SubmissionState::Pending => tracing::debug!("Call request pending"),
        SubmissionState::Settled {
            success: true,
            message,
        } => tracing::info!("Call request succeeded: {}", message),
        SubmissionState::Settled {
            success: false,
            message,
        } => tracing::warn!("Call request failed: {}", message),
    }
}
