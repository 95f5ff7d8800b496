//! Submission lifecycle as an explicit state machine.
//!
//! ```text
//! Idle    --submit(invalid)--> Settled(false, reason)
//! Idle    --submit(valid)----> Pending --2xx------> Settled(true, message)
//! Pending --non-2xx----------> Settled(false, detail | fallback)
//! Pending --transport error--> Settled(false, generic)
//! Settled --submit-----------> same as Idle
//! ```

use super::api::{CallError, CallRequest, CallResponse};
use super::draft::{CallRequestDraft, PhoneEdit};
use super::validate::validate_phone_number;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
    Settled { success: bool, message: String },
}

impl SubmissionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending)
    }

    /// `(success, message)` when there is a result to show
    pub fn banner(&self) -> Option<(bool, &str)> {
        match self {
            SubmissionState::Settled { success, message } => Some((*success, message.as_str())),
            _ => None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        SubmissionState::Settled {
            success: false,
            message: message.into(),
        }
    }
}

/// Inputs to the form state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    PhoneNumberEdited(PhoneEdit),
    WaitForAnswerToggled,
    SubmitRequested,
    CallResolved(Result<CallResponse, CallError>),
}

/// Side effect the caller must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PlaceCall(CallRequest),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub draft: CallRequestDraft,
    pub state: SubmissionState,
    pub effect: Option<Effect>,
}

impl Transition {
    fn to(draft: CallRequestDraft, state: SubmissionState) -> Self {
        Self {
            draft,
            state,
            effect: None,
        }
    }
}

/// Pure transition function for the call request form.
///
/// While `Pending`, edits are ignored and a repeated submit is a no-op, so at most one
/// request is ever in flight. An outcome that arrives when nothing is pending is stale
/// and dropped.
pub fn reduce(
    mut draft: CallRequestDraft,
    state: SubmissionState,
    event: FormEvent,
) -> Transition {
    match event {
        FormEvent::PhoneNumberEdited(_) | FormEvent::WaitForAnswerToggled
            if state.is_pending() =>
        {
            Transition::to(draft, state)
        }
        FormEvent::PhoneNumberEdited(edit) => {
            draft.apply(edit);
            Transition::to(draft, state)
        }
        FormEvent::WaitForAnswerToggled => {
            draft.toggle_wait_for_answer();
            Transition::to(draft, state)
        }

        FormEvent::SubmitRequested if state.is_pending() => Transition::to(draft, state),
        FormEvent::SubmitRequested => match validate_phone_number(&draft.phone_number) {
            Err(reason) => Transition::to(draft, SubmissionState::failed(reason.to_string())),
            Ok(()) => {
                let request = draft.to_request();
                Transition {
                    draft,
                    state: SubmissionState::Pending,
                    effect: Some(Effect::PlaceCall(request)),
                }
            }
        },

        FormEvent::CallResolved(_) if !state.is_pending() => Transition::to(draft, state),
        FormEvent::CallResolved(Ok(response)) => {
            draft.clear_phone_number();
            Transition::to(
                draft,
                SubmissionState::Settled {
                    success: true,
                    message: response.message,
                },
            )
        }
        FormEvent::CallResolved(Err(err)) => {
            Transition::to(draft, SubmissionState::failed(err.user_message()))
        }
    }
}
