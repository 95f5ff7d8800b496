//! Call request workflow: draft, validation, submission state machine and the
//! backend contract.

pub mod api;
pub mod controller;
pub mod draft;
pub mod state;
pub mod validate;

pub use api::{CallBackend, HttpCallBackend};
pub use controller::CallController;
pub use draft::{CallRequestDraft, PhoneEdit};
pub use state::{FormEvent, SubmissionState};
