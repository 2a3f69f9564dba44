//! `cylinder-workflows`: dispatch, receive and refill screens as one
//! parameterized workflow.
//!
//! Every screen is: fetch reference data, build a [`SelectionSet`] by tapping
//! and/or scanning, submit one batch action to the [`Backend`], save a receipt.
//! Errors are handled where they occur and surfaced through a [`Notifier`].

pub mod backend;
pub mod error;
pub mod form;
pub mod notify;
pub mod screen;
pub mod selection;
pub mod workflow;

pub use backend::{Backend, BackendError, EligibleQuery};
pub use error::WorkflowError;
pub use form::WorkflowForm;
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier, TracingNotifier};
pub use screen::{ScreenServices, SubmitOutcome, WorkflowScreen};
pub use selection::{SelectionSet, ToggleOutcome};
pub use workflow::{ScanCheck, TargetSource, WorkflowConfig};
