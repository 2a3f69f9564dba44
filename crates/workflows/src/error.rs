use thiserror::Error;

use cylinder_core::ValidationError;
use cylinder_scanning::ScanError;

use crate::backend::BackendError;

/// Every error a screen operation can return. All of them are recoverable:
/// the screen has already notified the user and left its state consistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
