//! Domain error model.

use thiserror::Error;

/// Form field a workflow can require before submitting.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
    Company,
    CylinderType,
    Quantity,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::CylinderType => "cylinder type",
            Field::Quantity => "quantity",
        }
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A user action was blocked because the form is not in a submittable shape.
///
/// These never reach the network; callers surface them as warnings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("please select a {0}")]
    MissingField(Field),

    #[error("quantity required")]
    QuantityRequired,

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("please select exactly {expected} cylinders (selected {actual})")]
    CountMismatch { expected: u32, actual: usize },

    #[error("please select at least one cylinder")]
    EmptySelection,
}

/// Domain-level error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// An identifier was invalid (e.g. blank serial number).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
