//! `cylinder-core`: domain primitives shared by every workflow crate.
//!
//! This crate contains **pure domain** values (no IO, no HTTP, no decoder
//! hardware).

pub mod error;
pub mod id;
pub mod quantity;

pub use error::{DomainError, Field, ValidationError};
pub use id::{CompanyId, ProductId, SerialNumber, SessionId, TransactionId};
pub use quantity::TargetQuantity;
