//! Receipt documents for submitted batch actions.
//!
//! Building a [`Receipt`] is a pure function of the submitted action and the
//! locally cached lookup data; writing it out goes through a
//! [`DocumentGenerator`].

pub mod generator;
pub mod receipt;
pub mod render;

pub use generator::{
    DocumentGenerator, FileDocumentGenerator, GeneratedDocument, MemoryDocumentGenerator,
    ReceiptError,
};
pub use receipt::{DATE_FORMAT, LookupCache, Receipt, UNKNOWN};
pub use render::ReceiptFormat;
