//! Cylinder inventory vocabulary shared with the remote backend.
//!
//! The backend owns every record's lifecycle; this crate only describes the
//! reference data it hands out and the batch actions the client sends back.

pub mod action;
pub mod catalog;

pub use action::{
    ActionKind, BatchAction, CompleteRefill, DispatchCylinders, ReceiveCylinders, SendForRefill,
};
pub use catalog::{Company, CylinderGroup, CylinderRecord, Product};
