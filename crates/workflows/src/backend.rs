//! Remote backend capability.
//!
//! The backend owns every status transition; the client only lists and submits.

use async_trait::async_trait;
use thiserror::Error;

use cylinder_core::{CompanyId, ProductId, TargetQuantity};
use cylinder_inventory::{BatchAction, Company, CylinderRecord, Product};

/// Which cylinders a screen may act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibleQuery {
    /// In-stock cylinders of a type, for dispatch.
    Available {
        product: ProductId,
        quantity: TargetQuantity,
    },
    /// Cylinders currently out at a company, for receive.
    Dispatched { company: CompanyId },
    /// Empties waiting to be sent for refill.
    Empty,
    /// Cylinders at the refilling station.
    Refilling,
}

/// No structured taxonomy beyond transport, status and body shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Status(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("not signed in")]
    Unauthenticated,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_companies(&self) -> Result<Vec<Company>, BackendError>;

    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    async fn list_cylinders(&self, query: &EligibleQuery) -> Result<Vec<CylinderRecord>, BackendError>;

    /// Submit one batch action. Success means the backend accepted all of it.
    async fn submit(&self, action: &BatchAction) -> Result<(), BackendError>;
}
