//! Reference data read from the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cylinder_core::{CompanyId, ProductId, SerialNumber};

/// Customer company cylinders are dispatched to and received from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

/// Cylinder type (gas + size), called a "product" by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
}

/// One physical cylinder as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CylinderRecord {
    pub serial_number: SerialNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_type: Option<String>,
}

impl CylinderRecord {
    pub fn new(serial_number: SerialNumber) -> Self {
        Self {
            serial_number,
            status: None,
            gas_type: None,
        }
    }
}

/// Empty cylinders grouped by type (`/empty-cylinders-grouped`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderGroup {
    #[serde(default)]
    pub gas_type: Option<String>,
    /// Litres; the backend sends either a number or a string.
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub cylinders: Vec<CylinderRecord>,
}

impl CylinderGroup {
    /// Display label, e.g. `Oxygen - 47L`.
    pub fn label(&self) -> String {
        let gas = self.gas_type.as_deref().unwrap_or("Unknown");
        match &self.size {
            Some(Value::String(s)) => format!("{gas} - {s}L"),
            Some(Value::Number(n)) => format!("{gas} - {n}L"),
            _ => gas.to_string(),
        }
    }

    /// Flatten groups into records, tagging each record with its group's gas type.
    pub fn flatten(groups: Vec<CylinderGroup>) -> Vec<CylinderRecord> {
        groups
            .into_iter()
            .flat_map(|group| {
                let gas_type = group.gas_type.clone();
                group.cylinders.into_iter().map(move |mut record| {
                    if record.gas_type.is_none() {
                        record.gas_type = gas_type.clone();
                    }
                    record
                })
            })
            .collect()
    }
}
