//! Batch actions the client submits to the backend.
//!
//! Field names follow the backend's JSON contract (camelCase).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cylinder_core::{CompanyId, ProductId, SerialNumber, TargetQuantity, TransactionId};

/// Which workflow produced an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Dispatch,
    Receive,
    SendForRefill,
    CompleteRefill,
}

impl ActionKind {
    pub fn endpoint(&self) -> &'static str {
        match self {
            ActionKind::Dispatch => "/dispatch-cylinder",
            ActionKind::Receive => "/receive-cylinder",
            ActionKind::SendForRefill => "/refill-cylinder",
            ActionKind::CompleteRefill => "/complete-refill",
        }
    }

    pub fn action_type(&self) -> &'static str {
        match self {
            ActionKind::Dispatch => "cylinder.dispatch",
            ActionKind::Receive => "cylinder.receive",
            ActionKind::SendForRefill => "cylinder.refill.send",
            ActionKind::CompleteRefill => "cylinder.refill.complete",
        }
    }

    /// Human label, also used as the receipt file-name prefix.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Dispatch => "Dispatch",
            ActionKind::Receive => "Receive",
            ActionKind::SendForRefill => "Refill",
            ActionKind::CompleteRefill => "CompleteRefill",
        }
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Action: DispatchCylinders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchCylinders {
    pub transaction_id: TransactionId,
    pub serial_numbers: Vec<SerialNumber>,
    pub company_id: CompanyId,
    /// Company name at submission time, `"Unknown"` when not cached.
    pub selected_company: String,
    pub selected_product: ProductId,
    pub quantity: TargetQuantity,
    pub date: String,
}

/// Action: ReceiveCylinders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveCylinders {
    pub empty_serial_numbers: Vec<SerialNumber>,
    pub filled_serial_numbers: Vec<SerialNumber>,
    pub company_id: CompanyId,
}

/// Action: SendForRefill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendForRefill {
    pub cylinder_ids: Vec<SerialNumber>,
}

/// Action: CompleteRefill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRefill {
    pub cylinder_ids: Vec<SerialNumber>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchAction {
    Dispatch(DispatchCylinders),
    Receive(ReceiveCylinders),
    SendForRefill(SendForRefill),
    CompleteRefill(CompleteRefill),
}

impl BatchAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            BatchAction::Dispatch(_) => ActionKind::Dispatch,
            BatchAction::Receive(_) => ActionKind::Receive,
            BatchAction::SendForRefill(_) => ActionKind::SendForRefill,
            BatchAction::CompleteRefill(_) => ActionKind::CompleteRefill,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.kind().endpoint()
    }

    /// Every serial number the action touches, in submission order.
    pub fn serials(&self) -> Vec<&SerialNumber> {
        match self {
            BatchAction::Dispatch(a) => a.serial_numbers.iter().collect(),
            BatchAction::Receive(a) => a
                .empty_serial_numbers
                .iter()
                .chain(a.filled_serial_numbers.iter())
                .collect(),
            BatchAction::SendForRefill(a) => a.cylinder_ids.iter().collect(),
            BatchAction::CompleteRefill(a) => a.cylinder_ids.iter().collect(),
        }
    }

    pub fn transaction_id(&self) -> Option<&TransactionId> {
        match self {
            BatchAction::Dispatch(a) => Some(&a.transaction_id),
            _ => None,
        }
    }

    /// JSON request body.
    pub fn body(&self) -> Result<Value, serde_json::Error> {
        match self {
            BatchAction::Dispatch(a) => serde_json::to_value(a),
            BatchAction::Receive(a) => serde_json::to_value(a),
            BatchAction::SendForRefill(a) => serde_json::to_value(a),
            BatchAction::CompleteRefill(a) => serde_json::to_value(a),
        }
    }
}
