//! Per-workflow parameters: which selectors are required, how scans are
//! checked, and what the user is told.

use cylinder_core::Field;
use cylinder_inventory::ActionKind;

/// How a scanned serial is checked against the fetched eligible list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScanCheck {
    /// Any well-formed, non-duplicate serial is accepted.
    Unchecked,
    /// The serial must be in the eligible list last fetched for the screen.
    EligibleList,
}

/// Where the count a submission must match comes from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// The quantity typed into the form; the selection must match it exactly.
    Entered,
    /// Whatever was selected, as long as it is not empty.
    Selection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub kind: ActionKind,
    pub required: Vec<Field>,
    pub scan_check: ScanCheck,
    pub target: TargetSource,
}

impl WorkflowConfig {
    /// The available list is capped at the requested quantity, so scans are
    /// not checked against it.
    pub fn dispatch() -> Self {
        Self {
            kind: ActionKind::Dispatch,
            required: vec![Field::Company, Field::CylinderType],
            scan_check: ScanCheck::Unchecked,
            target: TargetSource::Entered,
        }
    }

    pub fn receive() -> Self {
        Self {
            kind: ActionKind::Receive,
            required: vec![Field::Company],
            scan_check: ScanCheck::EligibleList,
            target: TargetSource::Entered,
        }
    }

    pub fn send_for_refill() -> Self {
        Self {
            kind: ActionKind::SendForRefill,
            required: Vec::new(),
            scan_check: ScanCheck::EligibleList,
            target: TargetSource::Selection,
        }
    }

    pub fn complete_refill() -> Self {
        Self {
            kind: ActionKind::CompleteRefill,
            required: Vec::new(),
            scan_check: ScanCheck::EligibleList,
            target: TargetSource::Selection,
        }
    }

    pub fn for_kind(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Dispatch => Self::dispatch(),
            ActionKind::Receive => Self::receive(),
            ActionKind::SendForRefill => Self::send_for_refill(),
            ActionKind::CompleteRefill => Self::complete_refill(),
        }
    }

    pub fn with_scan_check(mut self, scan_check: ScanCheck) -> Self {
        self.scan_check = scan_check;
        self
    }

    /// Changing the company invalidates the eligible list.
    pub fn company_scopes_eligible(&self) -> bool {
        self.kind == ActionKind::Receive
    }

    pub fn success_message(&self) -> &'static str {
        match self.kind {
            ActionKind::Dispatch => "Cylinders Dispatched Successfully!",
            ActionKind::Receive => "Cylinders Received Successfully!",
            ActionKind::SendForRefill => "Cylinders Sent For Refilling!",
            ActionKind::CompleteRefill => "Refill Completed Successfully!",
        }
    }

    pub fn failure_message(&self) -> &'static str {
        match self.kind {
            ActionKind::Dispatch => "Error dispatching cylinders.",
            ActionKind::Receive => "Error receiving cylinders.",
            ActionKind::SendForRefill => "Error sending cylinders for refill.",
            ActionKind::CompleteRefill => "Error completing refill.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields_per_workflow() {
        assert_eq!(WorkflowConfig::dispatch().required, vec![Field::Company, Field::CylinderType]);
        assert_eq!(WorkflowConfig::receive().required, vec![Field::Company]);
        assert!(WorkflowConfig::send_for_refill().required.is_empty());
        assert!(WorkflowConfig::complete_refill().required.is_empty());
    }

    #[test]
    fn refill_flows_count_the_selection() {
        assert_eq!(WorkflowConfig::dispatch().target, TargetSource::Entered);
        assert_eq!(WorkflowConfig::receive().target, TargetSource::Entered);
        assert_eq!(WorkflowConfig::send_for_refill().target, TargetSource::Selection);
        assert_eq!(WorkflowConfig::complete_refill().target, TargetSource::Selection);
    }

    #[test]
    fn for_kind_matches_named_constructors() {
        for kind in [
            ActionKind::Dispatch,
            ActionKind::Receive,
            ActionKind::SendForRefill,
            ActionKind::CompleteRefill,
        ] {
            assert_eq!(WorkflowConfig::for_kind(kind).kind, kind);
        }
        assert_eq!(WorkflowConfig::for_kind(ActionKind::Receive), WorkflowConfig::receive());
    }

    #[test]
    fn scan_check_can_be_overridden() {
        let config = WorkflowConfig::dispatch().with_scan_check(ScanCheck::EligibleList);
        assert_eq!(config.scan_check, ScanCheck::EligibleList);
        assert!(!config.company_scopes_eligible());
        assert!(WorkflowConfig::receive().company_scopes_eligible());
    }
}
