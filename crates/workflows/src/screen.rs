//! One workflow screen: form, selection, scan dialog and submission.
//!
//! Every operation reports its own failures through the [`Notifier`] before
//! returning them, so callers may ignore the `Err` values. State is only
//! changed by operations that succeed.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use cylinder_core::{
    CompanyId, Field, ProductId, SerialNumber, TargetQuantity, TransactionId, ValidationError,
};
use cylinder_inventory::{
    ActionKind, BatchAction, Company, CompleteRefill, CylinderRecord, DispatchCylinders, Product,
    ReceiveCylinders, SendForRefill,
};
use cylinder_receipt::{
    DATE_FORMAT, DocumentGenerator, GeneratedDocument, LookupCache, Receipt, UNKNOWN,
};
use cylinder_scanning::{DecodeSource, ScanError, ScanPolicy, ScanSession, ScanStep};

use crate::backend::{Backend, EligibleQuery};
use crate::error::WorkflowError;
use crate::form::WorkflowForm;
use crate::notify::{Notification, Notifier};
use crate::selection::{SelectionSet, ToggleOutcome};
use crate::workflow::{ScanCheck, TargetSource, WorkflowConfig};

/// Capabilities a screen talks to.
#[derive(Clone)]
pub struct ScreenServices {
    pub backend: Arc<dyn Backend>,
    pub documents: Arc<dyn DocumentGenerator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub action: BatchAction,
    pub receipt: Receipt,
    /// `None` when saving the receipt failed; the submission still stands.
    pub document: Option<GeneratedDocument>,
}

pub struct WorkflowScreen<D: DecodeSource> {
    config: WorkflowConfig,
    services: ScreenServices,
    form: WorkflowForm,
    selection: SelectionSet,
    scan: ScanSession<D>,
    lookup: LookupCache,
    companies: Vec<Company>,
    products: Vec<Product>,
    eligible: Vec<CylinderRecord>,
    search: String,
}

impl<D: DecodeSource> WorkflowScreen<D> {
    pub fn new(config: WorkflowConfig, services: ScreenServices, decoder: D) -> Self {
        Self {
            config,
            services,
            form: WorkflowForm::new(),
            selection: SelectionSet::default(),
            scan: ScanSession::new(decoder, ScanPolicy::Unchecked),
            lookup: LookupCache::new(),
            companies: Vec::new(),
            products: Vec::new(),
            eligible: Vec::new(),
            search: String::new(),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn form(&self) -> &WorkflowForm {
        &self.form
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn scan(&self) -> &ScanSession<D> {
        &self.scan
    }

    pub fn scan_mut(&mut self) -> &mut ScanSession<D> {
        &mut self.scan
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn eligible(&self) -> &[CylinderRecord] {
        &self.eligible
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    // ----------------------------------------------------------------------
    // Reference data
    // ----------------------------------------------------------------------

    /// Fetch the company and cylinder-type lists this workflow needs.
    pub async fn load_reference_data(&mut self) -> Result<(), WorkflowError> {
        if self.config.required.contains(&Field::Company) {
            match self.services.backend.list_companies().await {
                Ok(companies) => {
                    tracing::debug!(count = companies.len(), "companies loaded");
                    self.lookup.set_companies(&companies);
                    self.companies = companies;
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to load companies");
                    self.notify(Notification::error("Failed to load companies."));
                    return Err(err.into());
                }
            }
        }

        if self.config.required.contains(&Field::CylinderType) {
            match self.services.backend.list_products().await {
                Ok(products) => {
                    tracing::debug!(count = products.len(), "cylinder types loaded");
                    self.lookup.set_products(&products);
                    self.products = products;
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to load cylinder types");
                    self.notify(Notification::error("Failed to load cylinder types."));
                    return Err(err.into());
                }
            }
        }
        Ok(())
    }

    /// The eligible-list query for the current form, if it can be built yet.
    pub fn eligible_query(&self) -> Option<EligibleQuery> {
        match self.config.kind {
            ActionKind::Dispatch => Some(EligibleQuery::Available {
                product: self.form.product.clone()?,
                quantity: self.form.quantity?,
            }),
            ActionKind::Receive => Some(EligibleQuery::Dispatched {
                company: self.form.company.clone()?,
            }),
            ActionKind::SendForRefill => Some(EligibleQuery::Empty),
            ActionKind::CompleteRefill => Some(EligibleQuery::Refilling),
        }
    }

    /// Re-fetch the cylinders this screen may act on. Returns how many were listed.
    pub async fn refresh_eligible(&mut self) -> Result<usize, WorkflowError> {
        let Some(query) = self.eligible_query() else {
            self.eligible.clear();
            self.sync_scan_policy();
            return Ok(0);
        };

        match self.services.backend.list_cylinders(&query).await {
            Ok(records) => {
                tracing::info!(kind = %self.config.kind, count = records.len(), "eligible cylinders loaded");
                self.eligible = records;
                self.sync_scan_policy();
                Ok(self.eligible.len())
            }
            Err(err) => {
                tracing::error!(kind = %self.config.kind, error = %err, "failed to load eligible cylinders");
                self.notify(Notification::error("Failed to load cylinders."));
                Err(err.into())
            }
        }
    }

    fn sync_scan_policy(&mut self) {
        let policy = match self.config.scan_check {
            ScanCheck::Unchecked => ScanPolicy::Unchecked,
            ScanCheck::EligibleList => {
                ScanPolicy::listed(self.eligible.iter().map(|r| r.serial_number.clone()))
            }
        };
        self.scan.set_policy(policy);
    }

    // ----------------------------------------------------------------------
    // Form
    // ----------------------------------------------------------------------

    /// On screens whose eligible list belongs to a company, switching company
    /// drops the selection, flags, the eligible list and any open scan.
    pub fn set_company(&mut self, company: Option<CompanyId>) {
        if company == self.form.company {
            return;
        }
        self.form.company = company;
        if self.config.company_scopes_eligible() {
            self.selection.reset();
            self.eligible.clear();
            self.scan.cancel();
            self.sync_scan_policy();
        }
    }

    pub fn set_product(&mut self, product: Option<ProductId>) {
        self.form.product = product;
    }

    /// Also bounds manual selection. Changing it closes an open scan, whose
    /// target no longer matches.
    pub fn set_quantity(&mut self, quantity: Option<TargetQuantity>) {
        if quantity != self.form.quantity && self.scan.is_open() {
            let discarded = self.scan.cancel();
            self.notify(Notification::warning(format!(
                "Quantity changed: scan cancelled ({discarded} reads discarded)."
            )));
        }
        self.form.quantity = quantity;
        self.selection.set_capacity(quantity);
    }

    /// Parse free-text quantity input; blank clears it.
    pub fn set_quantity_input(&mut self, input: &str) -> Result<Option<TargetQuantity>, WorkflowError> {
        if input.trim().is_empty() {
            self.set_quantity(None);
            return Ok(None);
        }
        match input.parse::<TargetQuantity>() {
            Ok(quantity) => {
                self.set_quantity(Some(quantity));
                Ok(Some(quantity))
            }
            Err(err) => Err(self.report(err.into())),
        }
    }

    // ----------------------------------------------------------------------
    // Selection
    // ----------------------------------------------------------------------

    pub fn toggle(&mut self, serial: SerialNumber) -> ToggleOutcome {
        let outcome = self.selection.toggle(serial);
        if outcome == ToggleOutcome::AtCapacity {
            let limit = self.form.quantity.map(|q| q.get()).unwrap_or_default();
            self.notify(Notification::warning(format!(
                "You can only select {limit} cylinders."
            )));
        }
        outcome
    }

    /// Mark a received cylinder as not empty.
    pub fn mark_flag(&mut self, serial: SerialNumber, flagged: bool) {
        self.selection.mark_flag(serial, flagged);
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Eligible cylinders whose serial contains the search text, ignoring case.
    pub fn visible(&self) -> Vec<&CylinderRecord> {
        let needle = self.search.trim().to_lowercase();
        self.eligible
            .iter()
            .filter(|r| needle.is_empty() || r.serial_number.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// Select the visible cylinders in order, up to the target quantity.
    pub fn select_all_visible(&mut self) -> usize {
        let candidates: Vec<SerialNumber> =
            self.visible().into_iter().map(|r| r.serial_number.clone()).collect();
        self.selection.select_all(&candidates)
    }

    // ----------------------------------------------------------------------
    // Scanning
    // ----------------------------------------------------------------------

    pub fn open_scanner(&mut self) -> Result<(), WorkflowError> {
        if self.form.quantity.is_none() {
            self.notify(Notification::warning("Please enter a quantity before scanning."));
            return Err(ValidationError::QuantityRequired.into());
        }
        self.scan
            .start(self.form.quantity)
            .map_err(|err| self.report(err.into()))
    }

    /// Feed the next decoder event, if one is waiting, through the scan dialog.
    pub fn pump_scanner(&mut self) -> Option<Result<ScanStep, WorkflowError>> {
        let result = self.scan.poll(&self.selection)?;
        Some(self.scan_result(result))
    }

    /// Feed a decoded payload directly (e.g. from a UI-owned camera view).
    pub fn scan_decoded(&mut self, raw: &str) -> Result<ScanStep, WorkflowError> {
        let result = self.scan.on_decode(raw, &self.selection);
        self.scan_result(result)
    }

    pub fn accept_scan(&mut self) -> Result<ScanStep, WorkflowError> {
        let result = self.scan.accept(&self.selection);
        self.scan_result(result)
    }

    pub fn retry_scan(&mut self) -> Result<SerialNumber, WorkflowError> {
        self.scan.retry().map_err(|err| self.report(err.into()))
    }

    /// Close the scan dialog and merge its reads into the selection. Returns
    /// how many serials were new.
    pub fn finalize_scan(&mut self) -> Result<usize, WorkflowError> {
        let serials = self.scan.finalize().map_err(|err| self.report(err.into()))?;
        let added = self.selection.merge(serials);
        tracing::info!(kind = %self.config.kind, added, selected = self.selection.len(), "scan merged into selection");
        Ok(added)
    }

    /// Close the scan dialog, discarding its reads. The selection is untouched.
    pub fn cancel_scan(&mut self) -> usize {
        self.scan.cancel()
    }

    fn scan_result(&self, result: Result<ScanStep, ScanError>) -> Result<ScanStep, WorkflowError> {
        result.map_err(|err| self.report(err.into()))
    }

    // ----------------------------------------------------------------------
    // Submission
    // ----------------------------------------------------------------------

    /// Validate, submit one batch action, then reset and save a receipt.
    ///
    /// Validation failures never reach the backend. A backend failure leaves
    /// the screen exactly as it was.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, WorkflowError> {
        let now = Utc::now();
        let action = self
            .build_action(now)
            .map_err(|err| self.report(err.into()))?;

        let count = action.serials().len();
        tracing::info!(kind = %self.config.kind, count, "submitting batch action");
        if let Err(err) = self.services.backend.submit(&action).await {
            tracing::error!(kind = %self.config.kind, error = %err, "batch action rejected");
            self.notify(Notification::error(self.config.failure_message()));
            return Err(err.into());
        }
        tracing::info!(kind = %self.config.kind, count, "batch action accepted");
        self.notify(Notification::success(self.config.success_message()));

        let receipt = Receipt::for_action(&action, &self.lookup, now);
        self.clear_after_submit(&action);

        let document = match self.services.documents.generate(&receipt) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!(reference = %receipt.reference, error = %err, "receipt not saved");
                self.notify(Notification::warning(format!(
                    "Submitted, but the receipt could not be saved: {err}"
                )));
                None
            }
        };

        Ok(SubmitOutcome {
            action,
            receipt,
            document,
        })
    }

    /// The batch action the current form and selection describe.
    pub fn build_action(&self, now: DateTime<Utc>) -> Result<BatchAction, ValidationError> {
        self.form.require(&self.config.required)?;
        let quantity = match self.config.target {
            TargetSource::Entered => {
                let quantity = self.form.entered_quantity()?;
                quantity.ensure_exact(self.selection.len())?;
                quantity
            }
            TargetSource::Selection => TargetQuantity::of_selection(self.selection.len())?,
        };
        let serials = self.selection.members().to_vec();

        let action = match self.config.kind {
            ActionKind::Dispatch => {
                let company_id = required(self.form.company.clone(), Field::Company)?;
                let selected_product =
                    required(self.form.product.clone(), Field::CylinderType)?;
                let selected_company = self
                    .lookup
                    .company_name(&company_id)
                    .unwrap_or(UNKNOWN)
                    .to_string();
                BatchAction::Dispatch(DispatchCylinders {
                    transaction_id: TransactionId::at(now),
                    serial_numbers: serials,
                    company_id,
                    selected_company,
                    selected_product,
                    quantity,
                    date: now.format(DATE_FORMAT).to_string(),
                })
            }
            ActionKind::Receive => {
                let company_id = required(self.form.company.clone(), Field::Company)?;
                let (empty, filled) = self.selection.split_by_flag();
                BatchAction::Receive(ReceiveCylinders {
                    empty_serial_numbers: empty,
                    filled_serial_numbers: filled,
                    company_id,
                })
            }
            ActionKind::SendForRefill => BatchAction::SendForRefill(SendForRefill {
                cylinder_ids: serials,
            }),
            ActionKind::CompleteRefill => BatchAction::CompleteRefill(CompleteRefill {
                cylinder_ids: serials,
            }),
        };
        Ok(action)
    }

    fn clear_after_submit(&mut self, action: &BatchAction) {
        self.scan.cancel();
        let submitted: HashSet<&SerialNumber> = action.serials().into_iter().collect();
        self.eligible
            .retain(|record| !submitted.contains(&record.serial_number));
        self.selection.reset();
        self.form.reset();
        self.selection.set_capacity(None);
        self.search.clear();
        self.sync_scan_policy();
    }

    // ----------------------------------------------------------------------
    // Notifications
    // ----------------------------------------------------------------------

    fn notify(&self, notification: Notification) {
        self.services.notifier.notify(notification);
    }

    /// Surface an error to the user and hand it back.
    fn report(&self, err: WorkflowError) -> WorkflowError {
        self.notify(notification_for(&err));
        err
    }
}

fn required<T>(value: Option<T>, field: Field) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField(field))
}

fn notification_for(err: &WorkflowError) -> Notification {
    match err {
        WorkflowError::Validation(err) => Notification::warning(validation_message(err)),
        WorkflowError::Scan(err) => match err {
            ScanError::Validation(err) => Notification::warning(validation_message(err)),
            ScanError::Duplicate(serial) => {
                Notification::warning(format!("Cylinder {serial} is already scanned!"))
            }
            ScanError::NotEligible(serial) => {
                Notification::warning(format!("Cylinder {serial} is not eligible here."))
            }
            ScanError::Blank => Notification::warning("Scanned code is empty."),
            ScanError::Incomplete {
                accumulated,
                target,
            } => Notification::warning(format!(
                "Scanned {accumulated} of {target} cylinders."
            )),
            ScanError::ReadFailed(message) => {
                Notification::warning(format!("Could not read code: {message}"))
            }
            ScanError::InvalidState { .. } => Notification::warning(err.to_string()),
            ScanError::Decoder(err) => Notification::error(format!("Scanner unavailable: {err}")),
        },
        WorkflowError::Backend(err) => Notification::error(err.to_string()),
    }
}

fn validation_message(err: &ValidationError) -> String {
    match err {
        ValidationError::MissingField(field) => format!("Please select a {field}."),
        ValidationError::QuantityRequired => "Please enter a quantity.".to_string(),
        ValidationError::InvalidQuantity(input) => format!("Invalid quantity: {input}"),
        ValidationError::CountMismatch { expected, .. } => {
            format!("Please select exactly {expected} cylinders.")
        }
        ValidationError::EmptySelection => "Please select at least one cylinder.".to_string(),
    }
}
