use std::collections::HashMap;

use chrono::{DateTime, Utc};

use cylinder_core::{CompanyId, ProductId, SerialNumber, TransactionId};
use cylinder_inventory::{ActionKind, BatchAction, Company, Product};

/// Placeholder for any lookup that is not cached.
pub const UNKNOWN: &str = "Unknown";

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Names cached from the reference lists, used to label receipts.
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    companies: HashMap<CompanyId, String>,
    products: HashMap<ProductId, String>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_companies(&mut self, companies: &[Company]) {
        self.companies = companies
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
    }

    pub fn set_products(&mut self, products: &[Product]) {
        self.products = products
            .iter()
            .map(|p| (p.id.clone(), p.name.clone()))
            .collect();
    }

    pub fn company_name(&self, id: &CompanyId) -> Option<&str> {
        self.companies.get(id).map(String::as_str)
    }

    pub fn product_name(&self, id: &ProductId) -> Option<&str> {
        self.products.get(id).map(String::as_str)
    }
}

/// Fixed-layout receipt: header fields plus a table of cylinders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub kind: ActionKind,
    pub title: String,
    /// Transaction id; also names the file.
    pub reference: TransactionId,
    pub issued_at: DateTime<Utc>,
    pub fields: Vec<(String, String)>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Receipt {
    /// Build the receipt for a submitted action.
    ///
    /// Missing lookups degrade to [`UNKNOWN`]; this never fails.
    pub fn for_action(action: &BatchAction, lookup: &LookupCache, issued_at: DateTime<Utc>) -> Self {
        let reference = action
            .transaction_id()
            .cloned()
            .unwrap_or_else(|| TransactionId::at(issued_at));
        let date = issued_at.format(DATE_FORMAT).to_string();

        let mut receipt = Receipt {
            kind: action.kind(),
            title: String::new(),
            reference: reference.clone(),
            issued_at,
            fields: Vec::new(),
            columns: vec!["#".to_string(), "Serial Number".to_string()],
            rows: Vec::new(),
        };

        match action {
            BatchAction::Dispatch(a) => {
                let company = lookup
                    .company_name(&a.company_id)
                    .or_else(|| known(&a.selected_company))
                    .unwrap_or(UNKNOWN);
                let product = lookup.product_name(&a.selected_product).unwrap_or(UNKNOWN);

                receipt.title = "Cylinder Dispatch Receipt".to_string();
                receipt.field("Transaction ID", reference.as_str());
                receipt.field("Company", company);
                receipt.field("Cylinder Type", product);
                receipt.field("Quantity", &a.quantity.to_string());
                receipt.field("Date", &a.date);
                receipt.rows = numbered(a.serial_numbers.iter().map(|s| vec![s.to_string()]));
            }
            BatchAction::Receive(a) => {
                let company = lookup.company_name(&a.company_id).unwrap_or(UNKNOWN);

                receipt.title = "Cylinder Receive Receipt".to_string();
                receipt.columns.push("Condition".to_string());
                receipt.field("Reference", reference.as_str());
                receipt.field("Company", company);
                receipt.field("Empty", &a.empty_serial_numbers.len().to_string());
                receipt.field("Filled", &a.filled_serial_numbers.len().to_string());
                receipt.field("Date", &date);
                let empties = a
                    .empty_serial_numbers
                    .iter()
                    .map(|s| vec![s.to_string(), "Empty".to_string()]);
                let filled = a
                    .filled_serial_numbers
                    .iter()
                    .map(|s| vec![s.to_string(), "Filled".to_string()]);
                receipt.rows = numbered(empties.chain(filled));
            }
            BatchAction::SendForRefill(a) => {
                receipt.title = "Cylinders Sent For Refill".to_string();
                receipt.refill_body(&a.cylinder_ids, &date);
            }
            BatchAction::CompleteRefill(a) => {
                receipt.title = "Refill Completion Receipt".to_string();
                receipt.refill_body(&a.cylinder_ids, &date);
            }
        }

        receipt
    }

    /// `<Action>_Receipt_<reference>.<extension>`
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}_Receipt_{}.{}", self.kind.label(), self.reference, extension)
    }

    fn refill_body(&mut self, serials: &[SerialNumber], date: &str) {
        let reference = self.reference.to_string();
        self.field("Reference", &reference);
        self.field("Quantity", &serials.len().to_string());
        self.field("Date", date);
        self.rows = numbered(serials.iter().map(|s| vec![s.to_string()]));
    }

    fn field(&mut self, label: &str, value: &str) {
        self.fields.push((label.to_string(), value.to_string()));
    }
}

fn known(name: &str) -> Option<&str> {
    let name = name.trim();
    (!name.is_empty() && name != UNKNOWN).then_some(name)
}

fn numbered(rows: impl Iterator<Item = Vec<String>>) -> Vec<Vec<String>> {
    rows.enumerate()
        .map(|(idx, mut row)| {
            row.insert(0, (idx + 1).to_string());
            row
        })
        .collect()
}
