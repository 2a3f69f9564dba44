//! Line-oriented worker console.
//!
//! A keyboard-wedge barcode scanner types the code followed by Enter, so while
//! the scan dialog is open every line that is not a console command is treated
//! as a decoded code and pushed through the screen's decode source.

use std::sync::Arc;

use cylinder_core::{CompanyId, ProductId, SerialNumber};
use cylinder_inventory::ActionKind;
use cylinder_scanning::{DecodeSender, DecodeSource, ScanStep};
use cylinder_workflows::{NotificationLevel, NotificationLog, WorkflowScreen};

pub const HELP: &str = "\
commands:
  company <id>      select the company
  product <id>      select the cylinder type
  qty <n>           set the quantity
  list              show eligible cylinders (filtered by `search`)
  search [text]     filter the list by serial number
  toggle <serial>   select or deselect a cylinder
  flag <serial>     mark a received cylinder as not empty (`unflag` to undo)
  all               select every listed cylinder up to the quantity
  refresh           re-fetch eligible cylinders
  scan              open the scanner; scanned codes are read line by line
  y | n             accept or retry the pending scan
  done | cancel     finish or abandon the scan
  submit            submit the selection
  status            show the current form and selection
  quit";

/// Map a workflow name to its action.
pub fn parse_workflow(name: &str) -> Result<ActionKind, String> {
    match name.trim().to_lowercase().as_str() {
        "dispatch" => Ok(ActionKind::Dispatch),
        "receive" => Ok(ActionKind::Receive),
        "refill" | "send-for-refill" => Ok(ActionKind::SendForRefill),
        "complete-refill" => Ok(ActionKind::CompleteRefill),
        other => Err(format!(
            "unknown workflow `{other}` (expected dispatch, receive, refill or complete-refill)"
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Company(CompanyId),
    Product(ProductId),
    Quantity(String),
    List,
    Search(String),
    Toggle(SerialNumber),
    Flag(SerialNumber, bool),
    SelectAll,
    Refresh,
    Scan,
    Accept,
    Retry,
    Finish,
    Cancel,
    Submit,
    Status,
    Help,
    Quit,
    /// Scanner input while the scan dialog is open.
    Code(String),
}

impl Command {
    /// While `scanning`, unrecognised lines are scanner input.
    pub fn parse(line: &str, scanning: bool) -> Result<Command, String> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((word, arg)) => (word, arg.trim()),
            None => (line, ""),
        };

        let command = match (word.to_lowercase().as_str(), scanning) {
            ("y" | "accept", true) => Command::Accept,
            ("n" | "retry", true) => Command::Retry,
            ("done", true) => Command::Finish,
            ("cancel", _) => Command::Cancel,
            ("status", _) => Command::Status,
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            (_, true) => Command::Code(line.to_string()),
            ("company", false) => Command::Company(CompanyId::parse(required(arg, "company id")?)),
            ("product", false) => Command::Product(ProductId::parse(required(arg, "product id")?)),
            ("qty" | "quantity", false) => Command::Quantity(arg.to_string()),
            ("list", false) => Command::List,
            ("search", false) => Command::Search(arg.to_string()),
            ("toggle", false) => Command::Toggle(serial(arg)?),
            ("flag", false) => Command::Flag(serial(arg)?, true),
            ("unflag", false) => Command::Flag(serial(arg)?, false),
            ("all", false) => Command::SelectAll,
            ("refresh", false) => Command::Refresh,
            ("scan", false) => Command::Scan,
            ("submit", false) => Command::Submit,
            (other, false) => return Err(format!("unknown command `{other}`; type `help`")),
        };
        Ok(command)
    }
}

fn required<'a>(arg: &'a str, what: &str) -> Result<&'a str, String> {
    if arg.is_empty() {
        Err(format!("missing {what}"))
    } else {
        Ok(arg)
    }
}

fn serial(arg: &str) -> Result<SerialNumber, String> {
    SerialNumber::parse(arg).map_err(|_| "missing serial number".to_string())
}

/// Output of one console line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

pub struct Console<D: DecodeSource> {
    screen: WorkflowScreen<D>,
    scanner: DecodeSender,
    notes: Arc<NotificationLog>,
}

impl<D: DecodeSource> Console<D> {
    /// `scanner` feeds the decode source owned by `screen`; `notes` must be the
    /// screen's notifier.
    pub fn new(screen: WorkflowScreen<D>, scanner: DecodeSender, notes: Arc<NotificationLog>) -> Self {
        Self {
            screen,
            scanner,
            notes,
        }
    }

    pub fn screen(&self) -> &WorkflowScreen<D> {
        &self.screen
    }

    pub fn is_scanning(&self) -> bool {
        self.screen.scan().is_open()
    }

    /// Load reference data and show what can be selected.
    pub async fn start(&mut self) -> Vec<String> {
        let mut lines = vec![format!("{} workflow, type `help` for commands", self.screen.config().kind)];
        if self.screen.load_reference_data().await.is_ok() {
            for company in self.screen.companies() {
                lines.push(format!("  company {:>6}  {}", company.id, company.name));
            }
            for product in self.screen.products() {
                lines.push(format!("  product {:>6}  {}", product.id, product.name));
            }
        }
        if self.screen.eligible_query().is_some() {
            self.refresh(&mut lines).await;
        }
        self.drain_notes(&mut lines);
        lines
    }

    pub async fn handle(&mut self, line: &str) -> Reply {
        let mut reply = Reply::default();
        if line.trim().is_empty() {
            return reply;
        }

        match Command::parse(line, self.is_scanning()) {
            Ok(command) => self.execute(command, &mut reply).await,
            Err(message) => reply.lines.push(message),
        }
        self.drain_notes(&mut reply.lines);
        reply
    }

    async fn execute(&mut self, command: Command, reply: &mut Reply) {
        let lines = &mut reply.lines;
        match command {
            Command::Company(id) => {
                self.screen.set_company(Some(id));
                self.refresh_if_ready(lines).await;
            }
            Command::Product(id) => {
                self.screen.set_product(Some(id));
                self.refresh_if_ready(lines).await;
            }
            Command::Quantity(raw) => {
                if let Ok(quantity) = self.screen.set_quantity_input(&raw) {
                    match quantity {
                        Some(q) => lines.push(format!("quantity: {q}")),
                        None => lines.push("quantity cleared".to_string()),
                    }
                    self.refresh_if_ready(lines).await;
                }
            }
            Command::List => self.list(lines),
            Command::Search(text) => {
                self.screen.set_search(text);
                self.list(lines);
            }
            Command::Toggle(serial) => {
                let outcome = self.screen.toggle(serial.clone());
                lines.push(format!("{serial}: {outcome:?} ({} selected)", self.screen.selection().len()));
            }
            Command::Flag(serial, flagged) => {
                self.screen.mark_flag(serial.clone(), flagged);
                let state = if flagged { "not empty" } else { "empty" };
                lines.push(format!("{serial}: marked {state}"));
            }
            Command::SelectAll => {
                let added = self.screen.select_all_visible();
                lines.push(format!("{added} added ({} selected)", self.screen.selection().len()));
            }
            Command::Refresh => self.refresh(lines).await,
            Command::Scan => {
                if self.screen.open_scanner().is_ok() {
                    let target = self.screen.scan().target().map(|t| t.get()).unwrap_or_default();
                    lines.push(format!(
                        "scanner open: scan {target} cylinders, `done` to finish, `cancel` to abort"
                    ));
                }
            }
            Command::Code(raw) => {
                self.scanner.decoded(raw);
                match self.screen.pump_scanner() {
                    Some(Ok(step)) => lines.push(describe(&step)),
                    Some(Err(_)) => {}
                    None if self.screen.scan().finalize_enabled() => {
                        lines.push("scan complete: type `done`".to_string())
                    }
                    None => lines.push("accept (y) or retry (n) the pending read first".to_string()),
                }
            }
            Command::Accept => {
                if let Ok(step) = self.screen.accept_scan() {
                    lines.push(describe(&step));
                }
            }
            Command::Retry => {
                if let Ok(serial) = self.screen.retry_scan() {
                    lines.push(format!("discarded {serial}, scan again"));
                }
            }
            Command::Finish => {
                if let Ok(added) = self.screen.finalize_scan() {
                    lines.push(format!(
                        "{added} cylinders added ({} selected)",
                        self.screen.selection().len()
                    ));
                }
            }
            Command::Cancel => {
                if self.is_scanning() {
                    let discarded = self.screen.cancel_scan();
                    lines.push(format!("scan cancelled, {discarded} reads discarded"));
                } else {
                    lines.push("no scan in progress".to_string());
                }
            }
            Command::Submit => {
                if let Ok(outcome) = self.screen.submit().await {
                    lines.push(format!("submitted {}", outcome.receipt.reference));
                    if let Some(document) = outcome.document {
                        match document.path {
                            Some(path) => lines.push(format!("receipt saved to {}", path.display())),
                            None => lines.push(format!("receipt {}", document.file_name)),
                        }
                    }
                }
            }
            Command::Status => self.status(lines),
            Command::Help => lines.push(HELP.to_string()),
            Command::Quit => {
                if self.is_scanning() {
                    self.screen.cancel_scan();
                }
                reply.quit = true;
            }
        }
    }

    async fn refresh_if_ready(&mut self, lines: &mut Vec<String>) {
        if self.screen.eligible_query().is_some() {
            self.refresh(lines).await;
        }
    }

    async fn refresh(&mut self, lines: &mut Vec<String>) {
        if let Ok(count) = self.screen.refresh_eligible().await {
            lines.push(format!("{count} eligible cylinders"));
        }
    }

    fn list(&self, lines: &mut Vec<String>) {
        let selection = self.screen.selection();
        let visible = self.screen.visible();
        if visible.is_empty() {
            lines.push("no cylinders".to_string());
        }
        for record in visible {
            let serial = &record.serial_number;
            let mark = if selection.contains(serial) { "x" } else { " " };
            let flag = if selection.is_flagged(serial) { " (not empty)" } else { "" };
            let gas = record.gas_type.as_deref().unwrap_or("");
            lines.push(format!("  [{mark}] {serial} {gas}{flag}").trim_end().to_string());
        }
    }

    fn status(&self, lines: &mut Vec<String>) {
        let form = self.screen.form();
        let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
        lines.push(format!("company:  {}", show(form.company.as_ref().map(ToString::to_string))));
        lines.push(format!("product:  {}", show(form.product.as_ref().map(ToString::to_string))));
        lines.push(format!("quantity: {}", show(form.quantity.map(|q| q.to_string()))));
        let selected: Vec<String> = self
            .screen
            .selection()
            .members()
            .iter()
            .map(ToString::to_string)
            .collect();
        lines.push(format!("selected: [{}]", selected.join(", ")));
        if self.is_scanning() {
            let scan = self.screen.scan();
            lines.push(format!(
                "scan:     {} ({} read)",
                scan.state().name(),
                scan.accumulated().len()
            ));
        }
    }

    fn drain_notes(&self, lines: &mut Vec<String>) {
        for note in self.notes.drain() {
            let level = match note.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Success => "ok",
                NotificationLevel::Warning => "warning",
                NotificationLevel::Error => "error",
            };
            lines.push(format!("[{level}] {}", note.message));
        }
    }
}

fn describe(step: &ScanStep) -> String {
    match step {
        ScanStep::Pending(serial) => format!("read {serial}: accept (y) or retry (n)?"),
        ScanStep::Accepted {
            serial,
            accumulated,
            target,
        } => format!("accepted {serial} ({accumulated}/{target})"),
        ScanStep::Completed { serial, target } => {
            format!("accepted {serial} ({target}/{target}), scan complete: type `done`")
        }
    }
}
