//! Receipt layouts: fixed-width text and CSV.

use core::str::FromStr;

use crate::receipt::Receipt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ReceiptFormat {
    #[default]
    Text,
    Csv,
}

impl ReceiptFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReceiptFormat::Text => "txt",
            ReceiptFormat::Csv => "csv",
        }
    }

    pub fn render(&self, receipt: &Receipt) -> String {
        match self {
            ReceiptFormat::Text => to_text(receipt),
            ReceiptFormat::Csv => to_csv(receipt),
        }
    }
}

impl FromStr for ReceiptFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ReceiptFormat::Text),
            "csv" => Ok(ReceiptFormat::Csv),
            other => Err(format!("unknown receipt format: {other}")),
        }
    }
}

/// Title, `Label: value` header lines, then an aligned table.
pub fn to_text(receipt: &Receipt) -> String {
    let mut out = String::new();
    out.push_str(&receipt.title);
    out.push('\n');
    out.push_str(&"=".repeat(receipt.title.len()));
    out.push_str("\n\n");

    for (label, value) in &receipt.fields {
        out.push_str(&format!("{label}: {value}\n"));
    }
    out.push('\n');

    let mut widths: Vec<usize> = receipt.columns.iter().map(|c| c.len()).collect();
    for row in &receipt.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.len());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    out.push_str(&line(&receipt.columns));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &receipt.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Header fields as `label,value` rows, a blank line, then the table.
pub fn to_csv(receipt: &Receipt) -> String {
    let mut out = String::new();
    out.push_str(&csv_row([receipt.title.as_str()]));
    for (label, value) in &receipt.fields {
        out.push_str(&csv_row([label.as_str(), value.as_str()]));
    }
    out.push('\n');
    out.push_str(&csv_row(receipt.columns.iter().map(String::as_str)));
    for row in &receipt.rows {
        out.push_str(&csv_row(row.iter().map(String::as_str)));
    }
    out
}

fn csv_row<'a>(cells: impl IntoIterator<Item = &'a str>) -> String {
    let mut row = cells.into_iter().map(csv_cell).collect::<Vec<_>>().join(",");
    row.push('\n');
    row
}

// Quote cells containing separators, quotes or newlines; double inner quotes.
fn csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cylinder_core::TransactionId;
    use cylinder_inventory::ActionKind;

    fn receipt() -> Receipt {
        let issued_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Receipt {
            kind: ActionKind::Dispatch,
            title: "Cylinder Dispatch Receipt".to_string(),
            reference: TransactionId::at(issued_at),
            issued_at,
            fields: vec![
                ("Company".to_string(), "Acme, \"North\"".to_string()),
                ("Quantity".to_string(), "2".to_string()),
            ],
            columns: vec!["#".to_string(), "Serial Number".to_string()],
            rows: vec![
                vec!["1".to_string(), "A1".to_string()],
                vec!["2".to_string(), "LONG-SERIAL-0002".to_string()],
            ],
        }
    }

    #[test]
    fn text_layout_aligns_columns() {
        let text = ReceiptFormat::Text.render(&receipt());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Cylinder Dispatch Receipt");
        assert_eq!(lines[1], "=".repeat(25));
        assert_eq!(lines[3], "Company: Acme, \"North\"");
        assert_eq!(lines[6], "# | Serial Number");
        assert_eq!(lines[7], "--+-----------------");
        assert_eq!(lines[8], "1 | A1");
        assert_eq!(lines[9], "2 | LONG-SERIAL-0002");
    }

    #[test]
    fn csv_escapes_separators_and_quotes() {
        let csv = ReceiptFormat::Csv.render(&receipt());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Cylinder Dispatch Receipt");
        assert_eq!(lines[1], "Company,\"Acme, \"\"North\"\"\"");
        assert_eq!(lines[3], "");
        assert_eq!(lines[4], "#,Serial Number");
        assert_eq!(lines[6], "2,LONG-SERIAL-0002");
    }

    #[test]
    fn format_parses_from_config_strings() {
        assert_eq!("CSV".parse::<ReceiptFormat>(), Ok(ReceiptFormat::Csv));
        assert_eq!("txt".parse::<ReceiptFormat>(), Ok(ReceiptFormat::Text));
        assert!("pdf".parse::<ReceiptFormat>().is_err());
    }
}
