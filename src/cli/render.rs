//! Styled terminal output.
//!
//! A thin wrapper over `console` so every surface renders through the same
//! palette. The accent color follows the effective theme; status lines
//! reuse the hosted client's wording.

use chrono::NaiveDate;
use console::{style, Style};

use crate::api::types::{DashboardStats, DocumentRecord, DocumentStatus, ShopRecord};
use crate::theme::Theme;

pub struct Ui {
    accent: Style,
}

impl Ui {
    pub fn new(theme: Theme) -> Self {
        let accent = match theme {
            Theme::Dark => Style::new().cyan(),
            Theme::Light => Style::new().blue(),
        };
        Self { accent }
    }

    pub fn heading(&self, text: &str) {
        println!("{}", self.accent.apply_to(text).bold());
    }

    /// Transient success notification.
    pub fn success(&self, text: &str) {
        println!("{} {text}", style("✔").green().bold());
    }

    pub fn note(&self, text: &str) {
        println!("{}", style(text).dim());
    }

    /// Inline validation message, shown next to the offending field.
    pub fn field_error(&self, field: &str, message: &str) {
        eprintln!("  {}: {}", style(field).bold(), style(message).red());
    }

    pub fn stats(&self, stats: &DashboardStats) {
        self.heading("Statistics");
        println!(
            "  {:<18} {}",
            "Total Documents",
            style(stats.total_documents).bold()
        );
        println!(
            "  {:<18} {}",
            "Completed",
            style(stats.completed_documents).green()
        );
        println!(
            "  {:<18} {}",
            "Pending",
            style(stats.pending_documents).yellow()
        );
    }

    pub fn document_line(&self, doc: &DocumentRecord) {
        let check = match doc.status {
            DocumentStatus::Completed => style("[x]").green(),
            DocumentStatus::Pending => style("[ ]").yellow(),
        };
        println!(
            "  {check} {}  {} • {} • {}  ({})",
            style(&doc.id).dim(),
            style(&doc.file_name).bold(),
            doc.customer_name,
            doc.file_size,
            doc.status.label()
        );
    }

    /// The dashboard queue, bucketed by upload day, newest first.
    pub fn document_groups(&self, groups: &[(NaiveDate, Vec<&DocumentRecord>)]) {
        if groups.is_empty() {
            self.note("No documents yet.");
            return;
        }
        for (day, docs) in groups {
            self.heading(&day.format("%B %d, %Y").to_string());
            for doc in docs {
                self.document_line(doc);
            }
            println!();
        }
    }

    pub fn document_card(&self, doc: &DocumentRecord) {
        self.heading(&doc.file_name);
        println!("  {:<12} {}", "Id", doc.id);
        println!("  {:<12} {}", "Customer", doc.customer_name);
        println!("  {:<12} {}", "Size", doc.file_size);
        println!(
            "  {:<12} {}",
            "Uploaded",
            doc.upload_date.format("%Y-%m-%d %H:%M")
        );
        println!("  {:<12} {}", "Status", doc.status.label());
        if let Some(purpose) = &doc.purpose {
            println!("  {:<12} {}", "Purpose", purpose);
        }
        if let Some(notes) = &doc.notes {
            println!("  {:<12} {}", "Notes", notes);
        }
    }

    pub fn shop_card(&self, shop: &ShopRecord) {
        self.heading(&shop.name);
        println!("  {:<12} {}", "Code", shop.shop_code);
        if let Some(address) = &shop.address {
            println!("  {:<12} {}", "Address", address);
        }
        if let Some(phone) = &shop.phone {
            println!("  {:<12} {}", "Phone", phone);
        }
        println!("  {:<12} /shop/{}", "Upload link", shop.shop_code);
    }
}
