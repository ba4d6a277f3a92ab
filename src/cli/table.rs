//! Table formatting utilities for CLI list commands
//!
//! Every list command builds [`TableRow`]s of typed [`CellValue`]s and hands
//! them to a [`TableFormatter`], which renders them as an aligned table,
//! CSV, markdown or bare IDs. Table and markdown output are localized;
//! CSV and ID output stay machine-readable regardless of locale.

use chrono::{DateTime, Local, NaiveDate, Utc};
use console::style;
use tabled::builder::Builder;
use tabled::settings::object::Segment;
use tabled::settings::{Alignment, Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::core::i18n::Translator;
use crate::core::identity::EntityPrefix;
use crate::entities::{HealthStatus, PhaseStatus, ProjectStatus, Severity};

/// Text columns longer than this are truncated in tables
const MAX_TEXT_WIDTH: usize = 40;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Plain text, truncated in tables
    Text(String),
    ProjectStatus(ProjectStatus),
    PhaseStatus(PhaseStatus),
    Health(HealthStatus),
    Severity(Severity),
    /// Whole percentage
    Percent(i64),
    /// Currency amount with thousands grouping
    Money(f64),
    Date(NaiveDate),
    /// Timestamp displayed as local date
    DateTime(DateTime<Utc>),
    Number(i64),
    /// Read/unread flag
    Read(bool),
    /// Empty/placeholder
    Empty,
}

impl CellValue {
    /// Localized display text (tables and markdown)
    pub fn display(&self, tr: &Translator) -> String {
        match self {
            CellValue::Text(s) => truncate_str(s, MAX_TEXT_WIDTH),
            CellValue::ProjectStatus(status) => tr.project_status(*status).to_string(),
            CellValue::PhaseStatus(status) => tr.phase_status(*status).to_string(),
            CellValue::Health(health) => tr.health(*health).to_string(),
            CellValue::Severity(severity) => tr.severity(*severity).to_string(),
            CellValue::Percent(p) => tr.format_percent(p),
            CellValue::Money(m) => tr.format_number(*m),
            CellValue::Date(d) => tr.format_date(*d),
            CellValue::DateTime(dt) => {
                let local: DateTime<Local> = dt.with_timezone(&Local);
                tr.format_date(local.date_naive())
            }
            CellValue::Number(n) => tr.digits(&n.to_string()),
            CellValue::Read(true) => tr.t("read").to_string(),
            CellValue::Read(false) => tr.t("unread").to_string(),
            CellValue::Empty => "-".to_string(),
        }
    }

    /// Format for CSV output (RFC 4180, no localization)
    pub fn format_csv(&self) -> String {
        match self {
            CellValue::Text(s) => escape_csv(s),
            CellValue::ProjectStatus(status) => status.to_string(),
            CellValue::PhaseStatus(status) => status.to_string(),
            CellValue::Health(health) => health.to_string(),
            CellValue::Severity(severity) => severity.to_string(),
            CellValue::Percent(p) => p.to_string(),
            CellValue::Money(m) => m.to_string(),
            CellValue::Date(d) => d.to_string(),
            CellValue::DateTime(dt) => dt.to_rfc3339(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Read(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Format for Markdown output (escaped pipes)
    pub fn format_md(&self, tr: &Translator) -> String {
        let raw = match self {
            CellValue::Text(s) => s.clone(),
            other => other.display(tr),
        };
        raw.replace('|', "\\|")
    }
}

/// Column definition: CSV key and catalog key of the header label
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str) -> Self {
        Self { key, header }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    pub short_id: String,
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(full_id: &str, short_id: Option<&str>) -> Self {
        Self {
            short_id: short_id.unwrap_or_default().to_string(),
            full_id: full_id.to_string(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Build a rounded table, right-aligned when the locale reads right-to-left
fn finish_table(builder: Builder, tr: &Translator) -> String {
    let mut table = builder.build();
    table.with(Style::rounded());
    if tr.locale().is_rtl() {
        table.modify(Segment::all(), Alignment::right());
    }
    table.to_string()
}

/// Render label/value pairs as a two-column panel
pub fn render_panel(pairs: &[(String, String)], tr: &Translator) -> String {
    let mut builder = Builder::default();
    for (label, value) in pairs {
        if tr.locale().is_rtl() {
            builder.push_record([value.as_str(), label.as_str()]);
        } else {
            builder.push_record([label.as_str(), value.as_str()]);
        }
    }
    finish_table(builder, tr)
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    tr: &'a Translator,
    prefix: EntityPrefix,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], tr: &'a Translator, prefix: EntityPrefix) -> Self {
        Self {
            columns,
            tr,
            prefix,
            show_summary: true,
        }
    }

    /// Drop the trailing row count (for embedding in larger views)
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Render rows in the specified format
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => self.render_ids(rows),
            _ => self.render_table(rows),
        }
    }

    fn headers(&self) -> Vec<String> {
        let mut headers = vec!["#".to_string()];
        headers.extend(self.columns.iter().map(|c| self.tr.t(c.header).to_string()));
        headers
    }

    fn cells(&self, row: &TableRow, md: bool) -> Vec<String> {
        let mut values = vec![row.short_id.clone()];
        for col in self.columns {
            values.push(match row.get(col.key) {
                Some(value) if md => value.format_md(self.tr),
                Some(value) => value.display(self.tr),
                None => "-".to_string(),
            });
        }
        values
    }

    /// Reverse column order under RTL so the first column sits on the right
    fn ordered(&self, mut record: Vec<String>) -> Vec<String> {
        if self.tr.locale().is_rtl() {
            record.reverse();
        }
        record
    }

    fn render_table(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.ordered(self.headers()));
        for row in rows {
            builder.push_record(self.ordered(self.cells(row, false)));
        }

        let mut out = finish_table(builder, self.tr);
        out.push('\n');
        if self.show_summary {
            out.push_str(&format!(
                "{} {} · {} {}\n",
                style(self.tr.digits(&rows.len().to_string())).cyan(),
                self.tr.t("rows_found"),
                self.tr.t("short_id_hint"),
                style(format!("{}@1", self.prefix)).cyan()
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut headers = vec!["short_id".to_string(), "id".to_string()];
        headers.extend(self.columns.iter().map(|c| c.key.to_string()));

        let mut out = headers.join(",");
        out.push('\n');
        for row in rows {
            let mut values = vec![escape_csv(&row.short_id), escape_csv(&row.full_id)];
            for col in self.columns {
                values.push(row.get(col.key).map(CellValue::format_csv).unwrap_or_default());
            }
            out.push_str(&values.join(","));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers());
        for row in rows {
            builder.push_record(self.cells(row, true));
        }
        let mut table = builder.build();
        table.with(Style::markdown());
        format!("{}\n", table)
    }

    fn render_ids(&self, rows: &[TableRow]) -> String {
        rows.iter().map(|r| format!("{}\n", r.full_id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::i18n::Locale;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("name", "project_name"),
        ColumnDef::new("status", "project_status"),
        ColumnDef::new("budget", "project_budget"),
    ];

    fn rows() -> Vec<TableRow> {
        vec![
            TableRow::new("PRJ-01", Some("PRJ@1"))
                .cell("name", CellValue::Text("Harbour Road, North".to_string()))
                .cell("status", CellValue::ProjectStatus(ProjectStatus::OnHold))
                .cell("budget", CellValue::Money(4_500_000.0)),
            TableRow::new("PRJ-02", Some("PRJ@2"))
                .cell("name", CellValue::Text("Library".to_string()))
                .cell("status", CellValue::ProjectStatus(ProjectStatus::Active)),
        ]
    }

    #[test]
    fn test_csv_is_not_localized() {
        let tr = Translator::new(Locale::Ar).unwrap();
        let out = TableFormatter::new(COLUMNS, &tr, EntityPrefix::Prj).render(&rows(), OutputFormat::Csv);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "short_id,id,name,status,budget");
        assert_eq!(lines[1], "PRJ@1,PRJ-01,\"Harbour Road, North\",on_hold,4500000");
        assert_eq!(lines[2], "PRJ@2,PRJ-02,Library,active,");
    }

    #[test]
    fn test_ids_output() {
        let tr = Translator::new(Locale::En).unwrap();
        let out = TableFormatter::new(COLUMNS, &tr, EntityPrefix::Prj).render(&rows(), OutputFormat::Id);
        assert_eq!(out, "PRJ-01\nPRJ-02\n");
    }

    #[test]
    fn test_table_uses_translated_labels() {
        let tr = Translator::new(Locale::En).unwrap();
        let out = TableFormatter::new(COLUMNS, &tr, EntityPrefix::Prj)
            .without_summary()
            .render(&rows(), OutputFormat::Table);
        assert!(out.contains("Project name"));
        assert!(out.contains("On hold"));
        assert!(out.contains("4,500,000"));
    }

    #[test]
    fn test_arabic_table_localizes_numbers() {
        let tr = Translator::new(Locale::Ar).unwrap();
        let out = TableFormatter::new(COLUMNS, &tr, EntityPrefix::Prj)
            .without_summary()
            .render(&rows(), OutputFormat::Table);
        assert!(out.contains("اسم المشروع"));
        assert!(out.contains("٤٬٥٠٠٬٠٠٠"));
    }

    #[test]
    fn test_markdown_table() {
        let tr = Translator::new(Locale::En).unwrap();
        let out = TableFormatter::new(COLUMNS, &tr, EntityPrefix::Prj).render(&rows(), OutputFormat::Md);
        assert!(out.starts_with("| #"));
        assert!(out.contains("| PRJ@1 "));
    }

    #[test]
    fn test_cell_display() {
        let tr = Translator::new(Locale::En).unwrap();
        assert_eq!(CellValue::Percent(42).display(&tr), "42%");
        assert_eq!(CellValue::Read(false).display(&tr), "Unread");
        assert_eq!(CellValue::Empty.display(&tr), "-");
        assert_eq!(CellValue::Severity(Severity::Danger).display(&tr), "Urgent");
    }
}
