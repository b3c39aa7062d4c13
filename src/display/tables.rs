//! Table rendering for address listings and package summaries.

use crate::scope::ScopeReport;
use crate::spath::SpathEntry;
use comfy_table::{Attribute, Cell, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Address, kind and annotation of each entry.
pub fn create_entries_table(entries: &[SpathEntry]) -> String {
    entries
        .iter()
        .fold(
            TableBuilder::new().set_headers(vec!["Address", "Kind", "Info"]),
            |table, entry| {
                table.add_row(vec![
                    entry.path.clone(),
                    entry.kind.to_string(),
                    entry.annotation.clone().unwrap_or_default(),
                ])
            },
        )
        .build()
}

/// One row per package: path, declarations per kind and total.
pub fn create_package_table(rows: &[(String, Vec<(String, usize)>, usize)]) -> String {
    let mut builder = TableBuilder::new().set_headers(vec!["Package", "Kinds", "Symbols"]);
    let mut total = 0;
    for (package, kinds, count) in rows {
        total += count;
        let kinds = kinds
            .iter()
            .map(|(kind, n)| format!("{kind}: {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        builder = builder.add_row(vec![package.clone(), kinds, count.to_string()]);
    }
    if rows.len() > 1 {
        builder = builder.add_row(vec!["TOTAL".to_string(), String::new(), total.to_string()]);
    }
    builder.build()
}

/// Patterns and resolved package sets of a scope expression.
pub fn create_scope_table(report: &ScopeReport) -> String {
    let mut builder = TableBuilder::new().set_headers(vec!["Package", "Included", "Excluded"]);
    for package in &report.included {
        let excluded = report.excluded.contains(package);
        builder = builder.add_row(vec![
            package.clone(),
            "yes".to_string(),
            if excluded { "yes" } else { "" }.to_string(),
        ]);
    }
    for package in report.excluded.iter().filter(|p| !report.included.contains(p)) {
        builder = builder.add_row(vec![package.clone(), String::new(), "yes".to_string()]);
    }
    builder.build()
}
