use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use passcheck_model::{CheckResult, LedgerEntry, Severity};

use crate::types::FeatureRun;

pub fn print_summary(run: &FeatureRun) {
    let summary = run.ledger.summary();
    println!();
    println!("Feature: {} ({})", run.feature.title(), run.feature.command());
    if let Some(path) = &run.log {
        println!("Detailed log: {}", path.display());
    }
    if let Some(path) = &run.report {
        println!("CSV report: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Checks"),
        header_cell("Passed"),
        header_cell("Failed"),
        header_cell("Pass rate"),
        header_cell("Warnings"),
        header_cell("Errors"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(summary.total_checks).add_attribute(Attribute::Bold),
        count_cell(summary.passed_checks, Color::Green),
        count_cell(summary.failed_checks, Color::Red),
        rate_cell(summary.pass_rate(), summary.failed_checks),
        count_cell(summary.warnings, Color::Yellow),
        count_cell(summary.errors, Color::Red),
    ]);
    println!("{table}");
    print_issue_table(run);
    if !run.errors.is_empty() {
        eprintln!("Errors:");
        for error in &run.errors {
            eprintln!("- {error}");
        }
    }
}

fn print_issue_table(run: &FeatureRun) {
    let groups = run.ledger.errors_by_subject();
    if groups.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(run.feature.subject()),
        header_cell("Result"),
        header_cell("Check"),
        header_cell("Expected"),
        header_cell("Actual"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    for group in groups {
        let subject = match group.subject {
            Some(subject) => Cell::new(subject)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            None => dim_cell("-"),
        };
        for entry in group.entries {
            let row = match entry {
                LedgerEntry::Check(check) => check_row(check),
                LedgerEntry::Notice(notice) => vec![
                    severity_cell(notice.severity),
                    Cell::new(&notice.message),
                    dim_cell("-"),
                    dim_cell("-"),
                ],
                LedgerEntry::Phase { .. } | LedgerEntry::Info { .. } => continue,
            };
            let mut cells = vec![subject.clone()];
            cells.extend(row);
            table.add_row(cells);
        }
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn check_row(check: &CheckResult) -> Vec<Cell> {
    vec![
        Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Cell::new(&check.label),
        value_cell(check.expected.as_deref()),
        value_cell(check.actual.as_deref()),
    ]
}

fn value_cell(value: Option<&str>) -> Cell {
    match value {
        Some(text) if !text.is_empty() => Cell::new(text),
        _ => dim_cell("-"),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn rate_cell(rate: f64, failed: usize) -> Cell {
    let color = if failed == 0 { Color::Green } else { Color::Yellow };
    Cell::new(format!("{rate:.1}%")).fg(color)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() >= 5 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(16)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Percentage(50)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
        ]);
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
