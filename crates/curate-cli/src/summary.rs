use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use curate_common::redact_value;
use curate_cli::types::{DictionaryRow, PrepareResult, RecodeResult, ScanResult};

pub fn print_prepare_summary(result: &PrepareResult) {
    println!("Output: {}", result.output.display());
    if let Some(report) = &result.normalization {
        if let Some(path) = &report.unmapped_path {
            println!("Unmapped labels: {}", path.display());
        }
        if let Some(path) = &report.mappings_path {
            println!("Successful mappings: {}", path.display());
        }
    }
    if let Some(path) = &result.label_index {
        println!("Label index: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Removed"),
        header_cell("Rows"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);

    table.add_row(vec![
        Cell::new("source"),
        dim_cell("-"),
        Cell::new(result.source_rows),
    ]);
    for stage in &result.stages {
        table.add_row(vec![
            Cell::new(&stage.stage),
            count_cell(stage.removed, Color::Yellow),
            Cell::new(stage.remaining),
        ]);
    }
    if let Some(report) = &result.normalization {
        table.add_row(vec![
            Cell::new("normalize (unmapped / mapped)"),
            count_cell(report.unmapped_rows, Color::Yellow),
            Cell::new(report.mapped),
        ]);
    }
    if let Some(relocation) = &result.relocation {
        table.add_row(vec![
            Cell::new(format!("relocate to {}", relocation.target)),
            count_cell(relocation.failed, Color::Red),
            Cell::new(relocation.relocated),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.source_rows.saturating_sub(result.output_rows))
            .add_attribute(Attribute::Bold),
        Cell::new(result.output_rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    if !result.missing_ids.is_empty() {
        println!("Labels without a numeric id: {}", result.missing_ids.len());
        for label in &result.missing_ids {
            println!("  {}", redact_value(label));
        }
    }
}

pub fn print_dictionaries(rows: &[DictionaryRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Mode"),
        header_cell("Label"),
        header_cell("Entries"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for row in rows {
        table.add_row(vec![
            dim_cell(row.mode),
            Cell::new(&row.label),
            Cell::new(row.entries),
        ]);
    }
    println!("{table}");
}

pub fn print_recode_summary(result: &RecodeResult) {
    println!("Recode table: {}", result.output.display());
    println!("Ids: {}  Raw labels: {}", result.ids, result.raw_labels);
    if !result.unmatched.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Dropped key")]);
        apply_table_style(&mut table);
        for key in &result.unmatched {
            table.add_row(vec![Cell::new(key).fg(Color::Yellow)]);
        }
        println!("{table}");
    }
}

pub fn print_scan_summary(result: &ScanResult) {
    println!("Labels: {}", result.output.display());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Label"), header_cell("Files")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (label, files) in &result.per_label {
        table.add_row(vec![Cell::new(label), Cell::new(files)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.files).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
