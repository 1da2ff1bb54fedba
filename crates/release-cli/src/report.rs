use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use release_export::ResolvedPlan;
use release_model::{RequestManifest, StageReport, TimepointCode};
use release_cli::pipeline::ReleaseRun;

pub fn print_run(run: &ReleaseRun) {
    println!("Release: {}", run.release);
    println!("Output: {}", run.output_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Files"),
        header_cell("Rows"),
        header_cell("Skipped"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for report in &run.reports {
        table.add_row(vec![
            Cell::new(&report.stage)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(report.written.len()),
            Cell::new(report.total_rows()),
            count_cell(report.skipped.len(), Color::Yellow),
        ]);
    }
    println!("{table}");
    print_skips(&run.reports);
}

fn print_skips(reports: &[StageReport]) {
    let skipped: Vec<_> = reports
        .iter()
        .flat_map(|report| report.skipped.iter().map(move |skip| (&report.stage, skip)))
        .collect();
    if skipped.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("File / table"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    for (stage, skip) in skipped {
        table.add_row(vec![
            dim_cell(stage),
            Cell::new(&skip.subject),
            Cell::new(skip.reason.to_string()).fg(Color::Yellow),
        ]);
    }
    println!();
    println!("Skipped:");
    println!("{table}");
}

pub fn print_manifest(manifest: &RequestManifest) {
    if let Some(id) = &manifest.request_id {
        println!("Request: {id}");
    }
    if !manifest.assessment_window.is_empty() {
        println!("Windows: {}", manifest.assessment_window.join(", "));
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Item"),
        header_cell("Tables"),
        header_cell("Variables"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for item in &manifest.items {
        let variables = if item.exports_all_columns() {
            dim_cell("all")
        } else {
            Cell::new(item.requested_variables.join(", "))
        };
        table.add_row(vec![
            Cell::new(item.item_number).add_attribute(Attribute::Bold),
            Cell::new(item.table_names.join(", ")),
            variables,
        ]);
    }
    println!("{table}");
}

pub fn print_plan(plan: &ResolvedPlan) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Item"),
        header_cell("Table"),
        header_cell("Columns"),
        header_cell("Output"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for entry in &plan.entries {
        table.add_row(vec![
            Cell::new(entry.item_number).add_attribute(Attribute::Bold),
            Cell::new(&entry.table).fg(Color::Blue),
            Cell::new(entry.columns.describe()),
            dim_cell(entry.output_file_name()),
        ]);
    }
    println!("{table}");
    print_skips(std::slice::from_ref(&plan.report));
}

pub fn print_windows() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Window"),
        header_cell("Label"),
        header_cell("Visit code"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for timepoint in TimepointCode::ALL {
        table.add_row(vec![
            Cell::new(timepoint.window_name()),
            Cell::new(timepoint.label()).fg(Color::Blue),
            Cell::new(timepoint.visit_code()),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
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

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
