use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use sales_model::RuleId;

use crate::types::CleanResult;

pub fn print_summary(result: &CleanResult) {
    let report = &result.report;
    println!("Source: {}", result.source_key);
    println!("SHA-256: {}", result.input_sha256);
    match (&result.output_key, &result.report_key) {
        (Some(output), Some(report_key)) => {
            println!("Output: {output}");
            println!("Report: {report_key}");
        }
        _ => println!("Output: dry run, nothing stored"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Input"),
        header_cell("Kept"),
        header_cell("Dropped"),
        header_cell("Dropped %"),
        header_cell("Malformed"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(report.input_rows),
        Cell::new(report.output_rows)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        count_cell(report.dropped_rows(), Color::Red),
        Cell::new(format!("{:.2}", report.drop_percentage())),
        count_cell(report.malformed_rows, Color::Yellow),
    ]);
    println!("{table}");

    print_drop_table(result);
    print_reason_table(result);
    print_alteration_table(result);
    print_coercion_table(result);
}

fn print_drop_table(result: &CleanResult) {
    let report = &result.report;
    if report.dropped_by_rule.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Reason"),
        header_cell("Description"),
        header_cell("Dropped"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for (rule, count) in &report.dropped_by_rule {
        let reason = report
            .drops
            .iter()
            .find(|event| event.rule == *rule)
            .map_or_else(|| "-".to_string(), |event| event.reason.to_string());
        table.add_row(vec![
            rule_cell(*rule),
            Cell::new(reason),
            description_cell(result, *rule),
            count_cell(*count, Color::Red),
        ]);
    }
    println!();
    println!("Dropped rows:");
    println!("{table}");
}

fn print_reason_table(result: &CleanResult) {
    let by_reason = result.report.dropped_by_reason();
    if by_reason.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Reason"), header_cell("Dropped")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (reason, count) in by_reason {
        table.add_row(vec![Cell::new(reason.code()), count_cell(count, Color::Red)]);
    }
    println!();
    println!("Drops by reason:");
    println!("{table}");
}

fn print_alteration_table(result: &CleanResult) {
    let report = &result.report;
    if report.altered_by_rule.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Description"),
        header_cell("Altered"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (rule, count) in &report.altered_by_rule {
        table.add_row(vec![
            rule_cell(*rule),
            description_cell(result, *rule),
            count_cell(*count, Color::Yellow),
        ]);
    }
    println!();
    println!("Altered values:");
    println!("{table}");
}

fn print_coercion_table(result: &CleanResult) {
    let failures = &result.report.coercion_failures;
    if failures.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Uncoercible")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (field, count) in failures {
        table.add_row(vec![Cell::new(field), count_cell(*count, Color::Yellow)]);
    }
    println!();
    println!("Coercion failures:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
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

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn rule_cell(rule: RuleId) -> Cell {
    Cell::new(rule)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn description_cell(result: &CleanResult, rule: RuleId) -> Cell {
    match result.rule_descriptions.get(&rule) {
        Some(description) => Cell::new(description),
        None => dim_cell("-"),
    }
}

fn count_cell(count: u64, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
