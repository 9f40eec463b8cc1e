use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use gmd_cli::commands::{ConvertReport, InspectReport, TriggerReport};
use gmd_format::GmdVariant;

const DESCRIPTION_WIDTH: usize = 60;

pub fn print_formats() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Extension"),
        header_cell("Framing"),
        header_cell("Version"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for variant in GmdVariant::ALL {
        table.add_row(vec![
            Cell::new(format!(".{}", variant.extension()))
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(variant.framing()),
            Cell::new(variant.format_version()),
        ]);
    }
    println!("{table}");
}

pub fn print_inspect(report: &InspectReport) {
    let level = &report.imported.level;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut table);

    let song = if level.uses_custom_song() {
        format!("custom {}", level.song_id)
    } else {
        format!("official {}", level.official_song)
    };
    let mut rows = vec![
        ("File", report.path.display().to_string()),
        ("Name", level.name.clone()),
        ("Format", format!(".{}", report.imported.variant)),
        ("Objects", level.object_count().to_string()),
        ("Song", song),
        ("Description", truncate(&level.description, DESCRIPTION_WIDTH)),
        ("Sequence triggers", report.sequence_triggers.to_string()),
    ];
    if report.imported.legacy {
        rows.push(("Layout", "legacy".to_string()));
    }
    if report.imported.variant.expands_triggers() {
        rows.push((
            "Expanded records",
            report.imported.triggers.records.to_string(),
        ));
        rows.push((
            "Dropped tokens",
            report.imported.triggers.rejected.len().to_string(),
        ));
    }
    if let Some(placement) = &report.imported.song {
        rows.push(("Song written", placement.target.display().to_string()));
        if let Some(displaced) = &placement.displaced {
            rows.push(("Previous song", displaced.display().to_string()));
        }
    }
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    println!("{table}");
}

pub fn print_convert(report: &ConvertReport) {
    println!(
        "Converted .{} -> .{}: {} ({} objects)",
        report.input_variant,
        report.output_variant,
        report.output.display(),
        report.objects
    );
    if report.song_included {
        println!("Song embedded in archive");
    }
    if let Some(placement) = &report.song {
        println!("Song written: {}", placement.target.display());
        if let Some(displaced) = &placement.displaced {
            println!("Previous song kept as: {}", displaced.display());
        }
    }
}

pub fn print_triggers(report: &TriggerReport) {
    if let Some(records) = report.expanded_records {
        println!("Expanded {records} sequence trigger record(s)");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Group"),
        header_cell("Activations"),
    ]);
    apply_table_style(&mut table);
    for column in 0..3 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for (index, trigger) in report.scan.triggers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(trigger.group),
            Cell::new(trigger.activations),
        ]);
    }
    println!("{table}");
    println!(
        "{} trigger(s) in .{} data",
        report.scan.triggers.len(),
        report.variant
    );
    for rejected in &report.scan.rejected {
        println!(
            "dropped token {:?} in record at byte {}",
            rejected.token, rejected.record_offset
        );
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
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

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
