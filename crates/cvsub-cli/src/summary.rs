//! Terminal run summaries.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cvsub_core::annotate::AnnotateSummary;
use cvsub_core::pipeline::{RunSummary, StatusOutcome};
use cvsub_core::registry::SubmissionStatus;

pub fn print_run_summary(summary: &RunSummary) {
    println!("Input rows: {}", summary.input_rows);
    if summary.duplicates_removed > 0 {
        println!("Duplicate rows removed: {}", summary.duplicates_removed);
    }
    if !summary.discarded.is_empty() {
        println!(
            "Alternate alleles discarded at multi-allelic sites: {}",
            summary.discarded.len()
        );
    }
    if let Some(key) = &summary.cleaned_table_key {
        println!("Cleaned variants: {key}");
    }
    if let Some(key) = &summary.cleaned_haplotypes_key {
        println!("Cleaned haplotypes: {key}");
    }

    let mut classes = Table::new();
    classes.set_header(vec![
        header_cell(""),
        header_cell("Novel"),
        header_cell("Update"),
        header_cell("Unchanged"),
    ]);
    apply_table_style(&mut classes);
    for column in 1..4 {
        align_column(&mut classes, column, CellAlignment::Right);
    }
    classes.add_row(vec![
        Cell::new("Variants").add_attribute(Attribute::Bold),
        Cell::new(summary.variants.novel),
        Cell::new(summary.variants.update),
        Cell::new(summary.variants.unchanged),
    ]);
    classes.add_row(vec![
        Cell::new("Haplotypes").add_attribute(Attribute::Bold),
        Cell::new(summary.haplotypes.novel),
        Cell::new(summary.haplotypes.update),
        Cell::new(summary.haplotypes.unchanged),
    ]);
    println!("{classes}");

    if !summary.batches.is_empty() {
        let mut batches = Table::new();
        batches.set_header(vec![
            header_cell("Type"),
            header_cell("Intent"),
            header_cell("Rows"),
            header_cell("Submission"),
            header_cell("Report"),
        ]);
        apply_table_style(&mut batches);
        align_column(&mut batches, 2, CellAlignment::Right);
        for batch in &summary.batches {
            let (submission, report) = match (&batch.submission_id, &batch.error) {
                (Some(id), _) => (
                    Cell::new(id).fg(Color::Green),
                    Cell::new(batch.report_location.as_deref().unwrap_or("-")),
                ),
                (None, Some(error)) => (Cell::new("rejected").fg(Color::Red), Cell::new(error)),
                (None, None) => (Cell::new("-"), Cell::new("-")),
            };
            batches.add_row(vec![
                Cell::new(batch.record_type),
                Cell::new(batch.intent),
                Cell::new(batch.rows),
                submission,
                report,
            ]);
        }
        println!("{batches}");
    }

    if !summary.conflicts.is_empty() {
        eprintln!("Conflicts:");
        for conflict in &summary.conflicts {
            eprintln!("- {conflict}");
        }
    }
    if !summary.issues.is_empty() {
        eprintln!("Issues:");
        for issue in &summary.issues {
            eprintln!("- {issue}");
        }
    }
}

pub fn print_status(outcome: &StatusOutcome) {
    match &outcome.status {
        SubmissionStatus::Pending => println!("Submission is still processing."),
        SubmissionStatus::Failed { message } => println!("Submission failed: {message}"),
        SubmissionStatus::Ready { location } => {
            println!("Report ready: {location}");
            if let Some(key) = &outcome.report_key {
                println!("Saved as: {key}");
            }
        }
    }
}

pub fn print_annotate_summary(summary: &AnnotateSummary) {
    println!(
        "Annotated {} of {} rows ({} carried forward).",
        summary.annotated, summary.rows, summary.carried_forward
    );
    if !summary.unmatched.is_empty() {
        eprintln!("Report outcomes without a matching row:");
        for key in &summary.unmatched {
            eprintln!("- {key}");
        }
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
