//! Terminal rendering of step snapshots and iteration tables.
use tabled::{Table, Tabled, builder::Builder, settings::Style};

use crate::steps::StepRecord;

pub fn render_rows<T: Tabled>(rows: &[T]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::modern_rounded());
    table.to_string()
}

/// Pretty printed matrix snapshot as a borderless grid.
pub fn render_matrix(matrix: &[Vec<String>]) -> String {
    let mut table = Builder::from(matrix.to_vec()).build();
    table.with(Style::blank());
    table.to_string()
}

/// Every record with its operation text and, when present, its snapshot.
pub fn render_states(states: &[StepRecord]) -> String {
    let mut out = String::new();
    for record in states {
        out.push_str(&format!("[{}] {}: {}\n", record.index, record.tag, record.operation));
        if let Some(matrix) = &record.matrix {
            out.push_str(&render_matrix(matrix));
            out.push('\n');
        }
        if let Some(note) = &record.note {
            out.push_str(&format!("    {note}\n"));
        }
    }
    out
}
