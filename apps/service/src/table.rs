//! Plain-text tables for `webcheck list`

use chrono::DateTime;
use webcheck::{CheckKind, CheckRecord, Snapshot};

fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

fn title(kind: CheckKind) -> &'static str {
    match kind {
        CheckKind::Hash => "Hash Checks:",
        CheckKind::Presence => "String Checks:",
        CheckKind::Diff => "Diff Checks:",
    }
}

fn headers(kind: CheckKind) -> Vec<&'static str> {
    let mut headers = vec!["url"];
    headers.extend_from_slice(match kind {
        CheckKind::Hash => &["current_hash", "previous_hash"][..],
        CheckKind::Presence => &["string_to_match", "present"][..],
        CheckKind::Diff => &["content"][..],
    });
    headers.extend_from_slice(&[
        "failed_since",
        "max_down_time",
        "run_after",
        "check_frequency",
        "check_timeout",
    ]);
    headers
}

fn cells(record: &CheckRecord) -> Vec<String> {
    let mut cells = vec![record.url.clone()];
    match &record.snapshot {
        Snapshot::Hash(state) => {
            cells.push(state.current.clone());
            cells.push(state.previous.clone().unwrap_or_else(|| "-".to_string()));
        }
        Snapshot::Presence(state) => {
            cells.push(state.target.clone());
            cells.push(state.present.to_string());
        }
        Snapshot::Diff(state) => {
            cells.push(format!("{} lines", state.content.lines().count()));
        }
    }
    cells.push(record.failed_since.map(format_timestamp).unwrap_or_else(|| "-".to_string()));
    cells.push(record.max_down_time.to_string());
    cells.push(if record.run_after <= 0 {
        "next pass".to_string()
    } else {
        format_timestamp(record.run_after)
    });
    cells.push(record.check_frequency.to_string());
    cells.push(record.check_timeout.to_string());
    cells
}

fn render_row(row: &[String], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in row.iter().zip(widths) {
        line.push_str(&format!(" {:<width$} |", cell, width = *width));
    }
    line
}

/// Render the records of one kind as a padded table
pub fn render(kind: CheckKind, records: &[CheckRecord]) -> String {
    let header: Vec<String> = headers(kind).into_iter().map(str::to_string).collect();
    let rows: Vec<Vec<String>> = records.iter().map(cells).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![title(kind).to_string(), render_row(&header, &widths)];
    lines.extend(rows.iter().map(|row| render_row(row, &widths)));
    lines.join("\n")
}
