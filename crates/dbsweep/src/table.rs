use dbsweep_core::{CandidateRow, CleanupHandler, SqlValue, SweepReport};

const MAX_CELL_WIDTH: usize = 40;

/// Print a bordered table. Column widths fit the widest cell, capped at
/// `MAX_CELL_WIDTH`.
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let border = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, segments.join(mid), right)
    };
    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| truncate(cells.get(i).map(String::as_str).unwrap_or(""), *w))
            .collect();
        format!("│ {} │", padded.join(" │ "))
    };

    println!("{}", border("┌", "┬", "┐"));
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    println!("{}", line(&header_cells));
    println!("{}", border("├", "┼", "┤"));
    for row in rows {
        println!("{}", line(row));
    }
    println!("{}", border("└", "┴", "┘"));
}

/// One line per registered category.
pub fn print_types_table(handlers: &[&dyn CleanupHandler]) {
    let rows: Vec<Vec<String>> = handlers
        .iter()
        .map(|h| {
            vec![
                h.items_type().to_string(),
                h.table().to_string(),
                h.sortable_columns().join(", "),
                h.date_column().unwrap_or("-").to_string(),
            ]
        })
        .collect();
    print_table(&["Category", "Table", "Sortable", "Date column"], &rows);
}

/// Candidate rows, showing the handler's name/value pairing.
pub fn print_candidates_table(handler: &dyn CleanupHandler, rows: &[CandidateRow]) {
    let name_header = handler.name_column();
    let value_header = handler.value_column();
    let table_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.site_id.to_string(),
                cell(row.columns.get(handler.pk())),
                cell(row.columns.get(name_header)),
                cell(row.columns.get(value_header)),
                row.size().to_string(),
                row.composite_id
                    .as_ref()
                    .map(item_spec)
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(
        &["Site", handler.pk(), name_header, value_header, "Size", "Item"],
        &table_rows,
    );
}

/// Per-site outcome of a delete or purge.
pub fn print_report_table(report: &SweepReport) {
    let rows: Vec<Vec<String>> = report
        .sites
        .iter()
        .map(|site| {
            vec![
                site.site_id.to_string(),
                site.affected.to_string(),
                site.error.clone().unwrap_or_else(|| "ok".to_string()),
            ]
        })
        .collect();
    print_table(&["Site", "Deleted", "Status"], &rows);
}

/// The `--item` form of an identity, so listings can be pasted into `delete`.
pub fn item_spec(id: &dbsweep_core::CompositeId) -> String {
    match id.term_taxonomy_id {
        Some(tt) => format!("{}:{}:{}", id.site_id, id.id, tt),
        None => format!("{}:{}", id.site_id, id.id),
    }
}

fn cell(value: Option<&SqlValue>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Pad or truncate to exactly `max_len` characters.
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        format!("{:<width$}", s, width = max_len)
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_len)
    }
}
