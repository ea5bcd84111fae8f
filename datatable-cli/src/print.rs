//! Plain-text table output

use std::fmt::Write;

use datatable_lib::table::Alignment;
use datatable_lib::table::ExpansionView;
use datatable_lib::table::HeaderKind;
use datatable_lib::table::PaginationView;
use datatable_lib::table::RenderedRow;
use datatable_lib::table::TableBody;
use datatable_lib::table::TableView;

const SEPARATOR: &str = " | ";
const INDENT: &str = "      ";

/// Formats a table view as text. `sub_lines` renders an expanded row's
/// sub-data.
pub fn format_view<S>(view: &TableView<S>, sub_lines: impl Fn(&S) -> Vec<String>) -> String {
    let mut out = String::new();

    if let Some(title) = &view.title {
        let _ = writeln!(out, "{}", title);
    }
    if let Some(search) = &view.search {
        let shown = match (search.value.is_empty(), &search.placeholder) {
            (true, Some(placeholder)) => format!("({})", placeholder),
            _ => search.value.clone(),
        };
        let _ = writeln!(out, "Search: {}", shown);
    }

    let has_toggle = view
        .header
        .first()
        .is_some_and(|cell| cell.kind == HeaderKind::Toggle);
    let has_actions = view
        .header
        .last()
        .is_some_and(|cell| cell.kind == HeaderKind::Actions);

    let lines: Vec<Vec<String>> = match &view.body {
        TableBody::Rows(rows) => rows
            .iter()
            .map(|row| row_cells(row, has_toggle, has_actions))
            .collect(),
        _ => Vec::new(),
    };

    let mut widths: Vec<usize> = view
        .header
        .iter()
        .map(|cell| cell.label.chars().count().max(3))
        .collect();
    for cells in &lines {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }
    let total_width =
        widths.iter().sum::<usize>() + SEPARATOR.len() * widths.len().saturating_sub(1);
    let rule = "-".repeat(total_width);

    let header: Vec<String> = view
        .header
        .iter()
        .zip(&widths)
        .map(|(cell, width)| pad(&cell.label, *width, cell.align))
        .collect();
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", header.join(SEPARATOR).trim_end());
    let _ = writeln!(out, "{}", rule);

    match &view.body {
        TableBody::Loading { rows, .. } => {
            let skeleton: Vec<String> = widths.iter().map(|width| "░".repeat(*width)).collect();
            for _ in 0..*rows {
                let _ = writeln!(out, "{}", skeleton.join(SEPARATOR));
            }
        }
        TableBody::Error(message) => {
            let line = pad(&format!("Error: {}", message), total_width, Alignment::Center);
            let _ = writeln!(out, "{}", line.trim_end());
        }
        TableBody::Empty(message) => {
            let _ = writeln!(out, "{}", pad(message, total_width, Alignment::Center).trim_end());
        }
        TableBody::Rows(rows) => {
            for (row, cells) in rows.iter().zip(&lines) {
                let aligned: Vec<String> = cells
                    .iter()
                    .zip(&widths)
                    .zip(&view.header)
                    .map(|((cell, width), header)| pad(cell, *width, header.align))
                    .collect();
                let _ = writeln!(out, "{}", aligned.join(SEPARATOR).trim_end());

                if let Some(expansion) = &row.expansion {
                    for line in expansion_lines(expansion, &sub_lines) {
                        let _ = writeln!(out, "{}{}", INDENT, line);
                    }
                }
            }
        }
    }
    let _ = writeln!(out, "{}", rule);

    if let Some(pagination) = &view.pagination {
        let _ = writeln!(out, "{}", pagination_line(pagination));
    }
    out
}

fn row_cells<S>(row: &RenderedRow<S>, has_toggle: bool, has_actions: bool) -> Vec<String> {
    let mut cells = Vec::with_capacity(row.cells.len() + 2);
    if has_toggle {
        cells.push(
            match row.toggle {
                Some(true) => "[-]",
                Some(false) => "[+]",
                None => "",
            }
            .to_string(),
        );
    }
    cells.extend(row.cells.iter().map(|cell| cell.content.clone()));
    if has_actions {
        cells.push(row.actions.join(" "));
    }
    cells
}

fn expansion_lines<S>(
    expansion: &ExpansionView<S>,
    sub_lines: &impl Fn(&S) -> Vec<String>,
) -> Vec<String> {
    if expansion.loading {
        return vec!["Loading...".to_string()];
    }
    if let Some(error) = &expansion.error {
        return vec![format!("Error: {}", error)];
    }
    match &expansion.sub_data {
        Some(sub_data) => sub_lines(sub_data),
        None => vec!["No data".to_string()],
    }
}

fn pagination_line(pagination: &PaginationView) -> String {
    let options: Vec<String> = pagination
        .page_size_options
        .iter()
        .map(|size| {
            if *size == pagination.page_size {
                format!("[{}]", size)
            } else {
                size.to_string()
            }
        })
        .collect();
    format!(
        "{} ({} total) | Rows per page: {} | {} {}",
        pagination.label(),
        pagination.total,
        options.join(" "),
        if pagination.prev_enabled { "< Prev" } else { "  ----" },
        if pagination.next_enabled { "Next >" } else { "----  " },
    )
}

fn pad(text: &str, width: usize, align: Alignment) -> String {
    match align {
        Alignment::Left => format!("{:<width$}", text),
        Alignment::Center => format!("{:^width$}", text),
        Alignment::Right => format!("{:>width$}", text),
    }
}
