//! Plain-text table rendering for `show interfaces`.

use crate::types::InterfaceView;

/// Column headers, in display order.
pub const HEADERS: [&str; 5] = ["Interface", "Admin", "Oper", "Link", "Last Change"];

/// Renders views as a bordered table with a header row.
///
/// An empty slice still renders the header.
pub fn render_interfaces(views: &[InterfaceView]) -> String {
    let rows: Vec<[&str; 5]> = views
        .iter()
        .map(|v| {
            [
                v.name.as_str(),
                v.admin_state.as_str(),
                v.oper_status.as_str(),
                v.link_status.as_str(),
                v.last_changed.as_str(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = border_line(&widths);
    let mut out = String::new();
    out.push_str(&border);
    out.push_str(&row_line(&HEADERS, &widths));
    out.push_str(&border);
    for row in &rows {
        out.push_str(&row_line(row, &widths));
    }
    if !rows.is_empty() {
        out.push_str(&border);
    }
    out
}

fn border_line(widths: &[usize; 5]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn row_line(cells: &[&str; 5], widths: &[usize; 5]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths.iter()) {
        let pad = width - cell.chars().count();
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(pad + 1));
        line.push('|');
    }
    line.push('\n');
    line
}
