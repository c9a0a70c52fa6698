use serde::Serialize;

const COLUMN_GAP: &str = "  ";

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    print!("{}", render_table(headers, &rows));
}

/// Left-aligned columns sized to the widest cell, measured in chars so
/// non-ASCII paths line up. Cells past the last header are dropped.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: Vec<String>| {
        out.push_str(cells.join(COLUMN_GAP).trim_end());
        out.push('\n');
    };
    let pad = |cell: &str, width: usize| format!("{cell:<width$}");

    push_line(headers.iter().zip(&widths).map(|(h, w)| pad(*h, *w)).collect());
    push_line(widths.iter().map(|w| "-".repeat(*w)).collect());
    for row in rows {
        push_line(row.iter().zip(&widths).map(|(c, w)| pad(c.as_str(), *w)).collect());
    }
    out
}
