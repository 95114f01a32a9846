use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    data::Value,
    schema::{StoreType, TableSchema},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Two-column listing of a schema: name and store type.
pub fn render_schema(schema: &TableSchema) -> String {
    let headers = vec!["#".to_string(), "column".to_string(), "type".to_string()];
    let rows = schema
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            vec![
                (idx + 1).to_string(),
                column.name.clone(),
                column.datatype.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    render_grid(&headers, &rows, &[Align::Right, Align::Left, Align::Left])
}

/// Renders stored rows under their column names. Numeric columns are right
/// aligned and nulls print as `NULL`.
pub fn render_rows(schema: &TableSchema, rows: &[Vec<Value>]) -> String {
    let headers = schema.names();
    let aligns = schema
        .columns
        .iter()
        .map(|column| match column.datatype {
            StoreType::Integer | StoreType::Float => Align::Right,
            _ => Align::Left,
        })
        .collect::<Vec<_>>();
    let cells = rows
        .iter()
        .map(|row| row.iter().map(Value::as_display).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    render_grid(&headers, &cells, &aligns)
}

pub fn print_schema(schema: &TableSchema) {
    print!("{}", render_schema(schema));
}

pub fn print_rows(schema: &TableSchema, rows: &[Vec<Value>]) {
    print!("{}", render_rows(schema, rows));
}

fn render_grid(headers: &[String], rows: &[Vec<String>], aligns: &[Align]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let header_aligns = vec![Align::Left; column_count];
    let _ = writeln!(output, "{}", format_row(headers, &widths, &header_aligns));

    let separator_cells = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator_cells, &widths, &header_aligns));

    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, aligns));
    }

    output
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate().take(widths.len()) {
        let sanitized = sanitize_cell(value);
        let padding = widths[idx].saturating_sub(display_width(&sanitized));
        let cell = match aligns.get(idx).copied().unwrap_or(Align::Left) {
            Align::Left => format!("{sanitized}{}", " ".repeat(padding)),
            Align::Right => format!("{}{sanitized}", " ".repeat(padding)),
        };
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(
            value
                .chars()
                .map(|ch| match ch {
                    '\n' | '\r' | '\t' => ' ',
                    other => other,
                })
                .collect(),
        )
    } else {
        Cow::Borrowed(value)
    }
}
