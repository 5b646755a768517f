use std::io::Write;

use log::debug;

use crate::engine::{Column, Cursor};
use crate::error::{Error, Result};

/// The outcome of rendering a result set.
#[derive(Debug, Default, PartialEq)]
pub struct Rendered {
    /// The number of body rows written.
    pub rows: usize,
    /// Errors reading individual values or records. Rendering continued past each of them.
    pub errors: Vec<Error>,
}

/// Renders a result set as an HTML table captioned with the query text. Values are written as
/// is, without escaping. A value that can't be read leaves its cell empty, and a record that
/// can't be read ends the table body; both are collected in the outcome. Only output errors
/// are returned as Err.
pub fn render_html(output: &mut dyn Write, query: &str, cursor: &mut dyn Cursor) -> Result<Rendered> {
    let mut rendered = Rendered::default();
    let width = cursor.columns().len();

    writeln!(output, "<table>")?;
    writeln!(output, "\t<caption>{}</caption>", query)?;

    write!(output, "\t<tr>")?;
    for column in cursor.columns() {
        write!(output, "<th>{}</th>", header(column))?;
    }
    writeln!(output, "</tr>")?;

    loop {
        let record = match cursor.next_record() {
            Ok(Some(record)) => record,
            Ok(None) => break,
            Err(err) => {
                debug!("Stopped reading records after {}: {}", rendered.rows, err);
                rendered.errors.push(err);
                break;
            }
        };
        write!(output, "\t<tr>")?;
        for index in 0..width {
            match record.value(index) {
                Ok(value) => write!(output, "<td>{}</td>", value)?,
                Err(err) => {
                    write!(output, "<td></td>")?;
                    rendered.errors.push(err);
                }
            }
        }
        writeln!(output, "</tr>")?;
        rendered.rows += 1;
    }

    writeln!(output, "</table>")?;
    Ok(rendered)
}

// The column name, followed by its label when that differs.
fn header(column: &Column) -> String {
    match column.label == column.name {
        true => column.name.clone(),
        false => format!("{} ( {} )", column.name, column.label),
    }
}
