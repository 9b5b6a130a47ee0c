//! Output formatting for CLI commands.
//!
//! Supports text (aligned columns), JSON and YAML output. Text tables are
//! laid out like Go's `tabwriter` with a padding of four spaces: every cell
//! but the last in a row is padded to its column's widest cell.

use std::fmt;
use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::cli::{DisplayArgs, Format};
use crate::error::CliError;

/// Spaces between columns.
const PADDING: usize = 4;

/// Output formatter shared by every command.
#[derive(Debug, Clone, Default)]
pub struct OutputFormat {
    format: Format,
    columns: Vec<String>,
    no_header: bool,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            format,
            columns: Vec::new(),
            no_header: false,
        }
    }

    /// Apply a command's `--format` and `--no-header` flags.
    #[must_use]
    pub fn with_display(&self, display: &DisplayArgs) -> Self {
        Self {
            format: self.format,
            columns: display.format.clone(),
            no_header: display.no_header,
        }
    }

    /// Write a value in the selected format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails, or a requested
    /// column does not exist.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => write_json(writer, value)?,
            Format::Yaml => write_yaml(writer, value)?,
            Format::Text => {
                let columns = select_columns(value.columns(), &self.columns)?;
                let rows = value.rows();
                let header: Vec<String> = columns.iter().map(|&i| value.columns()[i].1.to_string()).collect();
                let body: Vec<Vec<String>> = rows
                    .into_iter()
                    .map(|row| columns.iter().map(|&i| row.get(i).cloned().unwrap_or_default()).collect())
                    .collect();
                let header = (!self.no_header).then_some(header.as_slice());
                write_tabular(writer, header, &body)?;
            }
        }
        Ok(())
    }

    /// Write a value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::InvalidArgument(format!("output is not UTF-8: {e}")))
    }
}

/// Types that render as a table.
///
/// `columns` lists `(key, header)` pairs; `rows` returns one cell per column
/// in the same order. `--format` selects columns by key.
pub trait TableDisplay {
    /// Column keys and headers.
    fn columns(&self) -> &'static [(&'static str, &'static str)];

    /// Table rows.
    fn rows(&self) -> Vec<Vec<String>>;
}

/// Pretty JSON in field order, followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// YAML with keys sorted at every level.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_yaml<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<(), CliError> {
    let value = sort_keys(serde_json::to_value(value)?);
    let yaml = serde_yaml::to_string(&value)?;
    writer.write_all(yaml.as_bytes())?;
    Ok(())
}

/// Rebuild every object with its keys in lexical order.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn select_columns(available: &[(&str, &str)], requested: &[String]) -> Result<Vec<usize>, CliError> {
    if requested.is_empty() {
        return Ok((0..available.len()).collect());
    }
    requested
        .iter()
        .map(|want| {
            let want = want.trim();
            available
                .iter()
                .position(|(key, _)| key.eq_ignore_ascii_case(want))
                .ok_or_else(|| CliError::UnknownColumn(want.to_string()))
        })
        .collect()
}

/// Write rows as aligned columns.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_tabular<W: Write>(writer: &mut W, header: Option<&[String]>, rows: &[Vec<String>]) -> Result<(), CliError> {
    let lines: Vec<&[String]> = header.into_iter().chain(rows.iter().map(Vec::as_slice)).collect();
    let columns = lines.iter().map(|l| l.len()).max().unwrap_or(0);

    let mut widths = vec![0usize; columns];
    for line in &lines {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    for line in lines {
        let mut out = String::new();
        for (i, cell) in line.iter().enumerate() {
            out.push_str(cell);
            if i + 1 < line.len() {
                let pad = widths[i] + PADDING - cell.chars().count();
                out.extend(std::iter::repeat_n(' ', pad));
            }
        }
        writeln!(writer, "{out}")?;
    }
    Ok(())
}

/// Print an informational line on stderr, keeping stdout parseable.
pub fn notice(message: impl fmt::Display) {
    eprintln!("Notice: {message}");
}

/// Join a list for a table cell.
pub fn join(items: &[String]) -> String {
    items.join(",")
}
