//! Output formatting for shell commands.
//!
//! Every command produces a [`CommandOutput`]; the [`Printer`] renders it as
//! an aligned table for people or as JSON for scripts.

use serde::Serialize;
use std::fmt;
use std::io::Write;
use tfs_types::TfsError;

use crate::commands::CommandOutput;

/// A single row in a table output.
pub type OutputRow = Vec<String>;

/// Rows of cells; with more than one row the first is the header.
pub type OutputTable = Vec<OutputRow>;

/// Shown by `ls` for a node without children.
pub const EMPTY_LISTING: &str = "<Empty>";

const TREE_BRANCH: &str = "├──";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Column-aligned text.
    #[default]
    Table,
    /// One JSON document per command.
    Json,
}

pub struct Printer<W: Write = Box<dyn Write>> {
    out: W,
    format: OutputFormat,
}

impl Printer<Box<dyn Write>> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self {
            out: Box::new(std::io::stdout()),
            format,
        }
    }
}

impl<W: Write> Printer<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { out: writer, format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write the prompt without a trailing newline.
    pub fn print_prompt(&mut self, prompt: &str) -> std::io::Result<()> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()
    }

    pub fn print_message(&mut self, msg: &str) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Table => writeln!(self.out, "{}", msg),
            OutputFormat::Json => self.print_value(&serde_json::json!({ "message": msg })),
        }
    }

    /// Print a command failure with its kind and status code.
    pub fn print_error(&mut self, err: &TfsError) -> std::io::Result<()> {
        match self.format {
            OutputFormat::Table => writeln!(self.out, "{}: {}", err.kind(), err.describe()),
            OutputFormat::Json => self.print_value(&serde_json::json!({
                "error": err.to_string(),
                "kind": err.kind(),
                "code": err.code(),
            })),
        }
    }

    pub fn print_output(&mut self, output: &CommandOutput) -> std::io::Result<()> {
        match output {
            CommandOutput::Empty | CommandOutput::Exit => Ok(()),
            CommandOutput::Message(msg) => self.print_message(msg),
            CommandOutput::List(items) => match self.format {
                OutputFormat::Table if items.is_empty() => writeln!(self.out, "{}", EMPTY_LISTING),
                OutputFormat::Table => {
                    let table: OutputTable = items.iter().map(|item| vec![item.clone()]).collect();
                    self.print_table_aligned(&table)
                }
                OutputFormat::Json => self.print_value(items),
            },
            CommandOutput::Attributes(pairs) => match self.format {
                OutputFormat::Table => {
                    let table: OutputTable = pairs.iter().map(|(k, v)| kv_row(k, v)).collect();
                    self.print_table_aligned(&table)
                }
                OutputFormat::Json => {
                    let map: serde_json::Map<String, serde_json::Value> = pairs
                        .iter()
                        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                        .collect();
                    self.print_value(&map)
                }
            },
            CommandOutput::Tree(entries) => match self.format {
                OutputFormat::Table => {
                    for entry in entries {
                        writeln!(self.out, "{}{}{}", "  ".repeat(entry.depth), TREE_BRANCH, entry.name)?;
                    }
                    Ok(())
                }
                OutputFormat::Json => self.print_value(entries),
            },
        }
    }

    /// Print an output table. In JSON mode a table with a header row becomes
    /// an array of objects keyed by the header.
    pub fn print_table(&mut self, table: &OutputTable) -> std::io::Result<()> {
        if table.is_empty() {
            return Ok(());
        }
        match self.format {
            OutputFormat::Table => self.print_table_aligned(table),
            OutputFormat::Json => self.print_table_json(table),
        }
    }

    pub fn print_value<T: Serialize + ?Sized>(&mut self, value: &T) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        writeln!(self.out, "{}", json)
    }

    fn print_table_aligned(&mut self, table: &OutputTable) -> std::io::Result<()> {
        const SEPARATOR: &str = "  ";

        let mut widths: Vec<usize> = Vec::new();
        for row in table {
            if widths.len() < row.len() {
                widths.resize(row.len(), 0);
            }
            for (col, cell) in row.iter().enumerate() {
                widths[col] = widths[col].max(cell.chars().count() + SEPARATOR.len());
            }
        }

        for row in table {
            let mut line = String::new();
            for (col, cell) in row.iter().enumerate() {
                line.push_str(cell);
                if col + 1 < row.len() {
                    let padding = widths[col].saturating_sub(cell.chars().count());
                    line.extend(std::iter::repeat(' ').take(padding));
                }
            }
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn print_table_json(&mut self, table: &OutputTable) -> std::io::Result<()> {
        if table.len() <= 1 {
            return self.print_value(table);
        }
        let headers = &table[0];
        let rows: Vec<serde_json::Map<String, serde_json::Value>> = table[1..]
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        let key = headers.get(i).cloned().unwrap_or_else(|| format!("col_{}", i));
                        (key, serde_json::Value::String(cell.clone()))
                    })
                    .collect()
            })
            .collect();
        self.print_value(&rows)
    }
}

impl<W: Write> fmt::Debug for Printer<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer").field("format", &self.format).finish()
    }
}

pub fn table_with_header(headers: &[&str]) -> OutputTable {
    vec![headers.iter().map(|h| h.to_string()).collect()]
}

pub fn kv_row(key: &str, value: impl fmt::Display) -> OutputRow {
    vec![key.to_string(), value.to_string()]
}
