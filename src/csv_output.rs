//! Delimited-text import/export for result tables
//!
//! Raw latency tables are written with a header (`stride\spots,1,2,...`) and
//! may be scaled for display (x10, x100, rounded to integers). Jump tables
//! are written without a header and never scaled. Scaling happens only here,
//! so analysis always sees the unscaled values.

use crate::error::{AnalysisError, Result};
use crate::result_table::ResultTable;
use std::fmt::Display;
use std::str::FromStr;

/// Name of the key column in raw latency tables
pub const RAW_KEY_COLUMN: &str = "stride\\spots";

/// Per-type cell formatting
pub trait CsvCell {
    /// Format the cell, applying the display scale where it makes sense
    fn to_field(&self, scale: Option<f64>) -> String;
}

impl CsvCell for f32 {
    fn to_field(&self, scale: Option<f64>) -> String {
        match scale {
            Some(factor) => format!("{}", (*self as f64 * factor).round() as i64),
            None => self.to_string(),
        }
    }
}

impl CsvCell for f64 {
    fn to_field(&self, scale: Option<f64>) -> String {
        match scale {
            Some(factor) => format!("{}", (self * factor).round() as i64),
            None => self.to_string(),
        }
    }
}

impl CsvCell for usize {
    // positions are indices: scaling them would corrupt the table
    fn to_field(&self, _scale: Option<f64>) -> String {
        self.to_string()
    }
}

/// CSV output formatter for result tables
#[derive(Debug, Clone, Default)]
pub struct CsvTableOutput {
    scale: Option<f64>,
    include_header: bool,
}

impl CsvTableOutput {
    /// Formatter that writes the table header (if any) and unscaled values
    pub fn new() -> Self {
        Self {
            scale: None,
            include_header: true,
        }
    }

    /// Multiply values by `factor` and round to integers on output
    pub fn with_scale(mut self, factor: f64) -> Self {
        self.scale = Some(factor);
        self
    }

    /// Omit the header line
    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Generate CSV output as string
    pub fn to_csv<K: Display, V: CsvCell>(&self, table: &ResultTable<K, V>) -> String {
        let mut output = String::new();

        if self.include_header {
            if let Some(header) = table.header() {
                let fields: Vec<String> = header.iter().map(|h| Self::escape_field(h)).collect();
                output.push_str(&fields.join(","));
                output.push('\n');
            }
        }

        for row in table.rows() {
            output.push_str(&row.key.to_string());
            for value in &row.values {
                output.push(',');
                output.push_str(&value.to_field(self.scale));
            }
            output.push('\n');
        }

        output
    }
}

/// Header for a raw latency table sweeping `1..=max_spots` probe addresses
pub fn raw_header(max_spots: usize) -> Vec<String> {
    std::iter::once(RAW_KEY_COLUMN.to_string())
        .chain((1..=max_spots).map(|spots| spots.to_string()))
        .collect()
}

/// Parse a comma-separated table keyed by an unsigned integer
///
/// A first line whose key field is not numeric is kept as the header. Blank
/// lines are ignored; surrounding whitespace in fields is trimmed.
///
/// # Errors
/// `AnalysisError::Parse` with the 1-based line number of the first
/// malformed key or value.
pub fn parse_table<V>(text: &str) -> Result<ResultTable<usize, V>>
where
    V: FromStr,
    V::Err: Display,
{
    let mut table = ResultTable::new();
    let mut seen_data = false;

    for (line_no, line) in text.lines().enumerate().map(|(i, l)| (i + 1, l.trim())) {
        if line.is_empty() {
            continue;
        }

        let mut fields = line.split(',').map(str::trim);
        let key_field = fields.next().unwrap_or_default();

        let key = match key_field.parse::<usize>() {
            Ok(key) => key,
            Err(_) if !seen_data && table.header().is_none() => {
                let header = line.split(',').map(|f| f.trim().to_string()).collect();
                table = table.with_header(header);
                continue;
            }
            Err(e) => {
                return Err(AnalysisError::Parse {
                    line: line_no,
                    message: format!("invalid key '{}': {}", key_field, e),
                })
            }
        };

        let values = fields
            .filter(|f| !f.is_empty())
            .map(|f| {
                f.parse::<V>().map_err(|e| AnalysisError::Parse {
                    line: line_no,
                    message: format!("invalid value '{}': {}", f, e),
                })
            })
            .collect::<Result<Vec<V>>>()?;

        table.append(key, values);
        seen_data = true;
    }

    Ok(table)
}
