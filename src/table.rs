use anyhow::{Context, Result};
use std::fmt;

/// A single parsed cell: numeric when the entire trimmed value parses as a
/// number, otherwise kept as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Num(f64),
    Text(String),
}

impl Cell {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Cell::Num(n),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    /// Numeric view of the cell. Text and missing cells read as 0.
    pub fn as_number(&self) -> f64 {
        match self {
            Cell::Num(n) => *n,
            Cell::Text(_) => 0.0,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Ordered tabular data: one header row plus data rows in insertion order.
/// Row order is significant (it is the category/x-axis order), and the first
/// column is by convention the category key.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive header lookup, mirroring how column references arrive
    /// from loosely-authored CMS content.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }

    /// Display strings of the first column, one per row.
    pub fn category_labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.first().map(|c| c.to_string()).unwrap_or_default())
            .collect()
    }

    /// Numeric values of one column, one per row. Missing or non-numeric
    /// cells read as 0 rather than failing the whole chart.
    pub fn numeric_column(&self, col: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.get(col).map(Cell::as_number).unwrap_or(0.0))
            .collect()
    }

    /// New table sharing this table's headers but holding derived rows.
    /// Transforms and downsampling build these so the source spec is never
    /// mutated in place.
    pub fn with_rows(&self, rows: Vec<Vec<Cell>>) -> Table {
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }
}

/// Parse a delimited text blob: first line is the header row, subsequent
/// lines are data rows. Whitespace around headers and values is trimmed.
/// Empty input produces an empty table, not an error. Embedded delimiters
/// inside unquoted fields are a caller contract violation and are not
/// detected here.
pub fn parse_table(input: &str) -> Result<Table> {
    if input.trim().is_empty() {
        return Ok(Table::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("chart data is not a parseable table")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("chart data row is not parseable")?;
        let mut row: Vec<Cell> = record.iter().map(Cell::parse).collect();
        // Short rows are padded so every row exposes every header.
        while row.len() < headers.len() {
            row.push(Cell::Text(String::new()));
        }
        row.truncate(headers.len());
        rows.push(row);
    }

    Ok(Table { headers, rows })
}
