//! Delimited-text reader for the source CSV exports.
//!
//! The first line is the header. Every later line becomes a [`RawRow`] keyed by
//! the trimmed header names. Short lines are kept; their missing trailing
//! fields simply read as absent. Blank lines are skipped.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

/// A parsed source file: header names plus the records that follow them.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

/// One record viewed as a field-name to value mapping.
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    table: &'a Table,
    record: &'a StringRecord,
}

impl<'a> RawRow<'a> {
    /// Returns the trimmed value of `column`, or `None` when the header has no
    /// such column or the line ended before reaching it.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let position = *self.table.index.get(column)?;
        self.record.get(position)
    }

    /// Parses `column` as a finite float.
    pub fn number(&self, column: &str) -> Option<f64> {
        parse_number(self.get(column)?)
    }
}

impl Table {
    /// Parses delimited text held in memory.
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    /// Reads and parses a delimited file.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read input file '{}'", path.display()))?;
        let table = Self::from_reader(bytes.as_slice())
            .with_context(|| format!("failed to parse input file '{}'", path.display()))?;

        debug!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.len(),
            "Input table loaded"
        );
        Ok(table)
    }

    fn from_reader<R: std::io::Read>(source: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source);

        let headers: Vec<String> = rdr
            .headers()
            .context("failed to read header line")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut index = HashMap::with_capacity(headers.len());
        for (position, name) in headers.iter().enumerate() {
            // first occurrence wins for duplicated header names
            index.entry(name.clone()).or_insert(position);
        }

        let mut records = Vec::new();
        let mut lossy = 0usize;
        for result in rdr.byte_records() {
            let bytes = result.context("failed to read record")?;
            let record = StringRecord::from_byte_record(bytes).unwrap_or_else(|err| {
                lossy += 1;
                StringRecord::from_byte_record_lossy(err.into_byte_record())
            });
            if record.iter().all(str::is_empty) {
                continue;
            }
            records.push(record);
        }
        if lossy > 0 {
            warn!(rows = lossy, "Rows with invalid UTF-8 decoded lossily");
        }

        Ok(Self {
            headers,
            index,
            records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates the rows in input order.
    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.records.iter().map(move |record| RawRow {
            table: self,
            record,
        })
    }
}

/// Parses a metric field. Empty, non-numeric and non-finite text yields `None`.
pub fn parse_number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
