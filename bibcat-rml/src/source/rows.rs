//! Header-row delimited text

use std::sync::Arc;

use crate::error::{RmlError, RmlResult};

/// One data row, sharing its header with the rest of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    header: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    pub fn new(header: Arc<[String]>, values: Vec<String>) -> Self {
        Self { header, values }
    }

    /// Value of `column`, if the header has it
    pub fn get(&self, column: &str) -> Option<&str> {
        self.header
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Parse delimited text whose first record is the header
///
/// Fields may be double-quoted; inside quotes the delimiter and newlines are
/// literal and `""` is an escaped quote. Blank lines are skipped, short rows
/// are padded with empty values, and rows longer than the header are errors.
pub fn parse_delimited(text: &str, delimiter: char) -> RmlResult<Vec<Row>> {
    let mut records = split_records(text, delimiter)?.into_iter();

    let Some(header) = records.next() else {
        return Ok(Vec::new());
    };
    let header: Arc<[String]> = header
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>()
        .into();

    let mut rows = Vec::new();
    for (n, mut values) in records.enumerate() {
        if values.len() > header.len() {
            return Err(RmlError::Source(format!(
                "row {} has {} fields, header has {}",
                n + 1,
                values.len(),
                header.len()
            )));
        }
        values.resize(header.len(), String::new());
        rows.push(Row::new(header.clone(), values));
    }
    Ok(rows)
}

fn split_records(text: &str, delimiter: char) -> RmlResult<Vec<Vec<String>>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                end_record(&mut records, std::mem::take(&mut record));
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RmlError::Source("unterminated quoted field".to_string()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        end_record(&mut records, record);
    }
    Ok(records)
}

fn end_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}
