//! CSV upload decoding
//!
//! Turns the uploaded bytes into header + row maps using the batch's
//! configured delimiter and encoding. Structural problems (empty upload,
//! undecodable content, malformed records) are whole-batch errors; nothing
//! here touches the CMS.

use crate::core::models::{BatchConfig, ErrorType, RowError};
use std::collections::HashMap;

/// Parsed CSV upload: normalized headers plus one map per data row
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Headers, trimmed and lower-cased
    pub headers: Vec<String>,
    /// One map per data row, keyed by normalized header
    pub rows: Vec<HashMap<String, String>>,
}

impl CsvTable {
    /// Required-column check against the normalized headers.
    pub fn missing_columns(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|column| !self.headers.contains(&column.to_lowercase()))
            .cloned()
            .collect()
    }
}

/// Parse the uploaded file into a [`CsvTable`].
pub fn read_table(bytes: &[u8], config: &BatchConfig) -> Result<CsvTable, RowError> {
    if bytes.is_empty() {
        return Err(RowError::new(ErrorType::EmptyFileError, "Empty file provided")
            .with_location("file_validation"));
    }

    let text = decode(bytes, &config.encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter as u8)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| {
            RowError::new(ErrorType::ValidationError, format!("Could not read CSV header: {}", e))
                .with_location("file_validation")
        })?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(
            RowError::new(ErrorType::ValidationError, "CSV header row is empty")
                .with_location("file_validation"),
        );
    }

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            RowError::new(
                ErrorType::ValidationError,
                format!("Malformed CSV at data row {}: {}", index + 1, e),
            )
            .with_location("file_validation")
        })?;

        // Short records are padded with empty fields; extras are dropped.
        let mut row = HashMap::with_capacity(headers.len());
        for (column, header) in headers.iter().enumerate() {
            let value = record.get(column).unwrap_or_default();
            row.insert(header.clone(), value.to_string());
        }
        rows.push(row);
    }

    Ok(CsvTable { headers, rows })
}

fn decode(bytes: &[u8], encoding: &str) -> Result<String, RowError> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" => String::from_utf8(bytes.to_vec()).map_err(|_| {
            RowError::new(ErrorType::ValidationError, "File content is not valid UTF-8")
                .with_location("file_validation")
        }),
        // Latin-1 maps each byte to the code point of the same value.
        "latin-1" | "latin1" | "iso-8859-1" => {
            Ok(bytes.iter().map(|&b| b as char).collect())
        }
        other => Err(RowError::new(
            ErrorType::ValidationError,
            format!("Unsupported encoding: {}", other),
        )
        .with_location("file_validation")),
    }
}
