//! Tab-separated table reading and writing.
//!
//! Raw exports, cleaned tables and reference tables all share the same
//! shape: a single header row followed by data rows. Cells are normalized
//! (trimmed, BOM stripped) on the way in; column order is preserved so
//! cleaned artifacts round-trip byte-identically.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use cvsub_model::record::{RecordType, VariantRecord};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Default)]
pub struct TsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

impl TsvTable {
    /// Fail unless every named column is present.
    pub fn require_columns(&self, path: &Path, columns: &[&str]) -> Result<()> {
        for column in columns {
            if !self.headers.iter().any(|header| header == column) {
                return Err(IngestError::MissingColumn {
                    path: path.to_path_buf(),
                    column: (*column).to_string(),
                });
            }
        }
        Ok(())
    }

    /// Convert rows into typed records, pairing each cell with its header.
    pub fn into_records(self, record_type: RecordType) -> Vec<VariantRecord> {
        let headers = self.headers;
        self.rows
            .into_iter()
            .map(|row| {
                let mut fields = BTreeMap::new();
                for (idx, header) in headers.iter().enumerate() {
                    let value = row.get(idx).map(String::as_str).unwrap_or("");
                    fields.insert(header.clone(), value.to_string());
                }
                VariantRecord::new(record_type, fields)
            })
            .collect()
    }
}

pub fn read_tsv_table(path: &Path) -> Result<TsvTable> {
    let bytes = std::fs::read(path)?;
    let table = parse_tsv_bytes(&bytes)?;
    debug!(
        path = %path.display(),
        rows = table.rows.len(),
        columns = table.headers.len(),
        "read tsv table"
    );
    Ok(table)
}

pub fn parse_tsv_bytes(bytes: &[u8]) -> Result<TsvTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }
    if raw_rows.is_empty() {
        return Ok(TsvTable::default());
    }
    let headers = raw_rows.remove(0);
    let rows = raw_rows
        .into_iter()
        .map(|record| {
            (0..headers.len())
                .map(|idx| record.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(TsvTable { headers, rows })
}

/// Serialize records under the given header order. Cells a record lacks are
/// written empty; fields outside the header are dropped.
pub fn render_tsv(headers: &[String], records: &[VariantRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(Vec::new());
    writer.write_record(headers)?;
    for record in records {
        let row: Vec<&str> = headers.iter().map(|header| record.field(header)).collect();
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|error| IngestError::Io(std::io::Error::other(error.to_string())))
}

pub fn write_tsv_table(path: &Path, headers: &[String], records: &[VariantRecord]) -> Result<()> {
    let bytes = render_tsv(headers, records)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Convenience for building a table view of records with a known header.
pub fn records_to_table(headers: &[&str], records: &[VariantRecord]) -> TsvTable {
    let headers: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|header| record.field(header).to_string())
                .collect()
        })
        .collect();
    TsvTable { headers, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvsub_model::columns;

    #[test]
    fn parse_skips_blank_lines_and_pads_short_rows() {
        let raw = b"#Chromosome\tStart\tStop\tRef/Alt\n\n1\t10\t11\tA/G\n2\t20\t21\n";
        let table = parse_tsv_bytes(raw).unwrap();
        assert_eq!(table.headers.len(), 4);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["2", "20", "21", ""]);
    }

    #[test]
    fn records_round_trip_through_render() {
        let raw = b"#Chromosome\tStart\tStop\tRef/Alt\thgvs c.\n1\t10\t11\tA/G\tNM_1:c.1A>G\n";
        let table = parse_tsv_bytes(raw).unwrap();
        let headers = table.headers.clone();
        let records = table.into_records(RecordType::Variant);
        assert_eq!(records[0].field(columns::REF_ALT), "A/G");
        let rendered = render_tsv(&headers, &records).unwrap();
        assert_eq!(rendered, raw.to_vec());
    }

    #[test]
    fn require_columns_reports_missing() {
        let table = parse_tsv_bytes(b"Start\tStop\n1\t2\n").unwrap();
        let error = table
            .require_columns(Path::new("input.tsv"), &[columns::SCV])
            .unwrap_err();
        assert!(error.to_string().contains("SCV"));
    }
}
