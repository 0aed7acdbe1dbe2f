//! CSV reading and writing around the matching core.

use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::records::{InputRecord, OutputRecord, RowSchema};

/// Read the whole input file up front: validated schema plus all rows.
/// Any failure here is fatal; no work is dispatched for a file we cannot
/// read or interpret.
pub fn read_input(path: &Path) -> Result<(RowSchema, Vec<InputRecord>)> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row from {}", path.display()))?;
    let schema = RowSchema::from_headers(headers)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record
            .with_context(|| format!("failed to read row from {}", path.display()))?;
        rows.push(InputRecord::from_record(&record));
    }

    info!("Read {} rows from {}", rows.len(), path.display());
    Ok((schema, rows))
}

/// Create the output file and write its header row.
pub fn open_output(path: &Path, schema: &RowSchema) -> Result<csv::Writer<File>> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    writer
        .write_record(schema.output_headers())
        .context("failed to write output header")?;
    Ok(writer)
}

/// Append a row's output records.
pub fn append_output_rows<W: Write>(
    writer: &mut csv::Writer<W>,
    rows: &[OutputRecord],
) -> Result<()> {
    for row in rows {
        writer
            .write_record(row.to_field_vec())
            .context("failed to write output row")?;
    }
    Ok(())
}
