use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use grocery_core::{Record, Table};

/// Column order used for exports: surrogate key first, then catalog columns.
pub fn export_columns(table: Table) -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(table.columns().len() + 1);
    if table.has_surrogate_key() {
        columns.push(table.key_column());
    }
    columns.extend(table.columns().iter().map(|column| column.name));
    columns
}

/// Write a table as CSV with deterministic column ordering.
///
/// Returns the number of bytes written.
pub fn write_table_csv(path: &Path, table: Table, records: &[Record]) -> Result<u64, csv::Error> {
    let writer = BufWriter::new(File::create(path).map_err(csv::Error::from)?);
    let counting = CountingWriter::new(writer);
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(counting);

    let columns = export_columns(table);
    writer.write_record(&columns)?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .map(|value| value.to_csv())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    let counting = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(counting.bytes_written())
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
