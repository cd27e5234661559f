//! CSV append sink.
//!
//! Appends one record at a time to a CSV file. The header row is written only
//! when the file is created (absent or empty), so repeated appends and reruns
//! on the same path never duplicate it.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};

use crate::error_handling::SinkError;
use crate::models::Row;

/// UTF-8 byte order mark, written on file creation so spreadsheet tools pick
/// the right encoding for Korean text.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Append-only CSV writer bound to one file and a fixed column order.
#[derive(Debug, Clone)]
pub struct CsvAppendSink {
    path: PathBuf,
    fields: Vec<String>,
    bom: bool,
}

impl CsvAppendSink {
    /// Creates a sink for `path` with the given column order.
    ///
    /// Nothing is touched on disk until the first append.
    pub fn new(path: impl Into<PathBuf>, fields: &[&str]) -> Self {
        Self {
            path: path.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            bom: true,
        }
    }

    /// Enables or disables the UTF-8 BOM written on file creation.
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn needs_header(&self) -> bool {
        fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true)
    }

    fn open(&self) -> Result<(fs::File, bool), SinkError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let fresh = self.needs_header();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh && self.bom {
            file.write_all(UTF8_BOM)?;
        }
        Ok((file, fresh))
    }

    /// Appends one record.
    ///
    /// Keys of `row` that are not configured columns are ignored; configured
    /// columns missing from `row` are written as empty strings.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the file cannot be opened or the record cannot be
    /// encoded.
    pub fn append(&self, row: &Row) -> Result<(), SinkError> {
        let (file, fresh) = self.open()?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if fresh {
            writer.write_record(&self.fields)?;
        }
        writer.write_record(
            self.fields
                .iter()
                .map(|f| row.get(f).map(String::as_str).unwrap_or("")),
        )?;
        writer.flush()?;
        Ok(())
    }

    /// Ensures the file exists with its header, without adding a record.
    pub fn write_header_only(&self) -> Result<(), SinkError> {
        let (file, fresh) = self.open()?;
        if fresh {
            let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
            writer.write_record(&self.fields)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Deletes a previous output file. Missing files are not an error.
    pub fn reset(&self) -> Result<(), SinkError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::info!("Removed previous output {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes a whole table, replacing any existing file.
///
/// Used for small lookup outputs (taxonomy, partition list) that are rebuilt
/// in one go rather than appended.
///
/// # Returns
///
/// The number of data rows written.
pub fn write_table(
    path: &Path,
    fields: &[&str],
    rows: &[Row],
    bom: bool,
) -> Result<usize, SinkError> {
    let sink = CsvAppendSink::new(path, fields).with_bom(bom);
    sink.reset()?;
    sink.write_header_only()?;
    for row in rows {
        sink.append(row)?;
    }
    Ok(rows.len())
}

/// Reads a file written by [`CsvAppendSink`] back into rows.
///
/// The BOM is tolerated and short records are padded with empty cells.
///
/// # Errors
///
/// Returns `SinkError` if the file cannot be opened or is not valid CSV.
pub fn read_rows(path: &Path) -> Result<Vec<Row>, SinkError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
                .collect(),
        );
    }
    Ok(rows)
}
