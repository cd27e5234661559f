//! Output writers.
//!
//! Every crawl output is a CSV file written through [`CsvAppendSink`], one
//! row at a time, so an interrupted run keeps everything written so far.

pub mod csv;

pub use self::csv::{read_rows, write_table, CsvAppendSink, UTF8_BOM};
