//! CSV trace writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use cw_core::PlaceId;
use cw_place::TraceEntry;
use cw_world::WorldObserver;

use crate::error::TraceResult;
use crate::row::{TraceRow, HEADER};

/// Streams trace rows to a CSV file as they are dispatched.
///
/// Rows are flushed on [`on_world_end`][WorldObserver::on_world_end] and on
/// drop, so a truncated run still leaves a diffable file.
pub struct CsvTraceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvTraceWriter<File> {
    /// Create (truncating) `path` and write the header row.
    pub fn create(path: &Path) -> TraceResult<Self> {
        let file = File::create(path)?;
        CsvTraceWriter::from_writer(file)
    }
}

impl<W: Write> CsvTraceWriter<W> {
    pub fn from_writer(inner: W) -> TraceResult<Self> {
        let mut writer = csv::Writer::from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(CsvTraceWriter { writer })
    }

    fn write_row(&mut self, row: &TraceRow) -> TraceResult<()> {
        self.writer.write_record(row.fields())?;
        Ok(())
    }

    pub fn flush(&mut self) -> TraceResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> WorldObserver for CsvTraceWriter<W> {
    fn on_event(&mut self, place: PlaceId, entry: &TraceEntry) {
        // Output failure must not abort the simulation; the partial trace
        // is still useful and the error surfaces on the final flush.
        let _ = self.write_row(&TraceRow::from_entry(place, entry));
    }

    fn on_world_end(&mut self, _time: cw_core::TimePoint) {
        let _ = self.flush();
    }
}
