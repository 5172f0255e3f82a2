//! Streaming renderers
//!
//! Each renderer writes a record the moment it arrives, so memory use does
//! not grow with the number of matches.

use std::io::{self, Write};

use ss_core::{ObjectRecord, Result, VersionRecord, format_size};

/// Column names shared by the raw and CSV formats
pub const HEADERS: [&str; 5] = ["Bucket", "Key", "Size", "LastModified", "StorageClass"];

/// A destination that consumes records one at a time
pub trait RecordSink {
    /// Called once before the first record
    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_record(&mut self, record: &ObjectRecord) -> Result<()>;

    /// Called once after the last record; flushes buffered output
    fn finish(&mut self) -> Result<()>;
}

/// Tab-separated rows for copy-paste, no alignment
pub struct RawRenderer<W: Write> {
    out: W,
}

impl<W: Write> RawRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> RecordSink for RawRenderer<W> {
    fn begin(&mut self) -> Result<()> {
        writeln!(self.out, "{}", HEADERS.join("\t"))?;
        Ok(())
    }

    fn write_record(&mut self, record: &ObjectRecord) -> Result<()> {
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}",
            record.bucket(),
            record.key(),
            format_size(record.size()),
            record.last_modified(),
            record.storage_class()
        )?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// One labelled block per object, numbered from 1
pub struct StackedRenderer<W: Write> {
    out: W,
    count: usize,
}

impl<W: Write> StackedRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, count: 0 }
    }
}

impl<W: Write> RecordSink for StackedRenderer<W> {
    fn write_record(&mut self, record: &ObjectRecord) -> Result<()> {
        self.count += 1;
        writeln!(self.out, "=== Object {} ===", self.count)?;
        writeln!(self.out, "Bucket:     {}", record.bucket())?;
        writeln!(self.out, "Key:        {}", record.key())?;
        writeln!(self.out, "Size:       {}", format_size(record.size()))?;
        writeln!(self.out, "Modified:   {}", record.last_modified())?;
        writeln!(self.out, "Class:      {}", record.storage_class())?;
        writeln!(self.out)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// RFC 4180 comma-separated rows
pub struct CsvRenderer<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvRenderer<W> {
    pub fn new(out: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(out);
        Self { writer }
    }
}

impl<W: Write> RecordSink for CsvRenderer<W> {
    fn begin(&mut self) -> Result<()> {
        self.writer.write_record(HEADERS).map_err(io::Error::from)?;
        Ok(())
    }

    fn write_record(&mut self, record: &ObjectRecord) -> Result<()> {
        let size = format_size(record.size());
        self.writer
            .write_record([
                record.bucket(),
                record.key(),
                size.as_str(),
                record.last_modified(),
                record.storage_class(),
            ])
            .map_err(io::Error::from)?;
        // Keep output flowing record by record
        self.writer.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Tab-separated rows for a version sweep
pub struct VersionRenderer<W: Write> {
    out: W,
}

impl<W: Write> VersionRenderer<W> {
    pub const HEADERS: [&'static str; 7] = [
        "Bucket",
        "Key",
        "VersionId",
        "Latest",
        "DeleteMarker",
        "Size",
        "LastModified",
    ];

    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn begin(&mut self) -> Result<()> {
        writeln!(self.out, "{}", Self::HEADERS.join("\t"))?;
        Ok(())
    }

    pub fn write_version(&mut self, version: &VersionRecord) -> Result<()> {
        let size = version
            .size()
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            self.out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            version.bucket(),
            version.key(),
            version.version_id(),
            version.is_latest(),
            version.is_delete_marker(),
            size,
            version.last_modified()
        )?;
        Ok(())
    }

    pub fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
