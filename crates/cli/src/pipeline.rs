//! Search pipeline
//!
//! Drives bucket selection, scanning and rendering for one request. Raw,
//! stacked and CSV output are streamed record by record; the table format
//! collects every match first because its column widths depend on them.

use std::fs::File;
use std::io::{self, Write};

use futures::TryStreamExt;
use indicatif::ProgressBar;
use ss_core::{
    Error, ObjectRecord, ObjectStore, OutputFormat, Result, SearchMode, SearchRequest,
    scan_objects, scan_versions, select_buckets,
};

use crate::output::{
    CsvRenderer, RawRenderer, RecordSink, StackedRenderer, VersionRenderer, render_table,
    terminal_width,
};

/// Totals for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub buckets_scanned: usize,
    pub matches: usize,
}

/// One search run over a store
pub struct Pipeline<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    request: &'a SearchRequest,
    terminal_width: usize,
    progress: ProgressBar,
}

impl<'a, S: ObjectStore + ?Sized> Pipeline<'a, S> {
    pub fn new(store: &'a S, request: &'a SearchRequest) -> Self {
        Self {
            store,
            request,
            terminal_width: terminal_width(),
            progress: ProgressBar::hidden(),
        }
    }

    /// Override the detected terminal width used by the table format
    pub fn terminal_width(mut self, width: usize) -> Self {
        self.terminal_width = width;
        self
    }

    /// Spinner updated while the table format collects matches
    pub fn progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run the search, writing results (or the CSV confirmation) to `out`
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<RunSummary> {
        let all = self.store.list_buckets().await?;
        let buckets = select_buckets(&all, self.request.bucket_filter());
        tracing::info!(
            total = all.len(),
            selected = buckets.len(),
            filter = self.request.bucket_filter().unwrap_or(""),
            "Selected buckets"
        );

        let matches = match (self.request.mode(), self.request.format()) {
            (SearchMode::Versions, _) => self.stream_versions(&buckets, out).await?,
            (_, OutputFormat::Table) => self.collect_table(&buckets, out).await?,
            (_, OutputFormat::Raw) => {
                self.stream_into(&buckets, &mut RawRenderer::new(&mut *out))
                    .await?
            }
            (_, OutputFormat::Stacked) => {
                self.stream_into(&buckets, &mut StackedRenderer::new(&mut *out))
                    .await?
            }
            (_, OutputFormat::Csv) => self.stream_csv(&buckets, out).await?,
        };

        let summary = RunSummary {
            buckets_scanned: buckets.len(),
            matches,
        };
        tracing::info!(
            buckets = summary.buckets_scanned,
            matches = summary.matches,
            "Search finished"
        );
        Ok(summary)
    }

    async fn stream_into<R: RecordSink>(&self, buckets: &[String], sink: &mut R) -> Result<usize> {
        sink.begin()?;

        let mut count = 0;
        for bucket in buckets {
            tracing::debug!(bucket = %bucket, "Scanning bucket");
            let mut records =
                scan_objects(self.store, bucket, self.request.term(), self.request.mode());
            while let Some(record) = records.try_next().await? {
                sink.write_record(&record)?;
                count += 1;
            }
        }

        sink.finish()?;
        Ok(count)
    }

    async fn stream_csv<W: Write>(&self, buckets: &[String], out: &mut W) -> Result<usize> {
        let Some(path) = self.request.csv_destination() else {
            return self
                .stream_into(buckets, &mut CsvRenderer::new(&mut *out))
                .await;
        };

        let file = File::create(path).map_err(|e| {
            Error::Io(io::Error::new(
                e.kind(),
                format!("Cannot create {}: {e}", path.display()),
            ))
        })?;
        // The file is closed when the renderer drops, on success and on error
        let count = {
            let mut sink = CsvRenderer::new(file);
            self.stream_into(buckets, &mut sink).await?
        };

        writeln!(out, "Results saved to {}", path.display())?;
        Ok(count)
    }

    async fn collect_table<W: Write>(&self, buckets: &[String], out: &mut W) -> Result<usize> {
        let mut records: Vec<ObjectRecord> = Vec::new();

        for bucket in buckets {
            tracing::debug!(bucket = %bucket, "Scanning bucket");
            self.progress
                .set_message(format!("Scanning {bucket} ({} found)", records.len()));
            let mut stream =
                scan_objects(self.store, bucket, self.request.term(), self.request.mode());
            while let Some(record) = stream.try_next().await? {
                records.push(record);
                self.progress.tick();
            }
        }

        self.progress.finish_and_clear();
        render_table(&records, self.terminal_width, out)?;
        Ok(records.len())
    }

    async fn stream_versions<W: Write>(&self, buckets: &[String], out: &mut W) -> Result<usize> {
        let mut renderer = VersionRenderer::new(&mut *out);
        renderer.begin()?;

        let mut count = 0;
        for bucket in buckets {
            tracing::debug!(bucket = %bucket, "Listing versions");
            let mut versions = scan_versions(self.store, bucket, self.request.term());
            while let Some(version) = versions.try_next().await? {
                renderer.write_version(&version)?;
                count += 1;
            }
        }

        renderer.finish()?;
        Ok(count)
    }
}
